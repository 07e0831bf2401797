use sdkforge_core::{document, morph};

const SPEC: &str = r##"
openapi: "3.0.3"
info:
  title: Widget Service
  version: "2.1.0"
paths:
  /legacy/export:
    get:
      operationId: exportLegacy
      deprecated: true
  /api/v1/widgets:
    get:
      operationId: listWidgets
    post:
      operationId: createWidget
      description: Create one widget.
      requestBody:
        content:
          application/json:
            schema:
              oneOf:
                - $ref: "#/components/schemas/PayloadBasic"
                - $ref: "#/components/schemas/PayloadAdvanced"
components:
  schemas:
    PayloadBasic:
      description: A basic widget payload.
      properties:
        mode:
          description: one of basic|simple
    PayloadAdvanced:
      properties:
        mode:
          description: advanced
"##;

#[test]
fn morph_full_document() {
    let mut doc = document::from_yaml(SPEC).unwrap();
    morph(&mut doc).unwrap();

    // Deprecated operation and its emptied path are gone.
    assert!(!doc.paths.contains_key("/legacy/export"));

    // The oneOf body fanned out into two synthetic operations; the
    // original verb entry is gone but the sibling GET survives.
    let path = &doc.paths["/api/v1/widgets"];
    assert!(path.get.is_some());
    assert!(path.post.is_none());

    let basic = doc.paths["/api/v1/widgets#post-PayloadBasic"]
        .verb("post")
        .unwrap();
    let advanced = doc.paths["/api/v1/widgets#post-PayloadAdvanced"]
        .verb("post")
        .unwrap();
    assert_eq!(basic.operation_id.as_deref(), Some("PayloadBasic"));
    assert_eq!(advanced.operation_id.as_deref(), Some("PayloadAdvanced"));

    // Schema description preferred; the operation's own description is
    // handed to the first alternative lacking one.
    assert_eq!(basic.description.as_deref(), Some("A basic widget payload."));
    assert_eq!(advanced.description.as_deref(), Some("Create one widget."));

    // Pipes in property descriptions were rewritten.
    let schema = doc.component_schema("PayloadBasic").unwrap();
    assert_eq!(
        schema.properties["mode"].description_str(),
        Some("one of basic/simple")
    );
}

#[test]
fn morph_is_a_fixed_point() {
    let mut doc = document::from_yaml(SPEC).unwrap();
    morph(&mut doc).unwrap();
    let once = doc.clone();
    morph(&mut doc).unwrap();
    assert_eq!(doc, once);
}

#[test]
fn morphed_document_serializes_cleanly() {
    let mut doc = document::from_yaml(SPEC).unwrap();
    morph(&mut doc).unwrap();
    let json = doc.to_json_pretty().unwrap();
    let reparsed = document::from_json(&json).unwrap();
    assert_eq!(reparsed, doc);
}
