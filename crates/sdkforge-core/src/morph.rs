//! Rewrites an OpenAPI document into the shape the external generator
//! expects: deprecated operations pruned, descriptions made safe for
//! tabular Markdown, and polymorphic (`oneOf`) request bodies split into
//! one concrete operation per alternative schema.

use indexmap::IndexMap;
use log::debug;

use crate::document::{HTTP_VERBS, OpenApiDocument, Operation, PathItem, Schema};
use crate::error::MorphError;

/// Morph `doc` in place. Pure in-memory mutation, no I/O.
///
/// The pruning and sanitization steps are idempotent; fan-out removes the
/// `oneOf` bodies it rewrites, so a second pass finds nothing to do.
pub fn morph(doc: &mut OpenApiDocument) -> Result<(), MorphError> {
    prune_deprecated(doc);
    sanitize_descriptions(doc);
    flatten_one_of(doc)
}

/// Drop every operation marked `deprecated: true`. A path left with zero
/// operations is removed from `paths` entirely; nothing downstream
/// distinguishes an absent path from one with no verbs.
fn prune_deprecated(doc: &mut OpenApiDocument) {
    for (path, item) in doc.paths.iter_mut() {
        for verb in HTTP_VERBS {
            if item.verb(verb).is_some_and(Operation::is_deprecated) {
                debug!("pruning deprecated operation {verb} {path}");
                item.take_verb(verb);
            }
        }
    }
    doc.paths.retain(|_, item| item.has_operations());
}

/// Replace `|` with `/` in every string schema description and property
/// description, so generated Markdown tables stay well-formed. Non-string
/// descriptions are left untouched.
fn sanitize_descriptions(doc: &mut OpenApiDocument) {
    let Some(components) = doc.components.as_mut() else {
        return;
    };
    for schema in components.schemas.values_mut() {
        sanitize_schema(schema);
        for property in schema.properties.values_mut() {
            sanitize_schema(property);
        }
    }
}

fn sanitize_schema(schema: &mut Schema) {
    if let Some(serde_json::Value::String(text)) = schema.description.as_mut() {
        if text.contains('|') {
            *text = text.replace('|', "/");
        }
    }
}

/// Split every `oneOf` JSON request body into one synthetic operation per
/// `$ref` alternative, registered under the suffixed path key
/// `"{path}#{verb}-{SchemaName}"`. Operation ids are kept globally unique
/// via a per-pass registry of `operationId -> "{path}-{verb}"` tags.
fn flatten_one_of(doc: &mut OpenApiDocument) -> Result<(), MorphError> {
    let mut registry: IndexMap<String, String> = IndexMap::new();
    for (path, item) in &doc.paths {
        for (verb, op) in item.operations() {
            if let Some(id) = &op.operation_id {
                registry.insert(id.clone(), format!("{path}-{verb}"));
            }
        }
    }

    let targets: Vec<(String, &'static str)> = doc
        .paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations()
                .filter(|(_, op)| {
                    op.json_body_schema()
                        .is_some_and(|schema| !schema.one_of.is_empty())
                })
                .map(|(verb, _)| (path.clone(), verb))
                .collect::<Vec<_>>()
        })
        .collect();

    for (path, verb) in targets {
        let Some(original) = doc
            .paths
            .get_mut(&path)
            .and_then(|item| item.take_verb(verb))
        else {
            continue;
        };
        let tag = format!("{path}-{verb}");

        // The original id is being replaced; its slot may be reused by an
        // alternative that happens to carry the same name.
        if let Some(id) = &original.operation_id {
            registry.shift_remove(id);
        }

        let alternatives = original
            .json_body_schema()
            .map(|schema| schema.one_of.clone())
            .unwrap_or_default();

        let mut used_default_desc = false;
        for alternative in &alternatives {
            let Some(name) = alternative.component_name() else {
                return Err(MorphError::InvalidRef {
                    tag,
                    reference: alternative.reference.clone().unwrap_or_default(),
                });
            };

            let operation_id = allocate_operation_id(&mut registry, name, &path, &tag)?;
            debug!("fanning out {tag} -> {operation_id}");

            let mut op = original.clone();
            op.operation_id = Some(operation_id);
            if let Some(schema) = op.json_body_schema_mut() {
                *schema = alternative.clone();
            }
            op.description = Some(fan_out_description(
                doc.component_schema(name),
                &original,
                &mut used_default_desc,
            ));

            let key = format!("{path}#{verb}-{name}");
            doc.paths.entry(key).or_default().set_verb(verb, op);
        }

        if !doc.paths.get(&path).is_some_and(PathItem::has_operations) {
            doc.paths.shift_remove(&path);
        }
    }

    Ok(())
}

/// Pick an id for a synthetic operation: the capitalized schema name if
/// free, otherwise a path-derived prefix plus the schema name. A taken
/// fallback is a fatal duplicate.
fn allocate_operation_id(
    registry: &mut IndexMap<String, String>,
    schema_name: &str,
    path: &str,
    tag: &str,
) -> Result<String, MorphError> {
    let candidate = capitalize(schema_name);
    let id = if !registry.contains_key(&candidate) {
        candidate
    } else {
        let fallback = format!("{}{schema_name}", path_prefix(path));
        if let Some(first) = registry.get(&fallback) {
            return Err(MorphError::DuplicateOperation {
                id: fallback,
                first: first.clone(),
                second: tag.to_string(),
            });
        }
        fallback
    };
    registry.insert(id.clone(), tag.to_string());
    Ok(id)
}

/// Schema descriptions win; otherwise the original operation's description
/// is surfaced once, on the first alternative that needs it, and every
/// later alternative gets an empty description.
fn fan_out_description(
    schema: Option<&Schema>,
    original: &Operation,
    used_default_desc: &mut bool,
) -> String {
    if let Some(text) = schema.and_then(Schema::description_str) {
        return text.to_string();
    }
    if *used_default_desc {
        return String::new();
    }
    *used_default_desc = true;
    original.description.clone().unwrap_or_default()
}

/// A 3-character prefix per segment from the path's first two segments
/// that are neither parameters nor version markers: first letter
/// upper-cased, next two kept. `/api/v2/widget-orders/{id}` -> `ApiWid`.
fn path_prefix(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{') && !is_version_segment(s))
        .take(2)
        .map(|segment| {
            let mut chars = segment.chars();
            let first = chars
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default();
            let rest: String = chars.take(2).collect();
            format!("{first}{rest}")
        })
        .collect()
}

fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && chars.as_str().chars().all(|c| c.is_ascii_digit())
        && segment.len() > 1
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    fn doc(json: serde_json::Value) -> OpenApiDocument {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_path_prefix_skips_params_and_versions() {
        assert_eq!(path_prefix("/api/v2/widgets/{id}"), "ApiWid");
        assert_eq!(path_prefix("/widgets"), "Wid");
        assert_eq!(path_prefix("/v1/orders/items"), "OrdIte");
    }

    #[test]
    fn test_version_segment() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v12"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("video"));
        assert!(!is_version_segment("widgets"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("widget"), "Widget");
        assert_eq!(capitalize("Widget"), "Widget");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_prune_removes_empty_paths() {
        let mut d = doc(serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/a": {"get": {"deprecated": true}},
                "/b": {"get": {}, "post": {"deprecated": true}}
            }
        }));
        prune_deprecated(&mut d);
        assert!(!d.paths.contains_key("/a"));
        let b = &d.paths["/b"];
        assert!(b.get.is_some());
        assert!(b.post.is_none());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut d = doc(serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"schemas": {
                "W": {
                    "description": "either|or",
                    "properties": {"p": {"description": "a|b|c"}}
                }
            }}
        }));
        sanitize_descriptions(&mut d);
        let once = d.clone();
        sanitize_descriptions(&mut d);
        assert_eq!(d, once);
        let w = d.component_schema("W").unwrap();
        assert_eq!(w.description_str(), Some("either/or"));
        assert_eq!(w.properties["p"].description_str(), Some("a/b/c"));
    }

    #[test]
    fn test_fan_out_cardinality_and_keys() {
        let mut d = doc(widget_doc());
        morph(&mut d).unwrap();
        assert!(!d.paths.contains_key("/widgets"));
        let a = d.paths["/widgets#post-SchemaA"].verb("post").unwrap();
        let b = d.paths["/widgets#post-SchemaB"].verb("post").unwrap();
        assert_eq!(a.operation_id.as_deref(), Some("SchemaA"));
        assert_eq!(b.operation_id.as_deref(), Some("SchemaB"));
        assert_eq!(
            a.json_body_schema().and_then(|s| s.component_name()),
            Some("SchemaA")
        );
    }

    #[test]
    fn test_description_propagated_once() {
        let mut d = doc(widget_doc());
        morph(&mut d).unwrap();
        let a = d.paths["/widgets#post-SchemaA"].verb("post").unwrap();
        let b = d.paths["/widgets#post-SchemaB"].verb("post").unwrap();
        assert_eq!(a.description.as_deref(), Some("Do the thing"));
        assert_eq!(b.description.as_deref(), Some(""));
    }

    #[test]
    fn test_schema_description_wins() {
        let mut json = widget_doc();
        json["components"]["schemas"]["SchemaA"]["description"] = "From the schema".into();
        let mut d = doc(json);
        morph(&mut d).unwrap();
        let a = d.paths["/widgets#post-SchemaA"].verb("post").unwrap();
        let b = d.paths["/widgets#post-SchemaB"].verb("post").unwrap();
        assert_eq!(a.description.as_deref(), Some("From the schema"));
        // SchemaB is now the first alternative without its own description.
        assert_eq!(b.description.as_deref(), Some("Do the thing"));
    }

    #[test]
    fn test_invalid_ref_is_fatal() {
        let mut json = widget_doc();
        json["paths"]["/widgets"]["post"]["requestBody"]["content"]["application/json"]["schema"]
            ["oneOf"][1] = serde_json::json!({"$ref": "#/components/responses/Nope"});
        let mut d = doc(json);
        let err = morph(&mut d).unwrap_err();
        assert!(matches!(err, MorphError::InvalidRef { .. }));
    }

    #[test]
    fn test_collision_falls_back_to_path_prefix() {
        let mut json = widget_doc();
        json["paths"]["/other"] = serde_json::json!({
            "get": {"operationId": "SchemaA"}
        });
        let mut d = doc(json);
        morph(&mut d).unwrap();
        let a = d.paths["/widgets#post-SchemaA"].verb("post").unwrap();
        assert_eq!(a.operation_id.as_deref(), Some("WidSchemaA"));
    }

    #[test]
    fn test_unresolvable_collision_is_fatal() {
        let mut json = widget_doc();
        json["paths"]["/other"] = serde_json::json!({
            "get": {"operationId": "SchemaA"},
            "put": {"operationId": "WidSchemaA"}
        });
        let mut d = doc(json);
        let err = morph(&mut d).unwrap_err();
        match err {
            MorphError::DuplicateOperation { id, first, second } => {
                assert_eq!(id, "WidSchemaA");
                assert_eq!(first, "/other-put");
                assert_eq!(second, "/widgets-post");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_operation_ids_unique_after_morph() {
        let mut d = doc(widget_doc());
        morph(&mut d).unwrap();
        let mut seen = std::collections::HashSet::new();
        for item in d.paths.values() {
            for (_, op) in item.operations() {
                if let Some(id) = &op.operation_id {
                    assert!(seen.insert(id.clone()), "duplicate id {id}");
                }
            }
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut d = doc(serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/x": {"get": {"deprecated": true, "operationId": "oldX"}},
                "/y": {"post": {
                    "operationId": "createY",
                    "requestBody": {"content": {"application/json": {"schema": {
                        "oneOf": [
                            {"$ref": "#/components/schemas/SchemaA"},
                            {"$ref": "#/components/schemas/SchemaB"}
                        ]
                    }}}}
                }}
            },
            "components": {"schemas": {
                "SchemaA": {"properties": {"p": {"description": "a|b"}}},
                "SchemaB": {}
            }}
        }));
        morph(&mut d).unwrap();
        assert!(!d.paths.contains_key("/x"));
        assert!(!d.paths.contains_key("/y"));
        let a = d.paths["/y#post-SchemaA"].verb("post").unwrap();
        assert_eq!(a.operation_id.as_deref(), Some("SchemaA"));
        let reparsed = document::from_json(&serde_json::to_string(&d).unwrap()).unwrap();
        assert_eq!(
            reparsed.component_schema("SchemaA").unwrap().properties["p"].description_str(),
            Some("a/b")
        );
    }

    fn widget_doc() -> serde_json::Value {
        serde_json::json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/widgets": {"post": {
                    "operationId": "createWidget",
                    "description": "Do the thing",
                    "requestBody": {"content": {"application/json": {"schema": {
                        "oneOf": [
                            {"$ref": "#/components/schemas/SchemaA"},
                            {"$ref": "#/components/schemas/SchemaB"}
                        ]
                    }}}}
                }}
            },
            "components": {"schemas": {"SchemaA": {}, "SchemaB": {}}}
        })
    }
}
