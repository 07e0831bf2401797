use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operation::PathItem;
use super::schema::Schema;
use crate::error::DocumentError;

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Top-level OpenAPI 3.x document. The morph pass mutates it in place;
/// untyped parts pass through `info` and `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,

    pub info: serde_json::Value,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl OpenApiDocument {
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Look up a component schema by name.
    pub fn component_schema(&self, name: &str) -> Option<&Schema> {
        self.components.as_ref()?.schemas.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    const DOC: &str = r##"{
        "openapi": "3.0.3",
        "info": {"title": "Widgets", "version": "1.0.0"},
        "paths": {
            "/widgets": {
                "post": {"operationId": "createWidget", "responses": {"200": {"description": "ok"}}}
            }
        },
        "components": {
            "schemas": {"Widget": {"type": "object"}}
        },
        "tags": [{"name": "widgets"}]
    }"##;

    #[test]
    fn test_round_trip_preserves_untyped_fields() {
        let doc = document::from_json(DOC).unwrap();
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["tags"][0]["name"], "widgets");
        assert_eq!(
            out["paths"]["/widgets"]["post"]["responses"]["200"]["description"],
            "ok"
        );
        assert_eq!(out["info"]["title"], "Widgets");
    }

    #[test]
    fn test_component_schema_lookup() {
        let doc = document::from_json(DOC).unwrap();
        assert!(doc.component_schema("Widget").is_some());
        assert!(doc.component_schema("Gadget").is_none());
    }

    #[test]
    fn test_rejects_openapi_2() {
        let err = document::from_json(
            r#"{"openapi": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
