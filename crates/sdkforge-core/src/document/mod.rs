pub mod operation;
pub mod schema;
pub mod spec;

use std::fs;
use std::path::Path;

use crate::error::DocumentError;
pub use operation::{HTTP_VERBS, MediaType, Operation, PathItem, RequestBody};
pub use schema::Schema;
pub use spec::{Components, OpenApiDocument};

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiDocument, DocumentError> {
    let doc: OpenApiDocument = serde_yaml_ng::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiDocument, DocumentError> {
    let doc: OpenApiDocument = serde_json::from_str(input)?;
    validate_version(&doc)?;
    Ok(doc)
}

/// Load a document from disk, picking the parser by file extension.
pub fn from_path(path: &Path) -> Result<OpenApiDocument, DocumentError> {
    let content = fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    match ext {
        "yaml" | "yml" => from_yaml(&content),
        _ => from_json(&content),
    }
}

fn validate_version(doc: &OpenApiDocument) -> Result<(), DocumentError> {
    if !doc.openapi.starts_with("3.") {
        return Err(DocumentError::UnsupportedVersion(doc.openapi.clone()));
    }
    Ok(())
}
