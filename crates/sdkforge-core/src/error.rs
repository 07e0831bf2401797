use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Errors raised while morphing a document. Both variants indicate the
/// source document itself is broken and must be fixed by its author.
#[derive(Debug, Error)]
pub enum MorphError {
    #[error("request body alternative at {tag} is not a component schema reference: {reference}")]
    InvalidRef { tag: String, reference: String },

    #[error("duplicate operation id `{id}` between {first} and {second}")]
    DuplicateOperation {
        id: String,
        first: String,
        second: String,
    },
}
