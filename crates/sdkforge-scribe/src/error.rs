use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("failed to read scribe source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scribe description: {0}")]
    Description(#[from] serde_yaml_ng::Error),

    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}
