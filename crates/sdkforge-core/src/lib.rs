pub mod config;
pub mod document;
pub mod error;
pub mod morph;

pub use document::OpenApiDocument;
pub use morph::morph;
