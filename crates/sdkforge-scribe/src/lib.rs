pub mod description;
pub mod directive;
pub mod engine;
pub mod error;
pub mod transforms;

pub use engine::DirectiveEngine;
pub use error::ScribeError;
