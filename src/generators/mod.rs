//! Generators module - business logic for producing documents from HTML templates.
//!
//! - `template` - `{{TOKEN}}` substitution over a static template
//! - `statutory_declaration` - the Statutory Declaration document

pub mod common;
pub mod statutory_declaration;
pub mod template;
pub mod traits;

pub use statutory_declaration::StatutoryDeclarationGenerator;
pub use template::{DocumentTemplate, Escaping, TemplateFields};
pub use traits::{Generator, Validator};

use thiserror::Error;

use crate::declaration::MissingFieldsError;

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    MissingFields(#[from] MissingFieldsError),
}

/// Result of a successful document generation.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// Suggested download name for the PDF rendering.
    pub filename: String,
    pub html: String,
    pub date: String,
    pub purchaser_name: String,
}
