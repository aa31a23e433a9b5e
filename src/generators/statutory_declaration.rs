//! Generator for the Statutory Declaration (residential property for owner
//! occupation).
//!
//! Validates a normalized [`DeclarationRecord`] and fills the canonical
//! two-page template. PDF conversion is left to [`crate::rendering`].

use super::common::{document_filename, escape_html};
use super::template::{DocumentTemplate, Escaping, TemplateFields};
use super::traits::{Generator, Validator};
use super::{GeneratedDocument, GeneratorError};
use crate::declaration::DeclarationRecord;

/// Generator for the statutory declaration HTML document.
#[derive(Debug, Clone)]
pub struct StatutoryDeclarationGenerator {
    template: DocumentTemplate,
    escaping: Escaping,
}

impl StatutoryDeclarationGenerator {
    /// Generator over the canonical template, escaping values as HTML.
    pub fn new() -> Self {
        Self::with_template(DocumentTemplate::statutory_declaration())
    }

    pub fn with_template(template: DocumentTemplate) -> Self {
        Self {
            template,
            escaping: Escaping::Html,
        }
    }

    pub fn escaping(mut self, escaping: Escaping) -> Self {
        self.escaping = escaping;
        self
    }

    pub fn template(&self) -> &DocumentTemplate {
        &self.template
    }

    /// Fill the template without checking completeness.
    pub fn render_html(&self, record: &DeclarationRecord) -> String {
        let fields = TemplateFields::from_record(record);
        self.template.render(&fields, self.escaping)
    }
}

impl Default for StatutoryDeclarationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Generator<&'a DeclarationRecord> for StatutoryDeclarationGenerator {
    fn generate(&self, record: &'a DeclarationRecord) -> Result<GeneratedDocument, GeneratorError> {
        record.validate()?;

        let purchaser_name = record
            .first_purchaser()
            .map(|p| p.name.clone())
            .unwrap_or_default();

        Ok(GeneratedDocument {
            filename: document_filename(&purchaser_name, "pdf"),
            html: self.render_html(record),
            date: record.date.clone(),
            purchaser_name,
        })
    }
}

// Inherent impl for ease of use
impl StatutoryDeclarationGenerator {
    pub fn generate(&self, record: &DeclarationRecord) -> Result<GeneratedDocument, GeneratorError> {
        Generator::generate(self, record)
    }
}

/// Insert an explanatory notice before `</body>`, or append it if absent.
pub fn with_notice(html: &str, title: &str, detail: &str) -> String {
    let notice = format!(
        concat!(
            "<div style=\"background: #fff3cd; padding: 20px; margin: 20px 0; ",
            "border-left: 4px solid #ffc107;\">\n",
            "  <h3>{}</h3>\n",
            "  <p>{}</p>\n",
            "</div>\n"
        ),
        escape_html(title),
        escape_html(detail)
    );

    match html.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + notice.len());
            out.push_str(&html[..idx]);
            out.push_str(&notice);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{notice}"),
    }
}
