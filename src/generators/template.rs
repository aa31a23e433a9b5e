//! Placeholder substitution for HTML document templates.
//!
//! Templates mark substitution points with `{{TOKEN}}`. Every token is
//! replaced: known tokens with their field value, unknown tokens with an empty
//! string, so no raw placeholder ever reaches the output.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::common::escape_html;
use crate::declaration::DeclarationRecord;

const STATUTORY_DECLARATION_HTML: &str = include_str!("../../static/statutory_declaration.html");

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid")
    })
}

/// How field values are written into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    /// Values are HTML-escaped before insertion.
    #[default]
    Html,
    /// Values are inserted verbatim.
    None,
}

/// Flat token-to-value mapping projected from a [`DeclarationRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFields {
    values: HashMap<&'static str, String>,
}

impl TemplateFields {
    /// Tokens the statutory declaration template understands.
    pub const KNOWN_TOKENS: [&'static str; 9] = [
        "NAME",
        "NRIC",
        "ADDRESS",
        "PROPERTY",
        "BANK",
        "BANK_ADDRESS",
        "BRANCH_ADDRESS",
        "FACILITY",
        "DATE",
    ];

    pub fn from_record(record: &DeclarationRecord) -> Self {
        let (name, ic) = record
            .first_purchaser()
            .map(|p| (p.name.clone(), p.ic.clone()))
            .unwrap_or_default();

        let values = HashMap::from([
            ("NAME", name),
            ("NRIC", ic),
            ("ADDRESS", record.address.clone()),
            ("PROPERTY", record.property.clone()),
            ("BANK", record.bank.clone()),
            ("BANK_ADDRESS", record.bank_address.clone()),
            ("BRANCH_ADDRESS", record.branch_address.clone()),
            ("FACILITY", record.facility.clone()),
            ("DATE", record.date.clone()),
        ]);

        Self { values }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Self::KNOWN_TOKENS
            .into_iter()
            .filter_map(move |token| self.get(token).map(|value| (token, value)))
    }
}

/// A static HTML document with `{{TOKEN}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    source: Cow<'static, str>,
}

impl DocumentTemplate {
    /// The canonical two-page statutory declaration.
    pub fn statutory_declaration() -> Self {
        Self {
            source: Cow::Borrowed(STATUTORY_DECLARATION_HTML),
        }
    }

    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Cow::Owned(source.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder tokens present in the template.
    pub fn placeholders(&self) -> BTreeSet<&str> {
        placeholder_pattern()
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Substitute every placeholder.
    pub fn render(&self, fields: &TemplateFields, escaping: Escaping) -> String {
        placeholder_pattern()
            .replace_all(&self.source, |caps: &Captures| {
                let value = fields.get(&caps[1]).unwrap_or_default();
                match escaping {
                    Escaping::Html => escape_html(value),
                    Escaping::None => value.to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self::statutory_declaration()
    }
}
