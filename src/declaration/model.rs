use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incoming webhook or form body, shape unknown until normalized.
pub type RawPayload = serde_json::Value;

/// A declarant named on the statutory declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Purchaser {
    #[schema(example = "Jane Tan")]
    #[serde(default)]
    pub name: String,
    /// National identity card number, free-form.
    #[schema(example = "900101-10-1234")]
    #[serde(default)]
    pub ic: String,
}

impl Purchaser {
    pub fn new(name: impl Into<String>, ic: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ic: ic.into(),
        }
    }
}

/// Canonical declaration data produced by the normalizer.
///
/// Only the first purchaser is printed on the document, but the full ordered
/// list is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRecord {
    pub purchasers: Vec<Purchaser>,
    #[schema(example = "1 Jalan X, 43200 Cheras, Selangor")]
    pub address: String,
    #[schema(example = "Unit 5, Block A")]
    pub property: String,
    #[schema(example = "ABC Bank Berhad")]
    pub bank: String,
    #[schema(example = "HQ, Kuala Lumpur")]
    pub bank_address: String,
    #[schema(example = "Branch, Klang")]
    pub branch_address: String,
    #[schema(example = "Term Loan")]
    pub facility: String,
    #[schema(example = "2024-01-01")]
    pub date: String,
}

impl DeclarationRecord {
    pub fn first_purchaser(&self) -> Option<&Purchaser> {
        self.purchasers.first()
    }
}
