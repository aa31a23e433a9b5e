//! Completeness gate for normalized declarations.
//!
//! Every missing field is reported, in a fixed order, so the webhook author can
//! fix the whole payload in one round trip.

use std::fmt;

use super::model::DeclarationRecord;
use super::normalizer::{
    ADDRESS_KEYS, BANK_ADDRESS_KEYS, BANK_KEYS, BRANCH_ADDRESS_KEYS, DATE_KEYS, FACILITY_KEYS,
    IC_KEYS, NAME_KEYS, PROPERTY_KEYS,
};
use crate::generators::traits::Validator;

/// Fields a declaration cannot be generated without, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Purchasers,
    Address,
    Property,
    Bank,
    BankAddress,
    BranchAddress,
    Facility,
    Date,
}

impl RequiredField {
    pub const ALL: [RequiredField; 8] = [
        RequiredField::Purchasers,
        RequiredField::Address,
        RequiredField::Property,
        RequiredField::Bank,
        RequiredField::BankAddress,
        RequiredField::BranchAddress,
        RequiredField::Facility,
        RequiredField::Date,
    ];

    /// Field name as it appears in the canonical payload.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Purchasers => "purchasers",
            Self::Address => "address",
            Self::Property => "property",
            Self::Bank => "bank",
            Self::BankAddress => "bankAddress",
            Self::BranchAddress => "branchAddress",
            Self::Facility => "facility",
            Self::Date => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Purchasers => "Purchaser name and NRIC",
            Self::Address => "Purchaser address",
            Self::Property => "Property details",
            Self::Bank => "Bank name",
            Self::BankAddress => "Bank registered address",
            Self::BranchAddress => "Bank branch address",
            Self::Facility => "Facility",
            Self::Date => "Declaration date",
        }
    }

    fn suggestion(&self) -> String {
        let keys = |aliases: &[&str]| aliases.join(" | ");
        match self {
            Self::Purchasers => format!(
                "send a `purchasers` array, a `purchaser` object, or `{}` with `{}`",
                keys(NAME_KEYS),
                keys(IC_KEYS)
            ),
            Self::Address => format!("send one of: {}", keys(ADDRESS_KEYS)),
            Self::Property => format!("send one of: {}", keys(PROPERTY_KEYS)),
            Self::Bank => format!("send one of: {}", keys(BANK_KEYS)),
            Self::BankAddress => format!("send one of: {}", keys(BANK_ADDRESS_KEYS)),
            Self::BranchAddress => format!("send one of: {}", keys(BRANCH_ADDRESS_KEYS)),
            Self::Facility => format!("send one of: {}", keys(FACILITY_KEYS)),
            Self::Date => format!("send one of: {} (YYYY-MM-DD)", keys(DATE_KEYS)),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One missing field with a user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub field: RequiredField,
    pub message: String,
    pub suggestion: Option<String>,
}

impl MissingField {
    pub fn new(field: RequiredField) -> Self {
        Self {
            field,
            message: format!("{} must not be empty", field.label()),
            suggestion: Some(field.suggestion()),
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

/// Every required field absent from a [`DeclarationRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingFieldsError {
    missing: Vec<MissingField>,
}

impl MissingFieldsError {
    pub fn new() -> Self {
        Self {
            missing: Vec::new(),
        }
    }

    pub fn add(&mut self, field: RequiredField) {
        self.missing.push(MissingField::new(field));
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn fields(&self) -> Vec<RequiredField> {
        self.missing.iter().map(|m| m.field).collect()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.missing.iter().map(|m| m.field.name()).collect()
    }

    pub fn details(&self) -> &[MissingField] {
        &self.missing
    }

    /// Field names joined for display, e.g. `"address, bank"`.
    pub fn joined(&self) -> String {
        self.field_names().join(", ")
    }

    /// Numbered, multi-line explanation with fix suggestions.
    pub fn detailed_message(&self) -> String {
        if self.missing.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} required field(s) missing",
            self.missing.len()
        )];
        for (i, missing) in self.missing.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, missing));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), MissingFieldsError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for MissingFieldsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing required fields: {}", self.joined())
    }
}

impl std::error::Error for MissingFieldsError {}

fn validate_required(
    value: &str,
    field: RequiredField,
    errors: &mut MissingFieldsError,
) {
    if value.is_empty() {
        errors.add(field);
    }
}

/// Check a record for completeness, collecting every missing field.
pub fn validate(record: &DeclarationRecord) -> Result<(), MissingFieldsError> {
    let mut errors = MissingFieldsError::new();

    let purchaser_ok = record
        .first_purchaser()
        .is_some_and(|p| !p.name.is_empty() && !p.ic.is_empty());
    if !purchaser_ok {
        errors.add(RequiredField::Purchasers);
    }

    validate_required(&record.address, RequiredField::Address, &mut errors);
    validate_required(&record.property, RequiredField::Property, &mut errors);
    validate_required(&record.bank, RequiredField::Bank, &mut errors);
    validate_required(&record.bank_address, RequiredField::BankAddress, &mut errors);
    validate_required(&record.branch_address, RequiredField::BranchAddress, &mut errors);
    validate_required(&record.facility, RequiredField::Facility, &mut errors);
    validate_required(&record.date, RequiredField::Date, &mut errors);

    errors.into_result()
}

impl Validator for DeclarationRecord {
    type Error = MissingFieldsError;

    fn validate(&self) -> Result<(), MissingFieldsError> {
        validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::model::Purchaser;

    fn complete_record() -> DeclarationRecord {
        DeclarationRecord {
            purchasers: vec![Purchaser::new("Jane Tan", "900101-10-1234")],
            address: "1 Jalan X".to_string(),
            property: "Unit 5, Block A".to_string(),
            bank: "ABC Bank".to_string(),
            bank_address: "HQ, KL".to_string(),
            branch_address: "Branch, Klang".to_string(),
            facility: "Term Loan".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_complete_record_passes() {
        assert!(validate(&complete_record()).is_ok());
    }

    #[test]
    fn test_reports_exactly_missing_fields() {
        let mut record = complete_record();
        record.bank.clear();
        record.date.clear();

        let err = validate(&record).unwrap_err();
        assert_eq!(err.fields(), vec![RequiredField::Bank, RequiredField::Date]);
        assert_eq!(err.joined(), "bank, date");
    }

    #[test]
    fn test_purchaser_needs_both_name_and_ic() {
        let mut record = complete_record();
        record.purchasers = vec![Purchaser::new("Jane Tan", "")];
        let err = validate(&record).unwrap_err();
        assert_eq!(err.field_names(), vec!["purchasers"]);
    }

    #[test]
    fn test_only_first_purchaser_is_checked() {
        let mut record = complete_record();
        record.purchasers.push(Purchaser::default());
        assert!(validate(&record).is_ok());

        record.purchasers.reverse();
        assert!(validate(&record).is_err());
    }

    #[test]
    fn test_empty_purchaser_list_is_missing() {
        let mut record = complete_record();
        record.purchasers.clear();
        let err = validate(&record).unwrap_err();
        assert_eq!(err.fields(), vec![RequiredField::Purchasers]);
    }

    #[test]
    fn test_whitespace_only_value_is_present() {
        let mut record = complete_record();
        record.facility = " ".to_string();
        record.purchasers = vec![Purchaser::new(" ", "900101-10-1234")];
        assert!(validate(&record).is_ok());
    }

    #[test]
    fn test_display_message() {
        let mut errors = MissingFieldsError::new();
        errors.add(RequiredField::Address);
        errors.add(RequiredField::Bank);
        assert_eq!(errors.to_string(), "Missing required fields: address, bank");
    }

    #[test]
    fn test_detailed_message_lists_suggestions() {
        let mut errors = MissingFieldsError::new();
        errors.add(RequiredField::Property);
        let msg = errors.detailed_message();
        assert!(msg.contains("1 required field(s) missing"));
        assert!(msg.contains("propertyAddress"));
    }

    #[test]
    fn test_validator_trait_delegates() {
        let record = DeclarationRecord::default();
        let err = Validator::validate(&record).unwrap_err();
        assert_eq!(err.len(), 8);
    }
}
