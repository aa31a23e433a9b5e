//! Normalizer, validation gate and template renderer exercised together
//! through the public API.

mod common;

use chrono::NaiveDate;
use serde_json::json;

use statutory_declaration_server::declaration::{
    normalize, normalize_on, validate, DeclarationRecord, Purchaser,
};
use statutory_declaration_server::generators::{
    DocumentTemplate, Escaping, StatutoryDeclarationGenerator, TemplateFields,
};

#[test]
fn test_singular_purchaser_becomes_one_element_sequence() {
    let record = normalize(&json!({
        "purchaser": { "name": "Ali", "ic": "800101-01-0001" }
    }));
    assert_eq!(record.purchasers, vec![Purchaser::new("Ali", "800101-01-0001")]);
}

#[test]
fn test_purchasers_array_wins_over_singular_purchaser() {
    let record = normalize(&json!({
        "purchasers": [{ "name": "Array", "ic": "1" }, { "name": "Second", "ic": "2" }],
        "purchaser": { "name": "Single", "ic": "3" },
        "name": "Scalar"
    }));
    assert_eq!(record.purchasers.len(), 2);
    assert_eq!(record.purchasers[0].name, "Array");
    assert_eq!(record.purchasers[1].name, "Second");
}

#[test]
fn test_property_address_alias() {
    let record = normalize(&json!({ "propertyAddress": "Lot 7, Jalan Y" }));
    assert_eq!(record.property, "Lot 7, Jalan Y");
}

#[test]
fn test_wrapped_payload_is_unwrapped_one_level() {
    let record = normalize(&json!({ "data": common::jane_tan_payload() }));
    assert_eq!(record.bank, "ABC Bank");

    let record = normalize(&json!({ "payload": common::jane_tan_payload() }));
    assert_eq!(record.facility, "Term Loan");
}

#[test]
fn test_missing_bank_and_date_reported_exactly() {
    let record = DeclarationRecord {
        purchasers: vec![Purchaser::new("Jane Tan", "900101-10-1234")],
        address: "1 Jalan X".to_string(),
        property: "Unit 5".to_string(),
        bank: String::new(),
        bank_address: "HQ".to_string(),
        branch_address: "Branch".to_string(),
        facility: "Term Loan".to_string(),
        date: String::new(),
    };

    let missing = validate(&record).unwrap_err();
    assert_eq!(missing.field_names(), vec!["bank", "date"]);
    assert_eq!(missing.joined(), "bank, date");
}

#[test]
fn test_empty_record_reports_all_eight_fields() {
    let missing = validate(&DeclarationRecord::default()).unwrap_err();
    assert_eq!(
        missing.field_names(),
        vec![
            "purchasers",
            "address",
            "property",
            "bank",
            "bankAddress",
            "branchAddress",
            "facility",
            "date"
        ]
    );
}

#[test]
fn test_empty_payload_only_patches_date() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let record = normalize_on(&json!({}), today);
    assert_eq!(record.date, "2024-06-30");

    let missing = validate(&record).unwrap_err();
    assert_eq!(missing.len(), 7);
    assert!(!missing.field_names().contains(&"date"));
}

#[test]
fn test_rendering_is_deterministic() {
    let record = normalize(&common::jane_tan_payload());
    let generator = StatutoryDeclarationGenerator::new();
    assert_eq!(generator.render_html(&record), generator.render_html(&record));
}

#[test]
fn test_jane_tan_end_to_end() {
    let record = normalize(&common::jane_tan_payload());
    assert!(validate(&record).is_ok());

    let document = StatutoryDeclarationGenerator::new().generate(&record).unwrap();
    let template = DocumentTemplate::statutory_declaration();
    let name_slots = template.as_str().matches("{{NAME}}").count();

    assert!(name_slots > 1);
    assert_eq!(document.html.matches("Jane Tan").count(), name_slots);
    assert!(document.html.contains("900101-10-1234"));
    assert!(document.html.contains("Unit 5, Block A"));
    assert!(!document.html.contains("{{"));
    assert_eq!(document.filename, "statutory-declaration-jane-tan.pdf");
}

#[test]
fn test_template_substitution_rules() {
    let fields = TemplateFields::from_record(&normalize(&common::jane_tan_payload()));
    let template = DocumentTemplate::new("{{NAME}}|{{NAME}}|{{NAME}}|{{UNKNOWN_FIELD}}|");
    assert_eq!(
        template.render(&fields, Escaping::Html),
        "Jane Tan|Jane Tan|Jane Tan||"
    );
}

#[test]
fn test_escaping_option_does_not_change_mapping() {
    let record = normalize(&json!({ "bankName": "<Bank & Co>" }));
    let fields = TemplateFields::from_record(&record);
    let template = DocumentTemplate::new("{{BANK}}");

    assert_eq!(template.render(&fields, Escaping::Html), "&lt;Bank &amp; Co&gt;");
    assert_eq!(template.render(&fields, Escaping::None), "<Bank & Co>");
}
