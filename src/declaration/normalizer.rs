//! Maps loosely shaped webhook payloads onto [`DeclarationRecord`].
//!
//! Automation tools send the same data under many key names, sometimes inside a
//! `data` or `payload` wrapper. Normalization never fails: anything that cannot
//! be found becomes an empty string and is left for the validation gate.

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};

use super::model::{DeclarationRecord, Purchaser, RawPayload};

/// Wrapper keys checked, in order, before falling back to the payload itself.
const WRAPPER_KEYS: &[&str] = &["data", "payload"];

pub(crate) const NAME_KEYS: &[&str] = &["name", "purchaserName", "customerName"];
pub(crate) const IC_KEYS: &[&str] = &["ic", "nric", "icNumber", "customerIc"];
pub(crate) const ADDRESS_KEYS: &[&str] = &["address", "customerAddress"];
pub(crate) const PROPERTY_KEYS: &[&str] = &["property", "propertyDetails", "propertyAddress"];
pub(crate) const BANK_KEYS: &[&str] = &["bank", "bankName"];
pub(crate) const BANK_ADDRESS_KEYS: &[&str] = &["bankAddress", "bankRegisteredAddress"];
pub(crate) const BRANCH_ADDRESS_KEYS: &[&str] = &["branchAddress", "branchOfficeAddress"];
pub(crate) const FACILITY_KEYS: &[&str] = &["facility", "facilityType", "loanType"];
pub(crate) const DATE_KEYS: &[&str] = &["date", "declarationDate"];

/// Normalize a payload, defaulting a missing date to today (UTC).
pub fn normalize(payload: &RawPayload) -> DeclarationRecord {
    normalize_on(payload, Utc::now().date_naive())
}

/// Normalize a payload with an explicit "today" for the date default.
pub fn normalize_on(payload: &RawPayload, today: NaiveDate) -> DeclarationRecord {
    let empty = Map::new();
    let fields = effective_payload(payload).unwrap_or(&empty);

    log::debug!(
        "normalizing payload with keys: [{}]",
        fields.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
    );

    let date = first_present(fields, DATE_KEYS)
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    DeclarationRecord {
        purchasers: resolve_purchasers(fields),
        address: first_present(fields, ADDRESS_KEYS).unwrap_or_default(),
        property: first_present(fields, PROPERTY_KEYS).unwrap_or_default(),
        bank: first_present(fields, BANK_KEYS).unwrap_or_default(),
        bank_address: first_present(fields, BANK_ADDRESS_KEYS).unwrap_or_default(),
        branch_address: first_present(fields, BRANCH_ADDRESS_KEYS).unwrap_or_default(),
        facility: first_present(fields, FACILITY_KEYS).unwrap_or_default(),
        date,
    }
}

/// Unwrap one level of `data` / `payload` nesting.
fn effective_payload(payload: &RawPayload) -> Option<&Map<String, Value>> {
    let root = payload.as_object()?;

    WRAPPER_KEYS
        .iter()
        .find_map(|key| root.get(*key).and_then(Value::as_object))
        .or(Some(root))
}

/// Array form wins over the singular form, which wins over scalar aliases.
fn resolve_purchasers(fields: &Map<String, Value>) -> Vec<Purchaser> {
    if let Some(Value::Array(items)) = fields.get("purchasers") {
        return items.iter().map(purchaser_from_value).collect();
    }

    if let Some(single) = fields.get("purchaser").filter(|value| is_truthy(value)) {
        return vec![purchaser_from_value(single)];
    }

    vec![Purchaser {
        name: first_present(fields, NAME_KEYS).unwrap_or_default(),
        ic: first_present(fields, IC_KEYS).unwrap_or_default(),
    }]
}

/// Array elements are expected to be `{name, ic}` already; no aliasing here.
fn purchaser_from_value(value: &Value) -> Purchaser {
    match value.as_object() {
        Some(obj) => Purchaser {
            name: obj.get("name").and_then(scalar_text).unwrap_or_default(),
            ic: obj.get("ic").and_then(scalar_text).unwrap_or_default(),
        },
        None => Purchaser::default(),
    }
}

fn first_present(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| fields.get(*key).and_then(scalar_text))
}

/// Text for a scalar that counts as present.
///
/// IC numbers regularly arrive as JSON numbers, so numbers are rendered as
/// their JSON text. `null`, `false`, empty strings and containers are absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_data_wrapper_is_unwrapped() {
        let payload = json!({ "data": { "bank": "ABC Bank" }, "bank": "Ignored" });
        let record = normalize_on(&payload, today());
        assert_eq!(record.bank, "ABC Bank");
    }

    #[test]
    fn test_payload_wrapper_is_unwrapped() {
        let payload = json!({ "payload": { "bankName": "XYZ Bank" } });
        let record = normalize_on(&payload, today());
        assert_eq!(record.bank, "XYZ Bank");
    }

    #[test]
    fn test_data_wrapper_checked_before_payload_wrapper() {
        let payload = json!({
            "payload": { "facility": "From payload" },
            "data": { "facility": "From data" }
        });
        let record = normalize_on(&payload, today());
        assert_eq!(record.facility, "From data");
    }

    #[test]
    fn test_non_object_wrapper_is_ignored() {
        let payload = json!({ "data": "not an object", "address": "1 Jalan X" });
        let record = normalize_on(&payload, today());
        assert_eq!(record.address, "1 Jalan X");
    }

    #[test]
    fn test_non_object_payload_normalizes_like_empty_object() {
        assert_eq!(
            normalize_on(&json!([1, 2, 3]), today()),
            normalize_on(&json!({}), today())
        );
        assert_eq!(
            normalize_on(&Value::Null, today()),
            normalize_on(&json!({}), today())
        );
    }

    #[test]
    fn test_scalar_aliases_synthesize_purchaser() {
        let payload = json!({ "customerName": "Ali", "icNumber": "850505-05-5555" });
        let record = normalize_on(&payload, today());
        assert_eq!(record.purchasers, vec![Purchaser::new("Ali", "850505-05-5555")]);
    }

    #[test]
    fn test_alias_order_first_non_empty_wins() {
        let payload = json!({
            "name": "",
            "purchaserName": "Second",
            "customerName": "Third",
            "nric": "111"
        });
        let record = normalize_on(&payload, today());
        assert_eq!(record.purchasers[0].name, "Second");
        assert_eq!(record.purchasers[0].ic, "111");
    }

    #[test]
    fn test_missing_identity_yields_empty_purchaser() {
        let record = normalize_on(&json!({}), today());
        assert_eq!(record.purchasers, vec![Purchaser::default()]);
    }

    #[test]
    fn test_numeric_ic_is_rendered_as_text() {
        let payload = json!({ "purchaser": { "name": "Ali", "ic": 900101101234u64 } });
        let record = normalize_on(&payload, today());
        assert_eq!(record.purchasers[0].ic, "900101101234");
    }

    #[test]
    fn test_purchaser_array_elements_are_not_aliased() {
        let payload = json!({ "purchasers": [{ "purchaserName": "Ali", "nric": "1" }] });
        let record = normalize_on(&payload, today());
        assert_eq!(record.purchasers, vec![Purchaser::default()]);
    }

    #[test]
    fn test_non_object_purchaser_elements_become_empty() {
        let payload = json!({ "purchasers": ["Ali", { "name": "Bo", "ic": "2" }] });
        let record = normalize_on(&payload, today());
        assert_eq!(record.purchasers.len(), 2);
        assert_eq!(record.purchasers[0], Purchaser::default());
        assert_eq!(record.purchasers[1], Purchaser::new("Bo", "2"));
    }

    #[test]
    fn test_empty_purchasers_array_is_kept_empty() {
        let payload = json!({ "purchasers": [], "name": "Fallback", "ic": "1" });
        let record = normalize_on(&payload, today());
        assert!(record.purchasers.is_empty());
    }

    #[test]
    fn test_date_defaults_to_today() {
        let record = normalize_on(&json!({}), today());
        assert_eq!(record.date, "2024-06-30");
    }

    #[test]
    fn test_declaration_date_alias() {
        let record = normalize_on(&json!({ "declarationDate": "2023-08-03" }), today());
        assert_eq!(record.date, "2023-08-03");
    }

    #[test]
    fn test_all_scalar_aliases() {
        let payload = json!({
            "customerAddress": "addr",
            "propertyDetails": "prop",
            "bankName": "bank",
            "bankRegisteredAddress": "bank addr",
            "branchOfficeAddress": "branch addr",
            "loanType": "loan"
        });
        let record = normalize_on(&payload, today());
        assert_eq!(record.address, "addr");
        assert_eq!(record.property, "prop");
        assert_eq!(record.bank, "bank");
        assert_eq!(record.bank_address, "bank addr");
        assert_eq!(record.branch_address, "branch addr");
        assert_eq!(record.facility, "loan");
    }
}
