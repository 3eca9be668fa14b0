use crate::domain::model::FormPayload;
use std::collections::HashMap;

const DEFAULT_CONFIDENCE: f64 = 0.85;

/// Final cleanup before writing: trim, drop empties, normalize phone and
/// currency formats by field name. Fields whose confidence the mapper could
/// not attribute get a flat default.
pub fn validate_payload(
    mapped: HashMap<String, String>,
    confidence: HashMap<String, f64>,
) -> FormPayload {
    let mut payload = FormPayload::default();

    for (field_name, value) in mapped {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }

        let validated = if is_phone_field(&field_name) {
            format_phone(trimmed)
        } else if is_amount_field(&field_name) {
            format_currency(trimmed)
        } else {
            trimmed.to_string()
        };

        let field_confidence = confidence
            .get(&field_name)
            .copied()
            .unwrap_or(DEFAULT_CONFIDENCE);
        payload.confidence.insert(field_name.clone(), field_confidence);
        payload.fields.insert(field_name, validated);
    }

    payload
}

fn is_phone_field(field_name: &str) -> bool {
    field_name.to_lowercase().contains("phone")
}

fn is_amount_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    ["amount", "balance", "decimal", "debts", "loans", "cards", "total"]
        .iter()
        .any(|kw| lower.contains(kw))
}

fn format_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        value.to_string()
    }
}

fn format_currency(value: &str) -> String {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match clean.parse::<f64>() {
        Ok(amount) => format!("{:.2}", amount),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_empty_values() {
        let mut mapped = HashMap::new();
        mapped.insert("Party1[0]".to_string(), "  TAHIRA FRANCIS  ".to_string());
        mapped.insert("Party2[0]".to_string(), "   ".to_string());

        let payload = validate_payload(mapped, HashMap::new());

        assert_eq!(payload.fields.get("Party1[0]").unwrap(), "TAHIRA FRANCIS");
        assert!(!payload.fields.contains_key("Party2[0]"));
    }

    #[test]
    fn test_formats_phone_fields() {
        let mut mapped = HashMap::new();
        mapped.insert("Phone[0]".to_string(), "8186384456".to_string());

        let payload = validate_payload(mapped, HashMap::new());

        assert_eq!(payload.fields.get("Phone[0]").unwrap(), "(818) 638-4456");
    }

    #[test]
    fn test_leaves_short_phone_untouched() {
        let mut mapped = HashMap::new();
        mapped.insert("Phone[0]".to_string(), "638-4456".to_string());

        let payload = validate_payload(mapped, HashMap::new());

        assert_eq!(payload.fields.get("Phone[0]").unwrap(), "638-4456");
    }

    #[test]
    fn test_formats_currency_fields() {
        let mut mapped = HashMap::new();
        mapped.insert("DecimalField40[0]".to_string(), "$22,000.00".to_string());
        mapped.insert("DecimalField36[0]".to_string(), "3042.81".to_string());
        mapped.insert("DecimalField41[0]".to_string(), "64225".to_string());

        let payload = validate_payload(mapped, HashMap::new());

        assert_eq!(payload.fields.get("DecimalField40[0]").unwrap(), "22000.00");
        assert_eq!(payload.fields.get("DecimalField36[0]").unwrap(), "3042.81");
        assert_eq!(payload.fields.get("DecimalField41[0]").unwrap(), "64225.00");
    }

    #[test]
    fn test_unparseable_currency_passes_through() {
        let mut mapped = HashMap::new();
        mapped.insert(
            "DecimalField43[0]".to_string(),
            "see attachment".to_string(),
        );

        let payload = validate_payload(mapped, HashMap::new());

        assert_eq!(
            payload.fields.get("DecimalField43[0]").unwrap(),
            "see attachment"
        );
    }

    #[test]
    fn test_confidence_defaults_when_missing() {
        let mut mapped = HashMap::new();
        mapped.insert("Party1[0]".to_string(), "TAHIRA FRANCIS".to_string());
        mapped.insert("CaseNumber[0]".to_string(), "24STFL00615".to_string());

        let mut confidence = HashMap::new();
        confidence.insert("CaseNumber[0]".to_string(), 0.95);

        let payload = validate_payload(mapped, confidence);

        assert!((payload.confidence.get("Party1[0]").unwrap() - 0.85).abs() < f64::EPSILON);
        assert!((payload.confidence.get("CaseNumber[0]").unwrap() - 0.95).abs() < f64::EPSILON);
    }
}
