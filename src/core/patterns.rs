use crate::core::mapper::FieldMap;
use regex::Regex;
use std::collections::HashMap;

/// What kind of data a canonical field is asking for. Decides which regex
/// set the fallback extractor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIntent {
    PersonName,
    CaseIdentifier,
    PhoneNumber,
    EmailAddress,
    Address,
    MonetaryAmount,
    Date,
    General,
}

pub fn intent_for(key: &str, description: &str) -> FieldIntent {
    let combined = format!("{} {}", key, description).to_lowercase();

    if combined.contains("phone") || combined.contains("telephone") {
        FieldIntent::PhoneNumber
    } else if combined.contains("email") || combined.contains("e-mail") {
        FieldIntent::EmailAddress
    } else if combined.contains("date") {
        FieldIntent::Date
    } else if combined.contains("case") && combined.contains("number")
        || combined.contains("docket")
    {
        FieldIntent::CaseIdentifier
    } else if ["amount", "value", "balance", "total", "loans", "cards", "debt", "taxes"]
        .iter()
        .any(|kw| combined.contains(kw))
    {
        FieldIntent::MonetaryAmount
    } else if combined.contains("address") || combined.contains("street") {
        FieldIntent::Address
    } else if ["name", "petitioner", "respondent", "attorney", "counsel", "county"]
        .iter()
        .any(|kw| combined.contains(kw))
    {
        FieldIntent::PersonName
    } else {
        FieldIntent::General
    }
}

fn base_confidence(intent: FieldIntent) -> f64 {
    match intent {
        FieldIntent::PhoneNumber | FieldIntent::EmailAddress | FieldIntent::MonetaryAmount => 0.7,
        FieldIntent::CaseIdentifier => 0.65,
        FieldIntent::PersonName | FieldIntent::Date => 0.6,
        FieldIntent::Address => 0.55,
        FieldIntent::General => 0.5,
    }
}

/// Key-specific labelled patterns, tried before the generic intent set so
/// that e.g. `petitioner` and `respondent` do not grab each other's names.
fn labeled_patterns(key: &str) -> Vec<&'static str> {
    let key_lower = key.to_lowercase();
    let mut patterns = Vec::new();

    if key_lower.contains("petitioner") {
        patterns.push(r"(?m)PETITIONER:\s*([^\n]+)");
    }
    if key_lower.contains("respondent") {
        patterns.push(r"(?m)RESPONDENT:\s*([^\n]+)");
    }
    if key_lower.contains("attorney") && !key_lower.contains("phone") && !key_lower.contains("email")
    {
        patterns.push(r"ATTORNEY[^:\n]*:\s*([A-Z][a-z]+(?: [A-Z][a-z]+)+)");
    }
    if key_lower.contains("county") || key_lower.contains("court") {
        patterns.push(r"COUNTY OF\s+([A-Z][A-Z ]+)");
    }
    if key_lower.contains("case") {
        patterns.push(r"(?:CASE|FILE|DOCKET)\s*(?:NO\.?|NUMBER)?\s*:?\s*([A-Z0-9-]{6,})");
    }

    patterns
}

fn intent_patterns(intent: FieldIntent) -> Vec<&'static str> {
    match intent {
        FieldIntent::PersonName => vec![
            r"\b([A-Z][a-z]+ [A-Z][a-z]+(?: [A-Z][a-z]+)?)\b",
        ],
        FieldIntent::CaseIdentifier => vec![r"\b(\d{2}[A-Z]{2,4}\d{5,8})\b"],
        FieldIntent::EmailAddress => {
            vec![r"\b([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})\b"]
        }
        FieldIntent::Address => vec![
            r"\b(\d+\s+[A-Za-z ]+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Way|Place|Pl))\b",
        ],
        // Excludes $0.00 and bare single digits, which are template content.
        FieldIntent::MonetaryAmount => vec![r"\$\s*([1-9]\d{0,2}(?:,\d{3})*(?:\.\d{2})?)"],
        FieldIntent::Date => vec![
            r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{4})\b",
            r"\b([A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4})\b",
        ],
        FieldIntent::PhoneNumber | FieldIntent::General => vec![],
    }
}

fn capture_all(pattern: &str, text: &str) -> Vec<String> {
    let re = Regex::new(pattern).unwrap();
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches([',', '.']).to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn capture_phones(text: &str) -> Vec<String> {
    let re = Regex::new(r"\(?(\d{3})\)?[-.\s]?(\d{3})[-.\s](\d{4})").unwrap();
    re.captures_iter(text)
        .map(|caps| format!("({}) {}-{}", &caps[1], &caps[2], &caps[3]))
        .collect()
}

/// Pattern-matching fallback used when no provider is configured or every
/// provider call failed. Candidates come from key-specific labelled patterns
/// first, then the generic intent set; a candidate that occurs more than 3
/// times in the text is treated as boilerplate and penalized below the
/// acceptance threshold.
pub fn pattern_extract(
    text: &str,
    map: &FieldMap,
) -> (HashMap<String, String>, HashMap<String, f64>) {
    let mut values = HashMap::new();
    let mut confidence = HashMap::new();

    for target in &map.fields {
        let intent = intent_for(&target.key, &target.description);

        let mut candidates = Vec::new();
        for pattern in labeled_patterns(&target.key) {
            candidates.extend(capture_all(pattern, text));
        }
        if intent == FieldIntent::PhoneNumber {
            candidates.extend(capture_phones(text));
        }
        for pattern in intent_patterns(intent) {
            candidates.extend(capture_all(pattern, text));
        }

        let mut best: Option<(f64, &String)> = None;
        for candidate in &candidates {
            let mut score = 1.0;
            let occurrences = text.matches(candidate.as_str()).count();
            if occurrences > 3 {
                score *= 0.3;
            }
            // Earlier candidates come from labelled patterns; strict `>`
            // keeps them on ties.
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, candidate));
            }
        }

        if let Some((score, value)) = best {
            if score >= 0.5 {
                values.insert(target.key.clone(), value.clone());
                confidence.insert(target.key.clone(), base_confidence(intent));
            }
        }
    }

    (values, confidence)
}
