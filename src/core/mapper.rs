use crate::domain::model::{FormField, MergedExtraction};
use crate::utils::error::{FillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One canonical extraction key with its human description and the literal
/// PDF field names it writes to on the target form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetField {
    pub key: String,
    pub description: String,
    #[serde(default)]
    pub field_names: Vec<String>,
}

/// Static mapping table for one form type, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMap {
    pub form: String,
    pub fields: Vec<TargetField>,
}

impl FieldMap {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let map: FieldMap = serde_json::from_str(content)?;
        if map.fields.is_empty() {
            return Err(FillError::Mapping {
                message: format!("field map for '{}' has no entries", map.form),
            });
        }
        Ok(map)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Built-in FL-142 (Schedule of Assets and Debts) table.
    pub fn fl142() -> Result<Self> {
        Self::from_json_str(include_str!("../../data/fl142_field_map.json"))
    }

    pub fn get(&self, key: &str) -> Option<&TargetField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

pub struct FieldMapper {
    map: FieldMap,
}

impl FieldMapper {
    pub fn new(map: FieldMap) -> Self {
        Self { map }
    }

    pub fn fl142() -> Result<Self> {
        Ok(Self::new(FieldMap::fl142()?))
    }

    /// Map merged canonical values onto the literal fields dumped from the
    /// target form. The mapping table short-circuits keyword scoring; keys
    /// without a table hit fall back to token matching against the field
    /// name + alt text.
    pub fn map_to_form(
        &self,
        form_fields: &[FormField],
        merged: &MergedExtraction,
    ) -> (HashMap<String, String>, HashMap<String, f64>) {
        let mut mapped: HashMap<String, String> = HashMap::new();
        let mut confidence: HashMap<String, f64> = HashMap::new();
        let mut table_mapped_keys: HashSet<&str> = HashSet::new();

        // Pass 1: table entries. Dumped field names may carry the full
        // widget hierarchy, so candidates match on exact name or suffix.
        for target in &self.map.fields {
            let Some(value) = merged.values.get(&target.key) else {
                continue;
            };
            for candidate in &target.field_names {
                let hit = form_fields.iter().find(|f| {
                    (&f.name == candidate || f.name.ends_with(candidate))
                        && !mapped.contains_key(&f.name)
                });
                if let Some(field) = hit {
                    let conf = merged.confidence.get(&target.key).copied().unwrap_or(0.8);
                    mapped.insert(field.name.clone(), value.clone());
                    confidence.insert(field.name.clone(), conf);
                    table_mapped_keys.insert(target.key.as_str());
                    tracing::debug!(
                        "Table mapping: {} -> {} ('{}')",
                        target.key,
                        field.name,
                        value
                    );
                    break;
                }
            }
        }

        // Pass 2: keyword scoring for whatever the table did not cover.
        for field in form_fields {
            if mapped.contains_key(&field.name) {
                continue;
            }
            let field_text = format!("{} {}", field.name, field.alt_text).to_lowercase();

            let mut best: Option<(f64, &String, &String)> = None;
            for (key, value) in &merged.values {
                if table_mapped_keys.contains(key.as_str()) {
                    continue;
                }
                let score = keyword_score(key, &field_text);
                if score > 0.5 && best.map_or(true, |(s, _, _)| score > s) {
                    best = Some((score, key, value));
                }
            }

            if let Some((score, key, value)) = best {
                tracing::debug!(
                    "Keyword mapping: {} -> {} (score {:.2})",
                    key,
                    field.name,
                    score
                );
                mapped.insert(field.name.clone(), value.clone());
                confidence.insert(field.name.clone(), score);
            }
        }

        (mapped, confidence)
    }
}

fn keyword_score(key: &str, field_text: &str) -> f64 {
    let key_lower = key.to_lowercase();
    let mut score: f64 = 0.0;

    if key_lower
        .split('_')
        .any(|token| token.len() > 2 && field_text.contains(token))
    {
        score += 0.8;
    }

    for strong in ["petitioner", "respondent", "attorney", "case"] {
        if key_lower.contains(strong) && field_text.contains(strong) {
            score += 0.9;
            break;
        }
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProcessingSummary;
    use std::time::Duration;

    fn merged_with(values: &[(&str, &str, f64)]) -> MergedExtraction {
        let mut merged = MergedExtraction {
            values: HashMap::new(),
            confidence: HashMap::new(),
            sources: HashMap::new(),
            summary: ProcessingSummary {
                documents_processed: 1,
                successful_documents: 1,
                total_processing_time: Duration::from_secs(1),
                document_reports: vec![],
            },
        };
        for (key, value, conf) in values {
            merged.values.insert(key.to_string(), value.to_string());
            merged.confidence.insert(key.to_string(), *conf);
        }
        merged
    }

    fn form_field(name: &str, alt: &str) -> FormField {
        FormField {
            name: name.to_string(),
            alt_text: alt.to_string(),
            kind: "Text".to_string(),
            state_options: vec![],
        }
    }

    #[test]
    fn test_table_mapping_matches_field_suffix() {
        let mapper = FieldMapper::fl142().unwrap();
        let fields = vec![form_field(
            "FL-142[0].Page4[0].Table4[0].Row5[0].DecimalField40[0]",
            "STUDENT LOANS (Give details.)",
        )];
        let merged = merged_with(&[("student_loans", "22000.00", 0.92)]);

        let (mapped, confidence) = mapper.map_to_form(&fields, &merged);

        let name = "FL-142[0].Page4[0].Table4[0].Row5[0].DecimalField40[0]";
        assert_eq!(mapped.get(name).unwrap(), "22000.00");
        assert!((confidence.get(name).unwrap() - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_keyword_mapping_for_unlisted_key() {
        let map = FieldMap {
            form: "TEST".to_string(),
            fields: vec![TargetField {
                key: "unused".to_string(),
                description: "unused".to_string(),
                field_names: vec![],
            }],
        };
        let mapper = FieldMapper::new(map);
        let fields = vec![form_field("Party1[0]", "PETITIONER")];
        let merged = merged_with(&[("petitioner_name", "TAHIRA FRANCIS", 0.9)]);

        let (mapped, _) = mapper.map_to_form(&fields, &merged);

        assert_eq!(mapped.get("Party1[0]").unwrap(), "TAHIRA FRANCIS");
    }

    #[test]
    fn test_unrelated_keys_are_not_mapped() {
        let mapper = FieldMapper::fl142().unwrap();
        let fields = vec![form_field("SigDate[0]", "Date")];
        let merged = merged_with(&[("credit_cards", "3042.81", 0.9)]);

        let (mapped, _) = mapper.map_to_form(&fields, &merged);

        assert!(mapped.is_empty());
    }

    #[test]
    fn test_fl142_builtin_map_loads() {
        let map = FieldMap::fl142().unwrap();
        assert_eq!(map.form, "FL-142");
        assert!(map.fields.len() >= 25);
        assert!(map.get("student_loans").is_some());
        assert!(map.get("total_debts").is_some());
    }

    #[test]
    fn test_field_map_rejects_empty_table() {
        let err = FieldMap::from_json_str(r#"{"form": "X", "fields": []}"#).unwrap_err();
        assert!(err.to_string().contains("no entries"));
    }
}
