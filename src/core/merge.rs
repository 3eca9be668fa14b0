use crate::domain::model::{
    DocumentReport, ExtractionMethod, ExtractionOutcome, MergedExtraction, ProcessingSummary,
};
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Merge per-document extraction results into one field map. For each field,
/// among all documents that produced a non-empty value, the value with the
/// highest reported confidence wins; the winning document is recorded as the
/// field's source.
pub fn merge_outcomes(outcomes: &[ExtractionOutcome]) -> MergedExtraction {
    let all_fields: BTreeSet<&String> = outcomes.iter().flat_map(|o| o.values.keys()).collect();

    tracing::info!(
        "🔗 Merging {} unique fields from {} documents",
        all_fields.len(),
        outcomes.len()
    );

    let mut values = HashMap::new();
    let mut confidence = HashMap::new();
    let mut sources = HashMap::new();

    for field in all_fields {
        let mut best_value = "";
        let mut best_confidence = 0.0_f64;
        let mut best_source = "";

        for outcome in outcomes {
            let Some(value) = outcome.values.get(field) else {
                continue;
            };
            let value_confidence = outcome.confidence.get(field).copied().unwrap_or(0.0);

            if is_better_value(value, value_confidence, best_value, best_confidence) {
                best_value = value;
                best_confidence = value_confidence;
                best_source = &outcome.document_name;
            }
        }

        if !best_value.is_empty() {
            tracing::debug!(
                "Merged {}: '{}' from {} ({:.2})",
                field,
                best_value,
                best_source,
                best_confidence
            );
            values.insert(field.clone(), best_value.to_string());
            confidence.insert(field.clone(), best_confidence);
            sources.insert(field.clone(), best_source.to_string());
        }
    }

    let summary = ProcessingSummary {
        documents_processed: outcomes.len(),
        successful_documents: outcomes
            .iter()
            .filter(|o| o.method != ExtractionMethod::Failed)
            .count(),
        total_processing_time: outcomes.iter().map(|o| o.elapsed).sum(),
        document_reports: outcomes
            .iter()
            .map(|o| DocumentReport {
                name: o.document_name.clone(),
                fields_extracted: o.values.len(),
                elapsed: o.elapsed,
                method: o.method.label(),
            })
            .collect(),
    };

    MergedExtraction {
        values,
        confidence,
        sources,
        summary,
    }
}

/// Ranking policy between two candidate values for the same field. A clear
/// confidence margin (> 0.1) decides; inside the margin, prefer materially
/// longer values, dollar amounts, and contact-looking strings.
fn is_better_value(
    new_value: &str,
    new_confidence: f64,
    current_value: &str,
    current_confidence: f64,
) -> bool {
    if current_value.is_empty() {
        return !new_value.is_empty();
    }
    if new_value.is_empty() {
        return false;
    }

    if new_confidence > current_confidence + 0.1 {
        return true;
    }
    if current_confidence > new_confidence + 0.1 {
        return false;
    }

    if new_value.len() as f64 > current_value.len() as f64 * 1.5 {
        return true;
    }

    if new_value.contains('$') && !current_value.contains('$') {
        return true;
    }

    if new_value.contains('@') || new_value.contains('(') {
        return true;
    }

    false
}
