use crate::core::mapper::FieldMap;
use crate::domain::model::{DocumentKind, DocumentSource};

/// Build the single-document extraction prompt: a strategy block chosen by
/// document type, the canonical field table, and the document text, with a
/// JSON-only response contract.
pub fn build_extraction_prompt(doc: &DocumentSource, map: &FieldMap) -> String {
    let field_lines: Vec<String> = map
        .fields
        .iter()
        .map(|f| format!("- {}: {}", f.key, f.description))
        .collect();

    format!(
        r#"You are a legal document analyst performing single-document targeted extraction.

Document name: {name}
Document type: {kind}

Extraction strategy:
{strategy}

Target fields (use these exact keys):
{fields}

Document content:
{content}

Return ONLY valid JSON in this exact format:
{{
  "extracted_data": {{"field_key": "extracted value"}},
  "confidence_scores": {{"field_key": 0.95}}
}}

Extract only fields that actually appear in this document. Use higher
confidence for clear, unambiguous data. Do not guess. No other text."#,
        name = doc.name,
        kind = doc.kind.label(),
        strategy = strategy_for(doc.kind),
        fields = field_lines.join("\n"),
        content = doc.text,
    )
}

fn strategy_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::FinancialSchedule => {
            "Focus on monetary amounts, debts and assets: student loans, credit \
cards, bank accounts, property and vehicle values, and the total asset and \
debt figures. Capture dates incurred and account details where present."
        }
        DocumentKind::AttorneyLegal => {
            "Focus on attorney contact information: names, phone numbers, e-mail \
addresses, firm addresses. Also capture case numbers, court information, and \
the legal party names (petitioner/respondent)."
        }
        DocumentKind::CourtFiling => {
            "Focus on case identification: court names and counties, party names \
and their relationship, filing dates and case numbers."
        }
        DocumentKind::GeneralLegal => {
            "Extract any contact information, names, dates and locations, \
financial figures if present, and case or matter identifiers."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapper::FieldMap;

    fn doc(kind: DocumentKind) -> DocumentSource {
        DocumentSource {
            name: "fl142_filled.pdf".to_string(),
            path: "sources/fl142_filled.pdf".to_string(),
            text: "STUDENT LOANS: $22,000.00".to_string(),
            kind,
        }
    }

    #[test]
    fn test_prompt_embeds_field_table_and_content() {
        let map = FieldMap::fl142().unwrap();
        let prompt = build_extraction_prompt(&doc(DocumentKind::FinancialSchedule), &map);

        assert!(prompt.contains("- student_loans:"));
        assert!(prompt.contains("STUDENT LOANS: $22,000.00"));
        assert!(prompt.contains("\"extracted_data\""));
        assert!(prompt.contains("\"confidence_scores\""));
    }

    #[test]
    fn test_prompt_strategy_follows_document_kind() {
        let map = FieldMap::fl142().unwrap();

        let financial = build_extraction_prompt(&doc(DocumentKind::FinancialSchedule), &map);
        assert!(financial.contains("financial_schedule"));
        assert!(financial.contains("monetary amounts"));

        let attorney = build_extraction_prompt(&doc(DocumentKind::AttorneyLegal), &map);
        assert!(attorney.contains("attorney_legal"));
        assert!(attorney.contains("attorney contact information"));
    }
}
