use crate::domain::model::DocumentKind;

/// Classify a source document from its filename and content. First match
/// wins; financial indicators are checked before attorney/court ones because
/// a filled FL-142 also carries the court caption block.
pub fn classify(name: &str, text: &str) -> DocumentKind {
    let name_lower = name.to_lowercase();
    let content_lower = text.to_lowercase();

    if name_lower.contains("fl-142")
        || name_lower.contains("fl142")
        || content_lower.contains("schedule of assets")
        || content_lower.contains("student loans")
        || content_lower.contains("credit cards")
    {
        DocumentKind::FinancialSchedule
    } else if name_lower.contains("fl-120")
        || name_lower.contains("fl120")
        || content_lower.contains("attorney or party without attorney")
        || content_lower.contains("telephone no")
    {
        DocumentKind::AttorneyLegal
    } else if content_lower.contains("superior court")
        || content_lower.contains("case number")
        || content_lower.contains("petitioner")
    {
        DocumentKind::CourtFiling
    } else {
        DocumentKind::GeneralLegal
    }
}
