use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Semantic type of a source document, decided by keyword heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    FinancialSchedule,
    AttorneyLegal,
    CourtFiling,
    GeneralLegal,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::FinancialSchedule => "financial_schedule",
            DocumentKind::AttorneyLegal => "attorney_legal",
            DocumentKind::CourtFiling => "court_filing",
            DocumentKind::GeneralLegal => "general_legal",
        }
    }
}

/// A source document after loading: raw text plus its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    pub name: String,
    pub path: String,
    pub text: String,
    pub kind: DocumentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    Provider(String),
    Patterns,
    Failed,
}

impl ExtractionMethod {
    pub fn label(&self) -> String {
        match self {
            ExtractionMethod::Provider(name) => name.clone(),
            ExtractionMethod::Patterns => "patterns".to_string(),
            ExtractionMethod::Failed => "failed".to_string(),
        }
    }
}

/// Per-document extraction result: canonical field keys to values, with the
/// confidence the extractor reported for each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub document_name: String,
    pub values: HashMap<String, String>,
    pub confidence: HashMap<String, f64>,
    pub elapsed: Duration,
    pub method: ExtractionMethod,
}

impl ExtractionOutcome {
    pub fn failed(document_name: String, elapsed: Duration) -> Self {
        Self {
            document_name,
            values: HashMap::new(),
            confidence: HashMap::new(),
            elapsed,
            method: ExtractionMethod::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub name: String,
    pub fields_extracted: usize,
    pub elapsed: Duration,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub documents_processed: usize,
    pub successful_documents: usize,
    pub total_processing_time: Duration,
    pub document_reports: Vec<DocumentReport>,
}

/// Merged view across all documents. `sources` records which document won
/// each field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedExtraction {
    pub values: HashMap<String, String>,
    pub confidence: HashMap<String, f64>,
    pub sources: HashMap<String, String>,
    pub summary: ProcessingSummary,
}

/// A fillable field as dumped from the target PDF by the toolkit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub alt_text: String,
    pub kind: String,
    pub state_options: Vec<String>,
}

/// Validated literal-field → value map, ready to be written into the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormPayload {
    pub fields: HashMap<String, String>,
    pub confidence: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    Extraction,
    Transform,
    FormFilling,
}

impl ProcessingStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingStage::Extraction => "extraction",
            ProcessingStage::Transform => "transform",
            ProcessingStage::FormFilling => "form_filling",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: ProcessingStage,
    pub field_count: usize,
    pub elapsed: Duration,
}
