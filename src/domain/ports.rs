use crate::domain::model::{ExtractionOutcome, FormField, FormPayload};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Outbound LLM call. Implementations wrap one HTTP API; they take a prompt
/// and return the raw completion text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// The external PDF toolkit (pdftk/pdftotext subprocesses in production).
#[async_trait]
pub trait FormToolkit: Send + Sync {
    async fn dump_fields(&self, form_path: &str) -> Result<Vec<FormField>>;
    async fn dump_text(&self, pdf_path: &str) -> Result<String>;
    async fn fill_form(
        &self,
        form_path: &str,
        payload: &FormPayload,
        output_path: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ExtractionOutcome>>;
    async fn transform(&self, outcomes: Vec<ExtractionOutcome>) -> Result<FormPayload>;
    async fn load(&self, payload: FormPayload) -> Result<String>;
}
