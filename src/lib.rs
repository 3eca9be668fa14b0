pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::anthropic::AnthropicClient;
pub use crate::adapters::openai::OpenAiClient;
pub use crate::adapters::pdftk::PdftkToolkit;
pub use crate::adapters::storage::LocalStorage;
pub use crate::config::AppConfig;
pub use crate::core::engine::{FillEngine, RunReport};
pub use crate::core::extractor::{DocumentExtractor, ExtractorOptions};
pub use crate::core::mapper::{FieldMap, FieldMapper};
pub use crate::core::pipeline::{FillJob, FormFillPipeline};
pub use crate::utils::error::{FillError, Result};
