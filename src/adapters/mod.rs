// Adapters layer: concrete implementations for external systems (storage,
// provider HTTP APIs, the PDF toolkit subprocesses).

pub mod anthropic;
pub mod openai;
pub mod pdftk;
pub mod storage;
