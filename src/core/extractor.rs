use crate::core::mapper::FieldMap;
use crate::core::patterns::pattern_extract;
use crate::core::prompt::build_extraction_prompt;
use crate::domain::model::{DocumentSource, ExtractionMethod, ExtractionOutcome};
use crate::domain::ports::LlmProvider;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    pub max_workers: usize,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub fallback_enabled: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            max_workers: 3,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(2),
            fallback_enabled: true,
        }
    }
}

/// Fans source documents out to the provider chain, at most `max_workers`
/// in flight at once. Each document is independent: a provider or parse
/// failure degrades that one document to the pattern fallback (or an empty
/// outcome) without touching the others.
pub struct DocumentExtractor {
    providers: Vec<Arc<dyn LlmProvider>>,
    map: Arc<FieldMap>,
    options: ExtractorOptions,
}

impl DocumentExtractor {
    pub fn new(
        providers: Vec<Arc<dyn LlmProvider>>,
        map: FieldMap,
        options: ExtractorOptions,
    ) -> Self {
        Self {
            providers,
            map: Arc::new(map),
            options,
        }
    }

    pub async fn extract_all(
        &self,
        documents: Vec<DocumentSource>,
    ) -> Result<Vec<ExtractionOutcome>> {
        tracing::info!(
            "📡 Extracting {} documents with {} workers",
            documents.len(),
            self.options.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.options.max_workers.max(1)));
        let mut join_set = JoinSet::new();

        for doc in documents {
            let semaphore = semaphore.clone();
            let providers = self.providers.clone();
            let map = self.map.clone();
            let options = self.options.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                extract_document(doc, &providers, &map, &options).await
            });
        }

        // Outcomes arrive in completion order, not submission order.
        let mut outcomes = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    tracing::info!(
                        "📥 {}: {} fields via {} in {:?}",
                        outcome.document_name,
                        outcome.values.len(),
                        outcome.method.label(),
                        outcome.elapsed
                    );
                    outcomes.push(outcome);
                }
                Err(e) => tracing::error!("❌ Extraction task panicked: {}", e),
            }
        }

        Ok(outcomes)
    }
}

async fn extract_document(
    doc: DocumentSource,
    providers: &[Arc<dyn LlmProvider>],
    map: &FieldMap,
    options: &ExtractorOptions,
) -> ExtractionOutcome {
    let started = Instant::now();
    let prompt = build_extraction_prompt(&doc, map);
    let attempts = options.retry_attempts.max(1);

    for provider in providers {
        let mut response = None;
        for attempt in 1..=attempts {
            match provider.complete(&prompt).await {
                Ok(text) => {
                    response = Some(text);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "📡 {}: {} attempt {}/{} failed: {}",
                        doc.name,
                        provider.name(),
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(options.retry_delay * attempt).await;
                    }
                }
            }
        }

        if let Some(text) = response {
            match parse_provider_response(&text) {
                Some((values, confidence)) => {
                    return ExtractionOutcome {
                        document_name: doc.name,
                        values,
                        confidence,
                        elapsed: started.elapsed(),
                        method: ExtractionMethod::Provider(provider.name().to_string()),
                    };
                }
                // Unparseable body: move on to the next provider rather
                // than burning its retry budget.
                None => tracing::warn!(
                    "📡 {}: {} returned an unparseable response",
                    doc.name,
                    provider.name()
                ),
            }
        }
    }

    if options.fallback_enabled {
        tracing::warn!("🔍 {}: falling back to pattern extraction", doc.name);
        let (values, confidence) = pattern_extract(&doc.text, map);
        if !values.is_empty() {
            return ExtractionOutcome {
                document_name: doc.name,
                values,
                confidence,
                elapsed: started.elapsed(),
                method: ExtractionMethod::Patterns,
            };
        }
    }

    tracing::error!("❌ {}: no extraction method produced data", doc.name);
    ExtractionOutcome::failed(doc.name, started.elapsed())
}

/// Pull the `extracted_data` / `confidence_scores` objects out of a provider
/// response. The JSON body is located between the first `{` and the last `}`
/// so prose around the JSON does not break parsing. Keys are normalized to
/// lowercase snake_case; values without a reported confidence default
/// to 0.8.
pub fn parse_provider_response(
    text: &str,
) -> Option<(HashMap<String, String>, HashMap<String, f64>)> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;
    let data = value.get("extracted_data")?.as_object()?;

    let mut values = HashMap::new();
    for (key, entry) in data {
        let rendered = match entry {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        if rendered.trim().is_empty() {
            continue;
        }
        values.insert(normalize_key(key), rendered);
    }

    let mut confidence = HashMap::new();
    if let Some(scores) = value.get("confidence_scores").and_then(|v| v.as_object()) {
        for (key, score) in scores {
            if let Some(f) = score.as_f64() {
                confidence.insert(normalize_key(key), f.clamp(0.0, 1.0));
            }
        }
    }
    for key in values.keys() {
        confidence.entry(key.clone()).or_insert(0.8);
    }

    Some((values, confidence))
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}
