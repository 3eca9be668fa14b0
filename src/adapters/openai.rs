use crate::config::ProviderConfig;
use crate::domain::ports::LlmProvider;
use crate::utils::error::{FillError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f64 = 0.1;

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &ProviderConfig, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout,
        }
    }

    /// Build a client only when the API key is present in the environment.
    pub fn from_env(config: &ProviderConfig, timeout: Duration) -> Option<Self> {
        std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|key| Self::new(key, config, timeout))
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a precise JSON-only responder. Always return valid JSON, no other text."
                },
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FillError::Provider {
                provider: "openai".to_string(),
                message: format!("API request failed with status: {}", response.status()),
            });
        }

        let json: serde_json::Value = response.json().await?;
        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| FillError::Provider {
                provider: "openai".to_string(),
                message: "response missing choices[0].message.content".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(base_url: String) -> ProviderConfig {
        ProviderConfig {
            model: "gpt-4o".to_string(),
            max_tokens: Some(500),
            temperature: None,
            base_url: Some(base_url),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_message_content() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer test-key")
                .json_body_partial(r#"{"model": "gpt-4o"}"#);
            then.status(200).json_body(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"extracted_data\": {}}"}}
                ]
            }));
        });

        let client = OpenAiClient::new(
            "test-key".to_string(),
            &test_config(server.url("")),
            Duration::from_secs(5),
        );

        let text = client.complete("extract").await.unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"extracted_data\": {}}");
    }

    #[tokio::test]
    async fn test_complete_surfaces_http_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429);
        });

        let client = OpenAiClient::new(
            "test-key".to_string(),
            &test_config(server.url("")),
            Duration::from_secs(5),
        );

        let err = client.complete("extract").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
