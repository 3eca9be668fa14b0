#[cfg(feature = "cli")]
pub mod cli;

use crate::core::extractor::ExtractorOptions;
use crate::utils::error::{FillError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub anthropic: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub max_workers: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub confidence_threshold: Option<f64>,
    pub fallback_enabled: Option<bool>,
    pub field_coverage_target: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolkitConfig {
    pub pdftk_bin: Option<String>,
    pub pdftotext_bin: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Path to a field map JSON; the built-in FL-142 table when unset.
    pub field_map: Option<String>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FillError::Io)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        serde_yaml::from_str(&processed).map_err(|e| FillError::ConfigValidation {
            field: "yaml_parsing".to_string(),
            message: format!("YAML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` with the environment value; unknown variables
    /// are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(anthropic) = &self.providers.anthropic {
            validate_non_empty_string("providers.anthropic.model", &anthropic.model)?;
            if let Some(base_url) = &anthropic.base_url {
                validate_url("providers.anthropic.base_url", base_url)?;
            }
        }
        if let Some(openai) = &self.providers.openai {
            validate_non_empty_string("providers.openai.model", &openai.model)?;
            if let Some(base_url) = &openai.base_url {
                validate_url("providers.openai.base_url", base_url)?;
            }
        }

        if let Some(field_map) = &self.mapping.field_map {
            validate_path("mapping.field_map", field_map)?;
        }

        // Three workers is the documented ceiling for outbound provider
        // calls; anything above it just trips API rate limits.
        validate_range("processing.max_workers", self.max_workers(), 1, 3)?;
        validate_range("processing.timeout_seconds", self.timeout().as_secs(), 1, 600)?;
        validate_range("processing.retry_attempts", self.retry_attempts(), 1, 10)?;
        validate_range(
            "processing.confidence_threshold",
            self.confidence_threshold(),
            0.0,
            1.0,
        )?;
        validate_range(
            "processing.field_coverage_target",
            self.field_coverage_target(),
            0.0,
            1.0,
        )?;

        Ok(())
    }

    pub fn max_workers(&self) -> usize {
        self.processing.max_workers.unwrap_or(3)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.processing.timeout_seconds.unwrap_or(30))
    }

    pub fn retry_attempts(&self) -> u32 {
        self.processing.retry_attempts.unwrap_or(3)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.processing.retry_delay_seconds.unwrap_or(2))
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.processing.confidence_threshold.unwrap_or(0.8)
    }

    pub fn fallback_enabled(&self) -> bool {
        self.processing.fallback_enabled.unwrap_or(true)
    }

    pub fn field_coverage_target(&self) -> f64 {
        self.processing.field_coverage_target.unwrap_or(0.95)
    }

    pub fn pdftk_bin(&self) -> String {
        self.toolkit
            .pdftk_bin
            .clone()
            .unwrap_or_else(|| "pdftk".to_string())
    }

    pub fn pdftotext_bin(&self) -> String {
        self.toolkit
            .pdftotext_bin
            .clone()
            .unwrap_or_else(|| "pdftotext".to_string())
    }

    pub fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            max_workers: self.max_workers(),
            retry_attempts: self.retry_attempts(),
            retry_delay: self.retry_delay(),
            fallback_enabled: self.fallback_enabled(),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
