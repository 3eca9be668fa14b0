use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("PDF toolkit failed: {message}")]
    Toolkit { message: String },

    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("Field mapping failed: {message}")]
    Mapping { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, FillError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Config,
    Provider,
    Toolkit,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FillError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FillError::Http(_) => ErrorCategory::Network,
            FillError::Io(_) => ErrorCategory::Io,
            FillError::Serialization(_) => ErrorCategory::Data,
            FillError::ConfigValidation { .. }
            | FillError::InvalidConfigValue { .. }
            | FillError::MissingConfig { .. } => ErrorCategory::Config,
            FillError::Provider { .. } => ErrorCategory::Provider,
            FillError::Toolkit { .. } => ErrorCategory::Toolkit,
            FillError::Extraction { .. }
            | FillError::Mapping { .. }
            | FillError::Validation { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Provider failures are retryable and have a pattern fallback.
            FillError::Http(_) | FillError::Provider { .. } => ErrorSeverity::Medium,
            FillError::Serialization(_)
            | FillError::Extraction { .. }
            | FillError::Mapping { .. }
            | FillError::Validation { .. } => ErrorSeverity::High,
            FillError::Toolkit { .. } | FillError::Io(_) => ErrorSeverity::Critical,
            FillError::ConfigValidation { .. }
            | FillError::InvalidConfigValue { .. }
            | FillError::MissingConfig { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FillError::Http(_) => {
                "Check network connectivity and the provider endpoint, then retry".to_string()
            }
            FillError::Provider { provider, .. } => format!(
                "Verify the {} API key and model name, or rely on the pattern fallback",
                provider
            ),
            FillError::Toolkit { .. } => {
                "Ensure pdftk and pdftotext are installed and on PATH".to_string()
            }
            FillError::Io(_) => {
                "Check that input paths exist and output paths are writable".to_string()
            }
            FillError::ConfigValidation { field, .. }
            | FillError::InvalidConfigValue { field, .. }
            | FillError::MissingConfig { field } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            FillError::Extraction { .. } => {
                "Confirm the source documents contain readable text".to_string()
            }
            FillError::Mapping { .. } => {
                "Check the field mapping table against the target form's field dump".to_string()
            }
            FillError::Validation { .. } | FillError::Serialization(_) => {
                "Inspect the extracted values logged at debug level".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FillError::Http(_) => "Could not reach the extraction provider".to_string(),
            FillError::Provider { provider, .. } => {
                format!("The {} provider rejected the request", provider)
            }
            FillError::Toolkit { message } => format!("PDF toolkit error: {}", message),
            FillError::Io(e) => format!("File error: {}", e),
            FillError::ConfigValidation { .. }
            | FillError::InvalidConfigValue { .. }
            | FillError::MissingConfig { .. } => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }
}
