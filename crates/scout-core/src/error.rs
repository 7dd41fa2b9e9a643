use std::fmt;

use thiserror::Error;

/// Application-wide error types for Scout.
#[derive(Error, Debug)]
pub enum AppError {
    /// A source needs a credential that is not configured.
    #[error("Credential missing for {0}")]
    CredentialMissing(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx response from a scrape target or API.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Response did not have the structure the adapter expects.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The source answered successfully but with zero records.
    #[error("Source returned no results")]
    EmptyResult,

    /// LLM API call failed.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError { message: String, status_code: u16 },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The four ways a tier can fail, as recorded in tier-transition logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CredentialMissing,
    NetworkError,
    ParseError,
    EmptyResult,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CredentialMissing => "credential-absent",
            FailureKind::NetworkError => "network-error",
            FailureKind::ParseError => "parse-error",
            FailureKind::EmptyResult => "empty-result",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Classify this error for fallthrough logging.
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::CredentialMissing(_) | AppError::ConfigError(_) => {
                FailureKind::CredentialMissing
            }
            AppError::Timeout(_)
            | AppError::RateLimitExceeded
            | AppError::NetworkError(_)
            | AppError::HttpError { .. }
            | AppError::LlmError { .. } => FailureKind::NetworkError,
            AppError::ParseError(_) | AppError::SerializationError(_) => FailureKind::ParseError,
            AppError::EmptyResult => FailureKind::EmptyResult,
        }
    }
}
