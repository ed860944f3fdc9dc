//! Error types for query routing

use crate::config::ConfigError;
use crate::llm::provider::LlmError;
use crate::trace::TraceError;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Main error type for routing operations
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("Trace backend error: {0}")]
    Trace(#[from] TraceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RouterError {
    /// Create internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Error text safe to print or log: secrets redacted, length bounded
    pub fn sanitized(&self) -> String {
        sanitize_error_message(&self.to_string())
    }
}

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("valid secret pattern")
});

static API_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(sk|pk|lsv2)-[A-Za-z0-9_*-]{6,}").expect("valid api key pattern")
});

/// Sanitize error messages so API keys echoed back by providers are not printed
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PATTERN
        .replace_all(message, "${1}=***")
        .to_string();

    sanitized = API_KEY_PATTERN
        .replace_all(&sanitized, "${1}-***")
        .to_string();

    // Truncate very long messages - ensure total length is <= 500
    if sanitized.len() > 500 {
        let truncate_suffix = "...[truncated]";
        let mut cut = 500 - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Result type for routing operations
pub type RouterResult<T> = Result<T, RouterError>;
