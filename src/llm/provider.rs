//! LLM provider abstraction and trait definitions
//!
//! This module defines the completion-endpoint contract the agents depend on:
//! a prompt goes in with a sampling temperature and a run correlation id, text
//! comes back or the call fails with an [`LlmError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Metadata key carrying the run correlation id of a completion call
pub const RUN_ID_KEY: &str = "run_id";

/// LLM completion request parameters
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Sent as the single user message
    pub prompt: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub metadata: HashMap<String, String>,
}

impl CompletionRequest {
    /// Build a single-prompt request tagged with a run correlation id
    pub fn prompt(
        model: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f32,
        run_id: Uuid,
    ) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(RUN_ID_KEY.to_string(), run_id.to_string());

        Self {
            prompt: prompt.into(),
            model: model.into(),
            temperature: Some(temperature),
            metadata,
        }
    }

    /// Run correlation id attached to this request, if any
    pub fn run_id(&self) -> Option<&str> {
        self.metadata.get(RUN_ID_KEY).map(String::as_str)
    }
}

/// LLM completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Reply text, with a missing content field read as empty
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Consume the response and return its text
    pub fn into_text(self) -> String {
        self.content.unwrap_or_default()
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason why completion finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

/// LLM provider trait for dependency injection and testing
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;

    /// Generate a completion from the given request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// LLM provider errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Server error: {0}")]
    ServerError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

impl LlmError {
    /// Whether a later attempt of the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::NetworkError(_) | LlmError::ServerError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_request_carries_run_id_and_temperature() {
        let run_id = Uuid::now_v7();
        let request = CompletionRequest::prompt("gpt-4o-mini", "Hello", 0.0, run_id);

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.run_id(), Some(run_id.to_string().as_str()));
    }

    #[test]
    fn test_response_text_defaults_to_empty() {
        let response = CompletionResponse {
            content: None,
            model: "gpt-4o-mini".to_string(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        };

        assert_eq!(response.text(), "");
        assert_eq!(response.into_text(), "");
    }

    #[test]
    fn test_llm_error_display() {
        let errors = vec![
            LlmError::NotConfigured("test".to_string()),
            LlmError::AuthenticationFailed("test".to_string()),
            LlmError::ModelNotFound("test".to_string()),
            LlmError::RateLimitExceeded("test".to_string()),
            LlmError::InvalidResponse("test".to_string()),
            LlmError::NetworkError("test".to_string()),
            LlmError::ServerError("test".to_string()),
            LlmError::ApiError("test".to_string()),
        ];

        for error in errors {
            let error_string = error.to_string();
            assert!(error_string.ends_with("test"));
        }
    }

    #[test]
    fn test_only_network_and_server_errors_are_transient() {
        assert!(LlmError::NetworkError("reset".to_string()).is_transient());
        assert!(LlmError::ServerError("502".to_string()).is_transient());
        assert!(!LlmError::ApiError("internal server error".to_string()).is_transient());
        assert!(!LlmError::RateLimitExceeded("slow".to_string()).is_transient());
        assert!(!LlmError::AuthenticationFailed("key".to_string()).is_transient());
    }
}
