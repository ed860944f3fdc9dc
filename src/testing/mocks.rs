//! Mock implementations for testing
//!
//! A scripted [`LlmProvider`] that records every request, and a
//! [`TraceRecorder`] that rejects everything.

use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
};
use crate::trace::{SpanRecord, TraceError, TraceRecorder};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock LLM provider for testing
///
/// Replies cycle through `responses` in order ("Mock response" when empty).
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Fail every call
    pub should_fail: bool,
    /// Fail only the call with this zero-based index
    pub fail_on_call: Option<usize>,
    pub error: LlmError,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            current_response: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
            fail_on_call: None,
            error: LlmError::NetworkError("Mock LLM failure".to_string()),
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new(vec![])
        }
    }

    /// Fail every call with `error`
    pub fn with_error(error: LlmError) -> Self {
        Self {
            should_fail: true,
            error,
            ..Self::new(vec![])
        }
    }

    /// Answer from `responses` but fail call number `index` (zero-based)
    pub fn failing_on_call(index: usize, responses: Vec<String>) -> Self {
        Self {
            fail_on_call: Some(index),
            ..Self::new(responses)
        }
    }

    /// Requests received so far, in call order
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let call_index = {
            let mut requests = self.requests.lock().await;
            requests.push(request);
            requests.len() - 1
        };

        if self.should_fail || self.fail_on_call == Some(call_index) {
            return Err(self.error.clone());
        }

        let mut current = self.current_response.lock().await;
        let response_idx = *current % self.responses.len().max(1);
        *current += 1;

        let content = if self.responses.is_empty() {
            "Mock response".to_string()
        } else {
            self.responses[response_idx].clone()
        };

        Ok(CompletionResponse {
            content: Some(content),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
        })
    }
}

/// Recorder whose every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRecorder;

#[async_trait]
impl TraceRecorder for FailingRecorder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn start_span(&self, _span: &SpanRecord) -> Result<(), TraceError> {
        Err(TraceError::Transport("Mock recorder failure".to_string()))
    }

    async fn end_span(&self, _span: &SpanRecord) -> Result<(), TraceError> {
        Err(TraceError::Transport("Mock recorder failure".to_string()))
    }

    async fn flush(&self) -> Result<(), TraceError> {
        Err(TraceError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}
