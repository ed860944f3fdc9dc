//! Langfuse ingestion recorder
//!
//! Span events are buffered and sent to `POST /api/public/ingestion` as one
//! batch when the root span of a trace ends, or on [`TraceRecorder::flush`].
//! `chain` spans map to Langfuse spans and `llm` spans to generations; the
//! root span also creates the trace and, when it ends, sets the trace output.

use crate::trace::recorder::{TraceError, TraceRecorder};
use crate::trace::span::{SpanKind, SpanRecord};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Langfuse recorder configuration
#[derive(Debug, Clone)]
pub struct LangfuseConfig {
    pub public_key: String,
    pub secret_key: String,
    pub host: String,
    pub timeout: Duration,
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            secret_key: String::new(),
            host: "https://cloud.langfuse.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Records spans through the Langfuse ingestion API
pub struct LangfuseRecorder {
    config: LangfuseConfig,
    client: Client,
    pending: Mutex<Vec<Value>>,
}

impl LangfuseRecorder {
    pub fn new(config: LangfuseConfig) -> Result<Self, TraceError> {
        if config.public_key.is_empty() || config.secret_key.is_empty() {
            return Err(TraceError::NotConfigured(
                "Langfuse public and secret keys are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            client,
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Wrap an event body in an ingestion envelope (pure function)
    fn event(event_type: &str, body: Value) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "timestamp": Utc::now(),
            "type": event_type,
            "body": body,
        })
    }

    fn observation_prefix(kind: SpanKind) -> &'static str {
        match kind {
            SpanKind::Chain => "span",
            SpanKind::Llm => "generation",
        }
    }

    /// Events emitted when a span starts (pure function)
    fn start_events(span: &SpanRecord) -> Vec<Value> {
        let mut events = Vec::with_capacity(2);

        if span.is_root() {
            events.push(Self::event(
                "trace-create",
                json!({
                    "id": span.trace_id,
                    "name": span.name,
                    "timestamp": span.start_time,
                    "input": span.input,
                }),
            ));
        }

        events.push(Self::event(
            &format!("{}-create", Self::observation_prefix(span.kind)),
            json!({
                "id": span.id,
                "traceId": span.trace_id,
                "parentObservationId": span.parent_id,
                "name": span.name,
                "startTime": span.start_time,
                "input": span.input,
            }),
        ));

        events
    }

    /// Events emitted when a span ends (pure function)
    fn end_events(span: &SpanRecord) -> Vec<Value> {
        let mut body = json!({
            "id": span.id,
            "traceId": span.trace_id,
            "endTime": span.end_time,
            "output": span.output,
        });
        if let Some(error) = &span.error {
            body["level"] = json!("ERROR");
            body["statusMessage"] = json!(error);
        }

        let mut events = vec![Self::event(
            &format!("{}-update", Self::observation_prefix(span.kind)),
            body,
        )];

        if span.is_root() {
            events.push(Self::event(
                "trace-create",
                json!({
                    "id": span.trace_id,
                    "output": span.output,
                }),
            ));
        }

        events
    }

    async fn send_batch(&self, batch: Vec<Value>) -> Result<(), TraceError> {
        debug!(events = batch.len(), "Sending Langfuse ingestion batch");

        let response = self
            .client
            .post(format!("{}/api/public/ingestion", self.config.host))
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .json(&json!({ "batch": batch }))
            .send()
            .await
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(TraceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // 207 responses list per-event failures
        if let Ok(parsed) = serde_json::from_str::<Value>(&body) {
            let errors = parsed["errors"].as_array().map(Vec::len).unwrap_or(0);
            if errors > 0 {
                warn!(errors, "Langfuse rejected some ingestion events");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TraceRecorder for LangfuseRecorder {
    fn name(&self) -> &str {
        "langfuse"
    }

    async fn start_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        self.pending.lock().await.extend(Self::start_events(span));
        Ok(())
    }

    async fn end_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        self.pending.lock().await.extend(Self::end_events(span));

        if span.is_root() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), TraceError> {
        let batch = std::mem::take(&mut *self.pending.lock().await);
        if batch.is_empty() {
            return Ok(());
        }
        self.send_batch(batch).await
    }
}
