//! LangSmith run recorder
//!
//! Each span becomes a LangSmith run: created with `POST /runs` when it
//! starts and completed with `PATCH /runs/{id}` when it ends. Runs are linked
//! through `parent_run_id`, `trace_id` and `dotted_order`.

use crate::trace::recorder::{TraceError, TraceRecorder};
use crate::trace::span::SpanRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// LangSmith recorder configuration
#[derive(Debug, Clone)]
pub struct LangSmithConfig {
    pub api_key: String,
    pub endpoint: String,
    pub project: String,
    pub timeout: Duration,
}

impl Default for LangSmithConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.smith.langchain.com".to_string(),
            project: "default".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Records spans as LangSmith runs
pub struct LangSmithRecorder {
    config: LangSmithConfig,
    client: Client,
    /// Dotted order of runs still open, keyed by run id
    dotted_orders: Mutex<HashMap<Uuid, String>>,
}

impl LangSmithRecorder {
    pub fn new(config: LangSmithConfig) -> Result<Self, TraceError> {
        if config.api_key.is_empty() {
            return Err(TraceError::NotConfigured(
                "LangSmith API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            client,
            dotted_orders: Mutex::new(HashMap::new()),
        })
    }

    /// One segment of a dotted order: start time followed by the run id
    fn dotted_segment(start_time: &DateTime<Utc>, id: &Uuid) -> String {
        format!("{}{}", start_time.format("%Y%m%dT%H%M%S%6fZ"), id)
    }

    /// Compute and remember the dotted order of a newly started run
    fn register_dotted_order(&self, span: &SpanRecord) -> String {
        let mut orders = self
            .dotted_orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let segment = Self::dotted_segment(&span.start_time, &span.id);
        let dotted = match span.parent_id.and_then(|p| orders.get(&p)) {
            Some(parent) => format!("{parent}.{segment}"),
            None => segment,
        };
        orders.insert(span.id, dotted.clone());
        dotted
    }

    fn take_dotted_order(&self, span: &SpanRecord) -> Option<String> {
        self.dotted_orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&span.id)
    }

    /// Body for `POST /runs` (pure function)
    fn create_run_body(span: &SpanRecord, dotted_order: &str, project: &str) -> Value {
        json!({
            "id": span.id,
            "trace_id": span.trace_id,
            "parent_run_id": span.parent_id,
            "dotted_order": dotted_order,
            "name": span.name,
            "run_type": span.kind.as_str(),
            "inputs": span.input,
            "start_time": span.start_time,
            "session_name": project,
        })
    }

    /// Body for `PATCH /runs/{id}` (pure function)
    fn update_run_body(span: &SpanRecord, dotted_order: Option<&str>) -> Value {
        let mut body = json!({
            "trace_id": span.trace_id,
            "parent_run_id": span.parent_id,
            "outputs": span.output.clone().unwrap_or_else(|| json!({})),
            "end_time": span.end_time,
        });
        if let Some(error) = &span.error {
            body["error"] = json!(error);
        }
        if let Some(dotted) = dotted_order {
            body["dotted_order"] = json!(dotted);
        }
        body
    }

    async fn send(&self, request: RequestBuilder) -> Result<(), TraceError> {
        let response = request
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TraceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TraceRecorder for LangSmithRecorder {
    fn name(&self) -> &str {
        "langsmith"
    }

    async fn start_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        let dotted = self.register_dotted_order(span);
        let body = Self::create_run_body(span, &dotted, &self.config.project);
        debug!(run_id = %span.id, name = %span.name, "Creating LangSmith run");

        self.send(
            self.client
                .post(format!("{}/runs", self.config.endpoint))
                .json(&body),
        )
        .await
    }

    async fn end_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        let dotted = self.take_dotted_order(span);
        let body = Self::update_run_body(span, dotted.as_deref());
        debug!(run_id = %span.id, name = %span.name, "Completing LangSmith run");

        self.send(
            self.client
                .patch(format!("{}/runs/{}", self.config.endpoint, span.id))
                .json(&body),
        )
        .await
    }
}
