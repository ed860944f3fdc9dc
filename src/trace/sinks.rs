//! Local trace recorders: no-op, structured log and in-memory

use crate::trace::recorder::{TraceError, TraceRecorder};
use crate::trace::span::SpanRecord;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Discards every span
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

#[async_trait]
impl TraceRecorder for NoopRecorder {
    fn name(&self) -> &str {
        "none"
    }

    async fn start_span(&self, _span: &SpanRecord) -> Result<(), TraceError> {
        Ok(())
    }

    async fn end_span(&self, _span: &SpanRecord) -> Result<(), TraceError> {
        Ok(())
    }
}

/// Emits finished spans as structured log events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

#[async_trait]
impl TraceRecorder for LogRecorder {
    fn name(&self) -> &str {
        "log"
    }

    async fn start_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        debug!(
            span_id = %span.id,
            trace_id = %span.trace_id,
            name = %span.name,
            kind = span.kind.as_str(),
            "span started"
        );
        Ok(())
    }

    async fn end_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        let output = span
            .output
            .as_ref()
            .map(|o| o.to_string())
            .unwrap_or_default();
        let parent_id = span.parent_id.map(|p| p.to_string()).unwrap_or_default();

        match &span.error {
            Some(error) => warn!(
                span_id = %span.id,
                trace_id = %span.trace_id,
                parent_id = %parent_id,
                name = %span.name,
                kind = span.kind.as_str(),
                duration_ms = span.duration_ms(),
                input = %span.input,
                error = %error,
                "span failed"
            ),
            None => info!(
                span_id = %span.id,
                trace_id = %span.trace_id,
                parent_id = %parent_id,
                name = %span.name,
                kind = span.kind.as_str(),
                duration_ms = span.duration_ms(),
                input = %span.input,
                output = %output,
                "span finished"
            ),
        }
        Ok(())
    }
}

/// Keeps spans in memory for inspection
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    started: Mutex<Vec<Uuid>>,
    finished: Mutex<Vec<SpanRecord>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of started spans, in start order
    pub async fn started(&self) -> Vec<Uuid> {
        self.started.lock().await.clone()
    }

    /// Finished spans, in end order
    pub async fn finished(&self) -> Vec<SpanRecord> {
        self.finished.lock().await.clone()
    }

    /// First finished span with the given name
    pub async fn find(&self, name: &str) -> Option<SpanRecord> {
        self.finished
            .lock()
            .await
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    pub async fn clear(&self) {
        self.started.lock().await.clear();
        self.finished.lock().await.clear();
    }
}

#[async_trait]
impl TraceRecorder for MemoryRecorder {
    fn name(&self) -> &str {
        "memory"
    }

    async fn start_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        self.started.lock().await.push(span.id);
        Ok(())
    }

    async fn end_span(&self, span: &SpanRecord) -> Result<(), TraceError> {
        self.finished.lock().await.push(span.clone());
        Ok(())
    }
}
