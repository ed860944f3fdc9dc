//! Trace recorder trait and the tracer that drives it
//!
//! [`Tracer`] is the only tracing interface the agents use. Spans are opened
//! with [`Tracer::begin_span`] and closed through the returned [`SpanHandle`];
//! [`Tracer::traced`] wraps an async step in a span and is built from the same
//! two calls.
//!
//! Recording is an observer: a recorder error is logged and dropped, it never
//! reaches the traced code.

use crate::trace::span::{SpanContext, SpanKind, SpanRecord};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Trace recorder errors
#[derive(Debug, Clone, Error)]
pub enum TraceError {
    #[error("Trace backend not configured: {0}")]
    NotConfigured(String),
    #[error("Trace transport error: {0}")]
    Transport(String),
    #[error("Trace backend rejected request: {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// Sink for span records
#[async_trait]
pub trait TraceRecorder: Send + Sync {
    /// Backend name (e.g., "langfuse", "log")
    fn name(&self) -> &str;

    /// A span was opened
    async fn start_span(&self, span: &SpanRecord) -> Result<(), TraceError>;

    /// A span was closed; `span` carries its output or error and end time
    async fn end_span(&self, span: &SpanRecord) -> Result<(), TraceError>;

    /// Deliver anything still buffered
    async fn flush(&self) -> Result<(), TraceError> {
        Ok(())
    }
}

/// Cheap, cloneable front end over a shared recorder
#[derive(Clone)]
pub struct Tracer {
    recorder: Arc<dyn TraceRecorder>,
}

impl Tracer {
    pub fn new(recorder: Arc<dyn TraceRecorder>) -> Self {
        Self { recorder }
    }

    /// Tracer that records nothing
    pub fn disabled() -> Self {
        Self::new(Arc::new(crate::trace::sinks::NoopRecorder))
    }

    /// Name of the backing recorder
    pub fn backend(&self) -> &str {
        self.recorder.name()
    }

    /// Open a span; without a parent the span becomes the root of a new trace
    pub async fn begin_span(
        &self,
        name: impl Into<String>,
        kind: SpanKind,
        input: Value,
        parent: Option<&SpanContext>,
    ) -> SpanHandle {
        let record = SpanRecord::start(name, kind, input, parent);

        if let Err(e) = self.recorder.start_span(&record).await {
            warn!(
                backend = self.recorder.name(),
                span = %record.name,
                error = %e,
                "Failed to record span start"
            );
        }

        SpanHandle {
            tracer: self.clone(),
            record,
        }
    }

    /// Run `body` inside a span
    ///
    /// The span receives `to_output` of the success value, or the error text
    /// on failure. The body's result is returned as is.
    pub async fn traced<T, E, F, Fut, O>(
        &self,
        name: &str,
        kind: SpanKind,
        input: Value,
        parent: Option<&SpanContext>,
        body: F,
        to_output: O,
    ) -> Result<T, E>
    where
        F: FnOnce(SpanContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        O: FnOnce(&T) -> Value,
    {
        let span = self.begin_span(name, kind, input, parent).await;

        match body(span.context()).await {
            Ok(value) => {
                span.end_with(to_output(&value)).await;
                Ok(value)
            }
            Err(e) => {
                span.fail(e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Flush the recorder, logging instead of failing
    pub async fn flush(&self) {
        if let Err(e) = self.recorder.flush().await {
            warn!(backend = self.recorder.name(), error = %e, "Failed to flush traces");
        }
    }

    async fn finish(&self, record: SpanRecord) {
        if let Err(e) = self.recorder.end_span(&record).await {
            warn!(
                backend = self.recorder.name(),
                span = %record.name,
                error = %e,
                "Failed to record span end"
            );
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("backend", &self.recorder.name())
            .finish()
    }
}

/// An open span
///
/// Dropping a handle without ending it leaves the span open in the backend.
#[derive(Debug)]
pub struct SpanHandle {
    tracer: Tracer,
    record: SpanRecord,
}

impl SpanHandle {
    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn context(&self) -> SpanContext {
        self.record.context()
    }

    /// Record the output reported when the span ends
    pub fn set_output(&mut self, output: Value) {
        self.record.output = Some(output);
    }

    /// Close the span with whatever output has been set
    pub async fn end(self) {
        let SpanHandle { tracer, mut record } = self;
        record.end_time = Some(Utc::now());
        tracer.finish(record).await;
    }

    /// Close the span with `output`
    pub async fn end_with(mut self, output: Value) {
        self.set_output(output);
        self.end().await;
    }

    /// Close the span as failed
    pub async fn fail(mut self, error: impl Into<String>) {
        self.record.error = Some(error.into());
        self.end().await;
    }
}
