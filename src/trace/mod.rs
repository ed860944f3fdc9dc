//! Trace recording
//!
//! One explicit span interface ([`Tracer::begin_span`] / [`SpanHandle::end`])
//! with a decorator-style wrapper ([`Tracer::traced`]) on top, and the
//! recorders spans can be sent to.

pub mod langfuse;
pub mod langsmith;
pub mod recorder;
pub mod sinks;
pub mod span;

pub use langfuse::{LangfuseConfig, LangfuseRecorder};
pub use langsmith::{LangSmithConfig, LangSmithRecorder};
pub use recorder::{SpanHandle, TraceError, TraceRecorder, Tracer};
pub use sinks::{LogRecorder, MemoryRecorder, NoopRecorder};
pub use span::{SpanContext, SpanKind, SpanRecord};

use serde::{Deserialize, Serialize};

/// How the orchestrator drives the tracer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingStyle {
    /// Each step runs inside [`Tracer::traced`]
    Decorator,
    /// Spans are opened, annotated and closed by hand
    Explicit,
}
