//! Span records exchanged between the tracer and its recorders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// What kind of step a span covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// A composite step that calls other steps
    Chain,
    /// A single completion-endpoint call
    Llm,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Chain => "chain",
            SpanKind::Llm => "llm",
        }
    }
}

/// Identifiers needed to attach a child span to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: Uuid,
    pub span_id: Uuid,
}

/// One traced step
///
/// Recorders receive the record twice: once when the span starts (no output,
/// no end time) and once when it ends. The finished record is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub id: Uuid,
    pub trace_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub kind: SpanKind,
    pub input: Value,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SpanRecord {
    /// Open a new record; a span without a parent starts its own trace
    pub fn start(
        name: impl Into<String>,
        kind: SpanKind,
        input: Value,
        parent: Option<&SpanContext>,
    ) -> Self {
        let id = Uuid::now_v7();
        let (trace_id, parent_id) = match parent {
            Some(ctx) => (ctx.trace_id, Some(ctx.span_id)),
            None => (id, None),
        };

        Self {
            id,
            trace_id,
            parent_id,
            name: name.into(),
            kind,
            input,
            output: None,
            error: None,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn context(&self) -> SpanContext {
        SpanContext {
            trace_id: self.trace_id,
            span_id: self.id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Wall time between start and end, zero while the span is open
    pub fn duration_ms(&self) -> i64 {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_span_starts_its_own_trace() {
        let root = SpanRecord::start("orchestrator", SpanKind::Chain, json!({}), None);

        assert!(root.is_root());
        assert_eq!(root.trace_id, root.id);
        assert!(!root.is_finished());
        assert_eq!(root.duration_ms(), 0);
    }

    #[test]
    fn test_child_span_inherits_trace() {
        let root = SpanRecord::start("orchestrator", SpanKind::Chain, json!({}), None);
        let child = SpanRecord::start("hr_agent", SpanKind::Llm, json!({}), Some(&root.context()));

        assert_eq!(child.trace_id, root.trace_id);
        assert_eq!(child.parent_id, Some(root.id));
        assert_ne!(child.id, root.id);
    }

    #[test]
    fn test_span_kind_serialization() {
        assert_eq!(serde_json::to_string(&SpanKind::Chain).unwrap(), "\"chain\"");
        assert_eq!(serde_json::to_string(&SpanKind::Llm).unwrap(), "\"llm\"");
        assert_eq!(SpanKind::Llm.as_str(), "llm");
    }
}
