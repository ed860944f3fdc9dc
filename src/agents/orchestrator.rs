//! Query orchestration
//!
//! Classify once, answer once with the selected persona, return both. The
//! whole call is traced as a root span `orchestrator` with two children:
//! `route_query` and either `hr_agent` or `tech_agent`.
//!
//! Two tracing styles produce the same tree. [`TracingStyle::Decorator`] runs
//! every step inside [`Tracer::traced`]; [`TracingStyle::Explicit`] opens and
//! closes each span by hand.

use crate::agents::classifier::{Category, Classifier};
use crate::agents::responder::{Persona, Responder};
use crate::error::RouterResult;
use crate::trace::{SpanContext, SpanKind, Tracer, TracingStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, Instrument};

pub const ROOT_SPAN: &str = "orchestrator";
pub const CLASSIFY_SPAN: &str = "route_query";

/// Outcome of one orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub route: Category,
    pub answer: String,
}

impl RouteResult {
    /// Payload recorded as the root span output
    pub fn to_output(&self) -> Value {
        json!({ "route": self.route, "answer": self.answer })
    }
}

fn query_input(query: &str) -> Value {
    json!({ "query": query })
}

/// Routes a query to the HR or Tech responder
pub struct Orchestrator {
    classifier: Classifier,
    hr_agent: Responder,
    tech_agent: Responder,
    tracer: Tracer,
    style: TracingStyle,
}

impl Orchestrator {
    pub fn new(
        classifier: Classifier,
        hr_agent: Responder,
        tech_agent: Responder,
        tracer: Tracer,
    ) -> Self {
        Self {
            classifier,
            hr_agent,
            tech_agent,
            tracer,
            style: TracingStyle::Decorator,
        }
    }

    pub fn with_style(mut self, style: TracingStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> TracingStyle {
        self.style
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Responder answering a category; anything but HR goes to Tech
    pub fn responder(&self, category: Category) -> &Responder {
        match Persona::from(category) {
            Persona::Hr => &self.hr_agent,
            Persona::Tech => &self.tech_agent,
        }
    }

    /// Classify `query`, answer it with the matching responder and return both
    ///
    /// Exactly one classification call and one responder call are made. Any
    /// completion error aborts the orchestration; the responder is never
    /// called after a failed classification.
    pub async fn orchestrate(&self, query: &str) -> RouterResult<RouteResult> {
        let span = crate::orchestration_span!(style = ?self.style, backend = self.tracer.backend());

        async {
            let result = match self.style {
                TracingStyle::Decorator => self.orchestrate_decorated(query).await,
                TracingStyle::Explicit => self.orchestrate_explicit(query).await,
            };

            if let Ok(routed) = &result {
                info!(route = routed.route.as_str(), "Query routed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn orchestrate_decorated(&self, query: &str) -> RouterResult<RouteResult> {
        self.tracer
            .traced(
                ROOT_SPAN,
                SpanKind::Chain,
                query_input(query),
                None,
                |root| self.run_decorated_steps(query, root),
                RouteResult::to_output,
            )
            .await
    }

    async fn run_decorated_steps(&self, query: &str, root: SpanContext) -> RouterResult<RouteResult> {
        let route = self
            .tracer
            .traced(
                CLASSIFY_SPAN,
                SpanKind::Chain,
                query_input(query),
                Some(&root),
                |ctx| self.classifier.classify_with_run(query, ctx.span_id),
                |route| json!({ "route": route }),
            )
            .await?;

        let responder = self.responder(route);
        let answer = self
            .tracer
            .traced(
                responder.persona().agent_name(),
                SpanKind::Llm,
                query_input(query),
                Some(&root),
                |ctx| responder.respond_with_run(query, ctx.span_id),
                |answer| json!({ "answer": answer }),
            )
            .await?;

        Ok(RouteResult { route, answer })
    }

    async fn orchestrate_explicit(&self, query: &str) -> RouterResult<RouteResult> {
        let mut root = self
            .tracer
            .begin_span(ROOT_SPAN, SpanKind::Chain, query_input(query), None)
            .await;
        let root_ctx = root.context();

        let classify_span = self
            .tracer
            .begin_span(
                CLASSIFY_SPAN,
                SpanKind::Chain,
                query_input(query),
                Some(&root_ctx),
            )
            .await;
        let route = match self
            .classifier
            .classify_with_run(query, classify_span.id())
            .await
        {
            Ok(route) => {
                classify_span.end_with(json!({ "route": route })).await;
                route
            }
            Err(e) => {
                classify_span.fail(e.to_string()).await;
                root.fail(e.to_string()).await;
                return Err(e.into());
            }
        };

        let responder = self.responder(route);
        let agent_span = self
            .tracer
            .begin_span(
                responder.persona().agent_name(),
                SpanKind::Llm,
                query_input(query),
                Some(&root_ctx),
            )
            .await;
        let answer = match responder.respond_with_run(query, agent_span.id()).await {
            Ok(answer) => {
                agent_span.end_with(json!({ "answer": answer })).await;
                answer
            }
            Err(e) => {
                agent_span.fail(e.to_string()).await;
                root.fail(e.to_string()).await;
                return Err(e.into());
            }
        };

        let result = RouteResult { route, answer };
        root.set_output(result.to_output());
        root.end().await;
        Ok(result)
    }
}
