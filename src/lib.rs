//! Multi-agent query router
//!
//! Routes a free-text question to one of two persona agents. A classifier
//! labels the query `hr` or `tech` with one completion call, the matching
//! responder answers it with a second, and every step is recorded as a span
//! in a configurable trace backend (log, LangSmith or Langfuse).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use multi_agent_router::agents::{Classifier, Orchestrator, Persona, Responder};
//! use multi_agent_router::llm::providers::{OpenAiConfig, OpenAiProvider};
//! use multi_agent_router::trace::{LogRecorder, Tracer};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(OpenAiProvider::new(OpenAiConfig {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     ..Default::default()
//! })?);
//!
//! let orchestrator = Orchestrator::new(
//!     Classifier::new(provider.clone(), "gpt-4o-mini"),
//!     Responder::new(Persona::Hr, provider.clone(), "gpt-4o-mini"),
//!     Responder::new(Persona::Tech, provider, "gpt-4o-mini"),
//!     Tracer::new(Arc::new(LogRecorder)),
//! );
//!
//! let result = orchestrator.orchestrate("How many vacation days do I get?").await?;
//! println!("{}: {}", result.route, result.answer);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod shell;
pub mod testing;
pub mod trace;

pub use agents::{Category, Classifier, Orchestrator, Persona, Responder, RouteResult};
pub use config::{AppConfig, ConfigError, TraceBackend};
pub use error::{RouterError, RouterResult};
pub use trace::{Tracer, TracingStyle};
