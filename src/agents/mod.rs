//! Classifier, persona responders and the orchestrator that chains them

pub mod classifier;
pub mod orchestrator;
pub mod responder;

pub use classifier::{Category, Classifier};
pub use orchestrator::{Orchestrator, RouteResult};
pub use responder::{Persona, Responder};
