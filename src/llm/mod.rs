//! Completion-endpoint abstraction
//!
//! The agents only see [`LlmProvider`]; concrete HTTP clients live in
//! [`providers`].

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;
