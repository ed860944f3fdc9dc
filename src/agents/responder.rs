//! Persona responders

use crate::agents::classifier::Category;
use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Framing used by a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Hr,
    Tech,
}

impl Persona {
    /// Instruction placed before the query
    pub fn prompt_prefix(&self) -> &'static str {
        match self {
            Persona::Hr => "[HR Agent] Answer the following HR-related query clearly and formally:",
            Persona::Tech => "[Tech Agent] Answer the following technical query:",
        }
    }

    /// Step name used when tracing this persona
    pub fn agent_name(&self) -> &'static str {
        match self {
            Persona::Hr => "hr_agent",
            Persona::Tech => "tech_agent",
        }
    }

    pub fn prompt(&self, query: &str) -> String {
        format!("{}\n{}", self.prompt_prefix(), query)
    }
}

impl From<Category> for Persona {
    fn from(category: Category) -> Self {
        match category {
            Category::Hr => Persona::Hr,
            Category::Tech => Persona::Tech,
        }
    }
}

/// Answers queries in one persona
pub struct Responder {
    persona: Persona,
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl Responder {
    pub fn new(persona: Persona, provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            persona,
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Answer a query under a fresh run id
    pub async fn respond(&self, query: &str) -> Result<String, LlmError> {
        self.respond_with_run(query, Uuid::now_v7()).await
    }

    /// Answer a query, tagging the completion call with `run_id`
    ///
    /// The reply text is returned unmodified.
    pub async fn respond_with_run(&self, query: &str, run_id: Uuid) -> Result<String, LlmError> {
        let request = CompletionRequest::prompt(
            &self.model,
            self.persona.prompt(query),
            self.temperature,
            run_id,
        );

        let response = self.provider.complete(request).await?;
        debug!(
            %run_id,
            agent = self.persona.agent_name(),
            model = %response.model,
            tokens = response.usage.total_tokens,
            "Agent answered"
        );
        Ok(response.into_text())
    }
}
