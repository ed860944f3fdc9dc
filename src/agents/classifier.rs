//! Query classifier
//!
//! One completion call decides whether a query goes to the HR or the Tech
//! agent. The reply is matched loosely: anything containing "hr" once
//! lower-cased is HR, everything else falls back to Tech.

use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Which agent answers a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hr,
    Tech,
}

impl Category {
    /// Reduce a classifier reply to a category
    ///
    /// Substring match, not exact match: "I think this is HR-related" is HR,
    /// and an empty or unexpected reply is Tech.
    pub fn from_reply(reply: &str) -> Self {
        if reply.trim().to_lowercase().contains("hr") {
            Category::Hr
        } else {
            Category::Tech
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hr => "hr",
            Category::Tech => "tech",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the classification prompt with the query embedded verbatim
pub fn classification_prompt(query: &str) -> String {
    format!("Classify this query into 'HR' or 'TECH'. Respond with only one word:\n{query}")
}

/// Classifies queries with a single completion call
pub struct Classifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl Classifier {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Classify a query under a fresh run id
    pub async fn classify(&self, query: &str) -> Result<Category, LlmError> {
        self.classify_with_run(query, Uuid::now_v7()).await
    }

    /// Classify a query, tagging the completion call with `run_id`
    pub async fn classify_with_run(&self, query: &str, run_id: Uuid) -> Result<Category, LlmError> {
        let request = CompletionRequest::prompt(
            &self.model,
            classification_prompt(query),
            self.temperature,
            run_id,
        );

        let response = self.provider.complete(request).await?;
        let category = Category::from_reply(response.text());

        debug!(
            %run_id,
            model = %response.model,
            reply = response.text(),
            category = category.as_str(),
            "Classified query"
        );
        Ok(category)
    }
}
