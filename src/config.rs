//! Configuration for the multi-agent router
//!
//! Loaded from TOML. Secrets never live in the file: sections name the
//! environment variables that hold them, and those are read when the clients
//! are built. Every field has a default, so an empty file (or no file at all)
//! gives the OpenAI `gpt-4o-mini` setup with log tracing.

use crate::llm::providers::OpenAiConfig;
use crate::trace::{LangSmithConfig, LangfuseConfig, TracingStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Files tried, in order, when no path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["multi-agent.toml", "config/multi-agent.toml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    /// Classifier overrides; the classifier uses `[llm]` otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<RouterSection>,
    #[serde(default)]
    pub tracing: TracingSection,
}

/// Completion endpoint settings shared by the classifier and the agents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// Provider name; only "openai" (any OpenAI-compatible endpoint) is supported
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable containing API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sampling temperature for the agents (0.0 to 2.0)
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on network and server errors
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

/// Classifier overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouterSection {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Trace backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceBackend {
    None,
    Log,
    LangSmith,
    Langfuse,
}

impl TraceBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceBackend::None => "none",
            TraceBackend::Log => "log",
            TraceBackend::LangSmith => "langsmith",
            TraceBackend::Langfuse => "langfuse",
        }
    }

    /// Product name shown in the shell banner, for hosted backends
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            TraceBackend::LangSmith => Some("LangSmith"),
            TraceBackend::Langfuse => Some("Langfuse"),
            TraceBackend::None | TraceBackend::Log => None,
        }
    }

    /// Style used when the configuration does not pick one
    pub fn default_style(&self) -> TracingStyle {
        match self {
            TraceBackend::Langfuse => TracingStyle::Explicit,
            _ => TracingStyle::Decorator,
        }
    }
}

impl fmt::Display for TraceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraceBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(TraceBackend::None),
            "log" => Ok(TraceBackend::Log),
            "langsmith" => Ok(TraceBackend::LangSmith),
            "langfuse" => Ok(TraceBackend::Langfuse),
            other => Err(ConfigError::InvalidConfig(format!(
                "Unknown trace backend '{other}' (expected none, log, langsmith or langfuse)"
            ))),
        }
    }
}

/// Tracing section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TracingSection {
    #[serde(default = "default_backend")]
    pub backend: TraceBackend,
    /// Defaults to explicit for langfuse and decorator otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TracingStyle>,
    #[serde(default)]
    pub langsmith: LangSmithSection,
    #[serde(default)]
    pub langfuse: LangfuseSection,
}

impl Default for TracingSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            style: None,
            langsmith: LangSmithSection::default(),
            langfuse: LangfuseSection::default(),
        }
    }
}

impl TracingSection {
    pub fn effective_style(&self) -> TracingStyle {
        self.style.unwrap_or_else(|| self.backend.default_style())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LangSmithSection {
    #[serde(default = "default_langsmith_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_langsmith_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_langsmith_project")]
    pub project: String,
}

impl Default for LangSmithSection {
    fn default() -> Self {
        Self {
            api_key_env: default_langsmith_key_env(),
            endpoint: default_langsmith_endpoint(),
            project: default_langsmith_project(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LangfuseSection {
    #[serde(default = "default_langfuse_public_env")]
    pub public_key_env: String,
    #[serde(default = "default_langfuse_secret_env")]
    pub secret_key_env: String,
    #[serde(default = "default_langfuse_host")]
    pub host: String,
}

impl Default for LangfuseSection {
    fn default() -> Self {
        Self {
            public_key_env: default_langfuse_public_env(),
            secret_key_env: default_langfuse_secret_env(),
            host: default_langfuse_host(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_backend() -> TraceBackend {
    TraceBackend::Log
}

fn default_langsmith_key_env() -> String {
    "LANGSMITH_API_KEY".to_string()
}

fn default_langsmith_endpoint() -> String {
    "https://api.smith.langchain.com".to_string()
}

fn default_langsmith_project() -> String {
    "default".to_string()
}

fn default_langfuse_public_env() -> String {
    "LANGFUSE_PUBLIC_KEY".to_string()
}

fn default_langfuse_secret_env() -> String {
    "LANGFUSE_SECRET_KEY".to_string()
}

fn default_langfuse_host() -> String {
    "https://cloud.langfuse.com".to_string()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, else from the first default path that exists, else defaults
    ///
    /// Returns the file the configuration came from, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = path {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }

        for candidate in DEFAULT_CONFIG_PATHS {
            let candidate = PathBuf::from(candidate);
            if candidate.exists() {
                let config = Self::load_from_file(&candidate)?;
                return Ok((config, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Check value ranges and endpoint URLs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider != "openai" {
            return Err(ConfigError::InvalidConfig(format!(
                "Unsupported LLM provider: {}",
                self.llm.provider
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        validate_temperature("llm.temperature", self.llm.temperature)?;
        if let Some(router) = &self.router {
            if let Some(temperature) = router.temperature {
                validate_temperature("router.temperature", temperature)?;
            }
            if router.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
                return Err(ConfigError::InvalidConfig(
                    "router.model must not be empty".to_string(),
                ));
            }
        }

        validate_url("llm.base_url", &self.llm.base_url)?;
        match self.tracing.backend {
            TraceBackend::LangSmith => {
                validate_url("tracing.langsmith.endpoint", &self.tracing.langsmith.endpoint)?
            }
            TraceBackend::Langfuse => {
                validate_url("tracing.langfuse.host", &self.tracing.langfuse.host)?
            }
            TraceBackend::None | TraceBackend::Log => {}
        }

        Ok(())
    }

    /// Helper method to get environment variable with error propagation
    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }

    /// Get LLM API key from environment variable
    pub fn get_llm_api_key(&self) -> Result<String, ConfigError> {
        Self::get_env_var_required(&self.llm.api_key_env)
    }

    /// Model used by the classifier
    pub fn router_model(&self) -> &str {
        self.router
            .as_ref()
            .and_then(|r| r.model.as_deref())
            .unwrap_or(&self.llm.model)
    }

    /// Temperature used by the classifier
    pub fn router_temperature(&self) -> f32 {
        self.router
            .as_ref()
            .and_then(|r| r.temperature)
            .unwrap_or(self.llm.temperature)
    }

    /// OpenAI client settings with the API key resolved
    pub fn openai_config(&self) -> Result<OpenAiConfig, ConfigError> {
        Ok(OpenAiConfig {
            api_key: self.get_llm_api_key()?,
            base_url: self.llm.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.llm.timeout_secs),
            max_retries: self.llm.max_retries,
        })
    }

    /// LangSmith recorder settings with the API key resolved
    pub fn langsmith_config(&self) -> Result<LangSmithConfig, ConfigError> {
        let section = &self.tracing.langsmith;
        Ok(LangSmithConfig {
            api_key: Self::get_env_var_required(&section.api_key_env)?,
            endpoint: section.endpoint.trim_end_matches('/').to_string(),
            project: section.project.clone(),
            ..Default::default()
        })
    }

    /// Langfuse recorder settings with both keys resolved
    pub fn langfuse_config(&self) -> Result<LangfuseConfig, ConfigError> {
        let section = &self.tracing.langfuse;
        Ok(LangfuseConfig {
            public_key: Self::get_env_var_required(&section.public_key_env)?,
            secret_key: Self::get_env_var_required(&section.secret_key_env)?,
            host: section.host.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }
}

fn validate_temperature(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::InvalidConfig(format!(
            "{field} must be between 0.0 and 2.0, got {value}"
        )));
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidConfig(format!("{field} is not a valid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfig(format!(
            "{field} must use http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(())
}
