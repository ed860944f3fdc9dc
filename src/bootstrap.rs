//! Builds the router from configuration
//!
//! All construction and credential lookup lives here; the agents only ever
//! see injected `Arc<dyn LlmProvider>` and [`Tracer`] values.

use crate::agents::{Classifier, Orchestrator, Persona, Responder};
use crate::config::{AppConfig, TraceBackend};
use crate::error::RouterResult;
use crate::llm::provider::LlmProvider;
use crate::llm::providers::OpenAiProvider;
use crate::trace::{
    LangSmithRecorder, LangfuseRecorder, LogRecorder, NoopRecorder, TraceRecorder, Tracer,
};
use std::sync::Arc;
use tracing::info;

/// Provider factory for creating LLM providers from configuration
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create_provider(config: &AppConfig) -> RouterResult<Arc<dyn LlmProvider>> {
        let provider = OpenAiProvider::new(config.openai_config()?)?;
        info!(
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            "LLM provider ready"
        );
        Ok(Arc::new(provider))
    }
}

/// Recorder factory for the configured trace backend
pub struct RecorderFactory;

impl RecorderFactory {
    pub fn create_recorder(config: &AppConfig) -> RouterResult<Arc<dyn TraceRecorder>> {
        let recorder: Arc<dyn TraceRecorder> = match config.tracing.backend {
            TraceBackend::None => Arc::new(NoopRecorder),
            TraceBackend::Log => Arc::new(LogRecorder),
            TraceBackend::LangSmith => Arc::new(LangSmithRecorder::new(config.langsmith_config()?)?),
            TraceBackend::Langfuse => Arc::new(LangfuseRecorder::new(config.langfuse_config()?)?),
        };
        info!(backend = recorder.name(), "Trace recorder ready");
        Ok(recorder)
    }
}

/// Wire classifier, responders and tracer into an orchestrator
pub fn build_orchestrator(
    config: &AppConfig,
    provider: Arc<dyn LlmProvider>,
    tracer: Tracer,
) -> Orchestrator {
    let classifier = Classifier::new(provider.clone(), config.router_model())
        .with_temperature(config.router_temperature());
    let hr_agent = Responder::new(Persona::Hr, provider.clone(), config.llm.model.clone())
        .with_temperature(config.llm.temperature);
    let tech_agent = Responder::new(Persona::Tech, provider, config.llm.model.clone())
        .with_temperature(config.llm.temperature);

    Orchestrator::new(classifier, hr_agent, tech_agent, tracer)
        .with_style(config.tracing.effective_style())
}

/// Build the full router: provider, recorder and orchestrator
pub fn build_router(config: &AppConfig) -> RouterResult<Orchestrator> {
    let provider = LlmProviderFactory::create_provider(config)?;
    let tracer = Tracer::new(RecorderFactory::create_recorder(config)?);
    Ok(build_orchestrator(config, provider, tracer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::RouterError;
    use crate::testing::MockLlmProvider;
    use crate::trace::TracingStyle;

    #[test]
    fn test_recorder_factory_local_backends() {
        let mut config = AppConfig::default();

        config.tracing.backend = TraceBackend::None;
        assert_eq!(RecorderFactory::create_recorder(&config).unwrap().name(), "none");

        config.tracing.backend = TraceBackend::Log;
        assert_eq!(RecorderFactory::create_recorder(&config).unwrap().name(), "log");
    }

    #[test]
    fn test_hosted_backend_requires_credentials() {
        let mut config = AppConfig::default();
        config.tracing.backend = TraceBackend::LangSmith;
        config.tracing.langsmith.api_key_env = "MULTI_AGENT_TEST_UNSET_LS_KEY_91c2".to_string();

        let result = RecorderFactory::create_recorder(&config);
        assert!(matches!(
            result,
            Err(RouterError::Config(ConfigError::EnvVarNotFound(_)))
        ));
    }

    #[test]
    fn test_build_orchestrator_applies_config() {
        let mut config = AppConfig::default();
        config.tracing.backend = TraceBackend::Langfuse;

        let provider = Arc::new(MockLlmProvider::new(vec![]));
        let orchestrator = build_orchestrator(&config, provider, Tracer::disabled());

        assert_eq!(orchestrator.style(), TracingStyle::Explicit);
        assert_eq!(orchestrator.tracer().backend(), "none");
    }

    #[tokio::test]
    async fn test_build_orchestrator_uses_router_overrides() {
        let config = AppConfig::from_toml(
            "[llm]\nmodel = \"agent-model\"\ntemperature = 0.7\n[router]\nmodel = \"router-model\"\n",
        )
        .unwrap();
        let provider = Arc::new(MockLlmProvider::new(vec![
            "tech".to_string(),
            "Restart it.".to_string(),
        ]));
        let orchestrator = build_orchestrator(&config, provider.clone(), Tracer::disabled());

        orchestrator.orchestrate("printer jam").await.unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests[0].model, "router-model");
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[1].model, "agent-model");
        assert_eq!(requests[1].temperature, Some(0.7));
    }
}
