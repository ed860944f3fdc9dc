//! Configuration loading and validation tests
//!
//! Tests focus on the behavior of loading files from disk, validation
//! failures and credential resolution.

use multi_agent_router::config::{AppConfig, ConfigError, TraceBackend};
use multi_agent_router::trace::TracingStyle;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{content}").unwrap();
    temp_file
}

#[test]
fn test_config_loads_successfully_from_valid_toml() {
    let temp_file = write_config(
        r#"
[llm]
model = "gpt-4o-mini"
api_key_env = "ROUTER_TEST_OPENAI_KEY"
temperature = 0.0

[tracing]
backend = "langsmith"

[tracing.langsmith]
api_key_env = "ROUTER_TEST_LANGSMITH_KEY"
project = "hr-tech-demo"
"#,
    );

    let config = AppConfig::load_from_file(temp_file.path()).unwrap();

    assert_eq!(config.llm.provider, "openai");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.api_key_env, "ROUTER_TEST_OPENAI_KEY");
    assert_eq!(config.tracing.backend, TraceBackend::LangSmith);
    assert_eq!(config.tracing.langsmith.project, "hr-tech-demo");
    assert_eq!(config.tracing.effective_style(), TracingStyle::Decorator);
}

#[test]
fn test_load_with_explicit_path_reports_source() {
    let temp_file = write_config("[tracing]\nbackend = \"none\"\n");

    let (config, source) = AppConfig::load(Some(temp_file.path())).unwrap();

    assert_eq!(config.tracing.backend, TraceBackend::None);
    assert_eq!(source.as_deref(), Some(temp_file.path()));
}

#[test]
fn test_missing_file_is_read_error() {
    let result = AppConfig::load_from_file(std::path::Path::new("/nonexistent/multi-agent.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp_file = write_config("[llm\nmodel = ");
    let result = AppConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_out_of_range_temperature_fails_validation() {
    let temp_file = write_config("[llm]\ntemperature = 2.5\n");
    let result = AppConfig::load_from_file(temp_file.path());

    match result {
        Err(ConfigError::InvalidConfig(msg)) => assert!(msg.contains("llm.temperature")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_invalid_langfuse_host_fails_validation() {
    let temp_file = write_config(
        "[tracing]\nbackend = \"langfuse\"\n[tracing.langfuse]\nhost = \"langfuse.local\"\n",
    );
    let result = AppConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn test_credentials_resolved_from_environment() {
    std::env::set_var("ROUTER_TEST_RESOLVE_OPENAI_KEY", "sk-test-123456");
    std::env::set_var("ROUTER_TEST_RESOLVE_LF_PUBLIC", "pk-lf-1");
    std::env::set_var("ROUTER_TEST_RESOLVE_LF_SECRET", "sk-lf-1");

    let temp_file = write_config(
        r#"
[llm]
api_key_env = "ROUTER_TEST_RESOLVE_OPENAI_KEY"
base_url = "http://localhost:8080/v1/"
timeout_secs = 7
max_retries = 1

[tracing]
backend = "langfuse"

[tracing.langfuse]
public_key_env = "ROUTER_TEST_RESOLVE_LF_PUBLIC"
secret_key_env = "ROUTER_TEST_RESOLVE_LF_SECRET"
host = "http://localhost:3000/"
"#,
    );
    let config = AppConfig::load_from_file(temp_file.path()).unwrap();

    let openai = config.openai_config().unwrap();
    assert_eq!(openai.api_key, "sk-test-123456");
    assert_eq!(openai.base_url, "http://localhost:8080/v1");
    assert_eq!(openai.timeout, Duration::from_secs(7));
    assert_eq!(openai.max_retries, 1);

    let langfuse = config.langfuse_config().unwrap();
    assert_eq!(langfuse.public_key, "pk-lf-1");
    assert_eq!(langfuse.secret_key, "sk-lf-1");
    assert_eq!(langfuse.host, "http://localhost:3000");
    assert_eq!(config.tracing.effective_style(), TracingStyle::Explicit);
}

#[test]
fn test_empty_env_var_counts_as_missing() {
    std::env::set_var("ROUTER_TEST_EMPTY_LS_KEY", "");

    let mut config = AppConfig::default();
    config.tracing.langsmith.api_key_env = "ROUTER_TEST_EMPTY_LS_KEY".to_string();

    let result = config.langsmith_config();
    assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "ROUTER_TEST_EMPTY_LS_KEY"));
}
