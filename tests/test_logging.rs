//! Tests for logging configuration and format parsing
//!
//! Covers the pure functions that turn environment values and the `-v`
//! count into a subscriber configuration.

use multi_agent_router::observability::logging::{
    default_filter, parse_level, raise_level, LogFormat,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[test]
fn test_log_format_parse_case_insensitive() {
    assert_eq!(LogFormat::parse("jSoN"), LogFormat::Json);
    assert_eq!(LogFormat::parse("PrEtTy"), LogFormat::Pretty);
    assert_eq!(LogFormat::parse("CoMpAcT"), LogFormat::Compact);
}

#[test]
fn test_log_format_parse_whitespace() {
    assert_eq!(LogFormat::parse("  json  "), LogFormat::Json);
    assert_eq!(LogFormat::parse("json\n"), LogFormat::Json);
    assert_eq!(LogFormat::parse("\tpretty"), LogFormat::Pretty);
}

#[test]
fn test_log_format_unknown_defaults_to_compact() {
    for input in ["invalid", "", "xml", "yaml", "123"] {
        assert_eq!(LogFormat::parse(input), LogFormat::Compact, "input: {input:?}");
    }
}

#[test]
fn test_log_level_defaults_to_warn() {
    let test_cases = vec![
        ("ERROR", Level::ERROR),
        ("warn", Level::WARN),
        ("Info", Level::INFO),
        ("DEBUG", Level::DEBUG),
        ("trace", Level::TRACE),
        ("verbose", Level::WARN),
        ("", Level::WARN),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse_level(input), expected, "Failed for input: {input}");
    }
}

#[test]
fn test_verbosity_raises_level() {
    assert_eq!(raise_level(parse_level(""), 0), Level::WARN);
    assert_eq!(raise_level(parse_level(""), 1), Level::INFO);
    assert_eq!(raise_level(parse_level("info"), 2), Level::TRACE);
    assert_eq!(raise_level(parse_level("debug"), u8::MAX), Level::TRACE);
}

#[test]
fn test_default_filter_shows_log_backend_spans_at_default_level() {
    let filter = default_filter(parse_level(""));

    assert!(filter.starts_with("WARN,"), "filter: {filter}");
    assert!(
        filter.contains("multi_agent_router::trace::sinks=INFO"),
        "filter: {filter}"
    );
    assert!(EnvFilter::try_new(&filter).is_ok());
}

#[test]
fn test_default_filter_follows_more_verbose_levels() {
    let filter = default_filter(raise_level(parse_level(""), 2));

    assert!(filter.starts_with("DEBUG,"), "filter: {filter}");
    assert!(filter.contains("multi_agent_router::trace::sinks=DEBUG"));
    assert!(EnvFilter::try_new(&filter).is_ok());
}
