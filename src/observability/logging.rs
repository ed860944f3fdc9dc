//! Structured logging using the tracing crate
//!
//! Log lines go to stderr so the interactive shell keeps stdout to itself.
//!
//! ## Environment Variables
//!
//! - `LOG_LEVEL`: ERROR, WARN, INFO, DEBUG or TRACE - defaults to WARN
//! - `LOG_FORMAT`: json, pretty or compact - defaults to compact
//! - `LOG_SPANS`: include span open/close events (true/false) - defaults to false
//! - `RUST_LOG`: overrides the filter entirely
//!
//! Without `RUST_LOG`, span records from the log trace backend are shown at
//! INFO even when the level is WARN.
//!
//! Each `-v` on the command line raises the level one step above `LOG_LEVEL`.
//!
//! ```bash
//! LOG_FORMAT=json LOG_LEVEL=INFO multi-agent ask "How do I reset my VPN token?"
//! multi-agent -vv
//! ```

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Multi-line, colored
    Pretty,
    /// Single line, colored
    Compact,
}

impl LogFormat {
    /// Parse log format from string, falling back to compact
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Parse a level name, falling back to WARN
pub fn parse_level(s: &str) -> Level {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "INFO" => Level::INFO,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::WARN,
    }
}

/// Raise `base` by `verbosity` steps, saturating at TRACE
pub fn raise_level(base: Level, verbosity: u8) -> Level {
    const LADDER: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];

    let start = LADDER.iter().position(|l| *l == base).unwrap_or(1);
    let index = (start + verbosity as usize).min(LADDER.len() - 1);
    LADDER[index]
}

/// Filter used when `RUST_LOG` is unset
///
/// The log trace backend writes finished spans at INFO, so its module stays at
/// INFO or more verbose whatever `level` is. Dependency noise is capped at WARN.
pub fn default_filter(level: Level) -> String {
    let sinks = level.max(Level::INFO);
    format!("{level},multi_agent_router::trace::sinks={sinks},hyper=warn,reqwest=warn,rustls=warn")
}

fn span_events(include_spans: bool) -> fmt::format::FmtSpan {
    if include_spans {
        fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE
    } else {
        fmt::format::FmtSpan::NONE
    }
}

/// Initialize logging with manual configuration
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => EnvFilter::new(default_filter(level)),
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(span_events(include_spans));
            subscriber.with(fmt_layer).try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_span_events(span_events(include_spans));
            subscriber.with(fmt_layer).try_init()
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_ansi(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_span_events(span_events(include_spans));
            subscriber.with(fmt_layer).try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}

/// Initialize logging from environment variables and the `-v` count
pub fn init_default_logging(verbosity: u8) {
    let base = env::var("LOG_LEVEL")
        .map(|v| parse_level(&v))
        .unwrap_or(Level::WARN);
    let level = raise_level(base, verbosity);

    let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let log_format = LogFormat::parse(&format);

    let include_spans = env::var("LOG_SPANS")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    init_logging(level, log_format, include_spans);
}

/// Span covering one query orchestration
#[macro_export]
macro_rules! orchestration_span {
    ($($field:tt)*) => {
        tracing::info_span!("orchestration", $($field)*)
    };
}

/// Span covering one completion call to the LLM provider
#[macro_export]
macro_rules! completion_span {
    ($($field:tt)*) => {
        tracing::info_span!("completion", $($field)*)
    };
}

pub use {completion_span, orchestration_span};
