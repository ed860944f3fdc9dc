//! Multi-agent router - command line entry point

use clap::{Parser, Subcommand};
use multi_agent_router::bootstrap::build_router;
use multi_agent_router::config::{AppConfig, TraceBackend};
use multi_agent_router::error::{RouterError, RouterResult};
use multi_agent_router::observability::init_default_logging;
use multi_agent_router::shell::{banner, format_result, Shell};
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::BufReader;
use tracing::{error, info};

/// Route HR and technical questions to the right agent
#[derive(Parser)]
#[command(name = "multi-agent")]
#[command(about = "Routes queries to an HR or a Tech agent and traces every step")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MULTI_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Trace backend, overriding the configuration file (none, log, langsmith, langfuse)
    #[arg(long, value_name = "BACKEND")]
    trace: Option<TraceBackend>,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (default)
    Chat,
    /// Route a single query and exit
    Ask {
        /// The question to route
        query: String,
    },
    /// Validate configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging(cli.verbose);

    let config = match load_configuration(cli.config.as_deref(), cli.trace) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e.sanitized(), "Failed to load configuration");
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_shell(&config).await,
        Commands::Ask { query } => run_once(&config, &query).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!(error = %e.sanitized(), "Command failed");
        process::exit(1);
    }
}

fn load_configuration(
    path: Option<&Path>,
    trace_override: Option<TraceBackend>,
) -> RouterResult<AppConfig> {
    let (mut config, source) = AppConfig::load(path)?;
    match source {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    if let Some(backend) = trace_override {
        config.tracing.backend = backend;
        config.validate()?;
    }
    Ok(config)
}

async fn run_shell(config: &AppConfig) -> RouterResult<()> {
    let orchestrator = build_router(config)?;
    println!("{}", banner(config.tracing.backend));

    let shell = Shell::new(&orchestrator);
    let result = shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await;

    orchestrator.tracer().flush().await;
    let answered = result?;
    info!(answered, "Shell closed");
    Ok(())
}

async fn run_once(config: &AppConfig, query: &str) -> RouterResult<()> {
    let orchestrator = build_router(config)?;
    let result = orchestrator.orchestrate(query).await;
    orchestrator.tracer().flush().await;

    println!("{}", format_result(&result?));
    Ok(())
}

fn handle_config_command(config: &AppConfig, show: bool) -> RouterResult<()> {
    if show {
        let text = toml::to_string_pretty(config)
            .map_err(|e| RouterError::internal(format!("Failed to render configuration: {e}")))?;
        println!("{text}");
    }

    info!("Configuration validation complete");
    Ok(())
}
