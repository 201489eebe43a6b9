//! Entry point for the `ai-cli` binary.
//!
//! Two modes:
//! - `--init [PATH]` runs the one-shot workspace initializer and exits
//! - no arguments starts the long-running MCP tool server on stdio

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use ai_cli_mcp::core::{Config, McpServer, StdioTransport, config::resolve_package_root};
use ai_cli_mcp::init::initialize_workspace;

/// Shared MCP tools for AI coding CLIs.
#[derive(Debug, Parser)]
#[command(name = "ai-cli", version, disable_version_flag = true)]
struct Cli {
    /// Initialize a workspace (defaults to the current directory).
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = ".")]
    init: Option<PathBuf>,

    /// Workspace root for server mode (overrides AI_CLI_WORKSPACE).
    #[arg(short, long, value_name = "PATH")]
    workspace: Option<PathBuf>,

    /// Print version and exit.
    #[arg(
        short = 'v',
        long = "version",
        action = ArgAction::Version,
        value_parser = clap::value_parser!(bool)
    )]
    version: Option<bool>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(workspace) = cli.init {
        return match initialize_workspace(&workspace, &resolve_package_root()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run_server(cli.workspace).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server(workspace: Option<PathBuf>) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(workspace) = workspace {
        config = config.with_workspace(&workspace);
    }

    // Logs go to stderr; stdout carries the MCP protocol
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!("Workspace: {}", config.workspace.root.display());

    let server = McpServer::new(config);

    info!("Server initialized");

    StdioTransport::run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
