//! openweather-mcp: MCP server exposing OpenWeather lookups as tools
//!
//! Launched as a child process by an MCP client; stdin/stdout carry
//! protocol traffic, stderr carries logs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use openweather_mcp::config;
use openweather_mcp::mcp::McpServer;
use openweather_mcp::tools;
use openweather_mcp::upstream::{WeatherApi, WeatherClient};

/// MCP server exposing OpenWeather lookups as tools.
///
/// Reads newline-delimited JSON-RPC 2.0 from stdin and writes replies to
/// stdout; all diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(name = "openweather-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr only; stdout is the protocol stream.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the openweather-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // A local .env may carry OPENWEATHER_KEY; absence is fine.
    let _ = dotenvy::dotenv();

    // Load configuration; a missing or empty API key fails here, at
    // startup, instead of on the first tool call.
    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("\nSet {} or provide a config file", config::ENV_API_KEY);
            if args.config.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("Default config location: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "openweather-mcp {}  Copyright (C) 2026  openweather-mcp contributors",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        units = %cfg.provider.units,
        lang = %cfg.provider.lang,
        "Starting openweather-mcp server"
    );

    // Build the upstream client and register the tools
    let client = match WeatherClient::new(&cfg.provider) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build upstream client");
            return ExitCode::FAILURE;
        }
    };

    let registry = match tools::build_registry(Arc::new(client) as Arc<dyn WeatherApi>) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to build tool registry");
            return ExitCode::FAILURE;
        }
    };

    info!(
        tools = registry.len(),
        "MCP server ready, waiting for client connection..."
    );

    // Run the server
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let server = McpServer::stdio(Arc::new(registry));
    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
