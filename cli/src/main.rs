// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # BiasLens CLI
//!
//! The `biaslens` binary sends one prompt to several language models at once
//! so their answers can be compared side by side for bias.
//!
//! ## Commands
//!
//! - `biaslens serve` - HTTP API (and optional static front-end)
//! - `biaslens query --prompt ... --model ...` - one comparison, printed or exported
//! - `biaslens models` - catalog with availability
//! - `biaslens prompts` - bias test prompts
//! - `biaslens config show|validate|generate` - configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use biaslens_cli::commands::{self, ConfigCommand, PromptsCommand, QueryCommand, ServeCommand};
use biaslens_core::domain::app_config::BiasLensConfigManifest;

/// BiasLens - compare language model answers side by side
#[derive(Parser)]
#[command(name = "biaslens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "BIASLENS_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); falls back to the
    /// configured observability.logging.level, then "info"
    #[arg(long, global = true, env = "BIASLENS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },

    /// Send a prompt to several models and compare the answers
    #[command(name = "query")]
    Query {
        #[command(flatten)]
        command: QueryCommand,
    },

    /// List configured models and their availability
    #[command(name = "models")]
    Models,

    /// List bias test prompts
    #[command(name = "prompts")]
    Prompts {
        #[command(flatten)]
        command: PromptsCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Provider keys usually live in .env during development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Loaded before the subscriber exists so the configured log level can
    // apply; the loader's discovery and override lines are not emitted.
    let manifest = BiasLensConfigManifest::load_or_default(cli.config.clone());

    let level = resolve_log_level(cli.log_level.clone(), manifest.as_ref().ok());
    init_logging(&level)?;

    if manifest.is_ok() {
        match cli.config.clone().or_else(BiasLensConfigManifest::discover_config) {
            Some(path) => info!("Configuration loaded from {:?}", path),
            None => info!("No configuration file found; using built-in defaults"),
        }
    }

    match cli.command {
        Some(Commands::Serve { command }) => {
            commands::serve::execute(command, loaded(manifest)?).await
        }
        Some(Commands::Query { command }) => {
            commands::query::execute(command, loaded(manifest)?).await
        }
        Some(Commands::Models) => commands::models::execute(loaded(manifest)?).await,
        Some(Commands::Prompts { command }) => {
            commands::prompts::execute(command, loaded(manifest)?).await
        }
        // Config commands report load errors themselves
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

fn loaded(manifest: Result<BiasLensConfigManifest>) -> Result<BiasLensConfigManifest> {
    manifest.context("Failed to load configuration")
}

/// `--log-level` wins, then `observability.logging.level`, then "info"
fn resolve_log_level(cli: Option<String>, manifest: Option<&BiasLensConfigManifest>) -> String {
    cli.or_else(|| {
        manifest
            .and_then(|m| m.spec.observability.as_ref())
            .and_then(|o| o.logging.as_ref())
            .map(|l| l.level.clone())
    })
    .unwrap_or_else(|| "info".to_string())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
