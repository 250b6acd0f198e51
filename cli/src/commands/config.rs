// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use biaslens_core::domain::app_config::{BiasLensConfigManifest, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./biaslens-config.yaml)
        #[arg(short, long, default_value = "./biaslens-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let manifest = BiasLensConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;
    let config = &manifest.spec;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./biaslens-config.yaml");
        println!("  4. ~/.biaslens/config.yaml");
        println!("  5. /etc/biaslens/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", manifest.metadata.name);
    println!();

    println!("{}", "Server:".bold());
    println!("  Address: {}:{}", config.server.bind_address, config.server.port);
    println!("  CORS origins: {}", config.server.cors_origins.join(", "));
    if let Some(dir) = &config.server.frontend_dir {
        println!("  Front-end: {}", dir.display());
    }
    println!();

    println!("{}", "Queries:".bold());
    println!("  Timeout: {}s per model", config.query.timeout_seconds);
    match config.query.max_concurrent_queries {
        Some(limit) => println!("  Concurrency limit: {}", limit),
        None => println!("  Concurrency limit: {}", "(unbounded)".dimmed()),
    }
    println!();

    let env = config.capture_environment();
    println!("{}", "Models:".bold());
    for model in &config.models {
        let marker = if model.is_available(&env) {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {} ({}) → {}",
            marker,
            model.id.bold(),
            model.provider,
            model.model_name
        );
        if let Some(endpoint) = model.resolve_endpoint(&env) {
            println!("      Endpoint: {}", endpoint);
        }
        if let Some(key) = &model.credential_env {
            println!("      API key: {}", key);
        }
    }
    println!();

    println!("{}", "Bias prompts:".bold());
    match &config.prompts_file {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  {}", "(built-in catalog)".dimmed()),
    }
    println!();

    for warning in config.warnings(&env) {
        println!("{}", format!("⚠ {}", warning).yellow());
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let manifest = BiasLensConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    manifest
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = template(with_examples);

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn template(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}
