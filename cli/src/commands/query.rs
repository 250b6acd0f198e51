// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `biaslens query` - send one prompt to several models and compare
//!
//! Runs the orchestrator in-process; no server needed.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::fmt::Write;
use std::path::PathBuf;

use biaslens_core::domain::app_config::BiasLensConfigManifest;
use biaslens_core::domain::bias::{self, IndicatorCategory};
use biaslens_core::domain::query::{ComparisonResult, QueryRequest, DEFAULT_TEMPERATURE};
use biaslens_core::presentation::export;

use crate::embedded::EmbeddedServices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Args)]
pub struct QueryCommand {
    /// Prompt text
    #[arg(short, long, required_unless_present = "prompt_id", conflicts_with = "prompt_id")]
    prompt: Option<String>,

    /// Use a prompt from the bias prompt catalog instead
    #[arg(long, value_name = "ID")]
    prompt_id: Option<String>,

    /// Model id to query (repeatable). Defaults to every available model.
    #[arg(short, long = "model", value_name = "ID")]
    models: Vec<String>,

    /// Sampling temperature, 0.0 to 2.0
    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the rendered comparison to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Mark gender, age, ethnicity and profession terms in responses
    #[arg(long)]
    highlight: bool,
}

pub async fn execute(cmd: QueryCommand, manifest: BiasLensConfigManifest) -> Result<()> {
    let services = EmbeddedServices::new(manifest)?;

    let prompt = match (cmd.prompt, cmd.prompt_id) {
        (Some(prompt), _) => prompt,
        (None, Some(id)) => services
            .prompts
            .get(&id)
            .map(|p| p.prompt.clone())
            .with_context(|| format!("No bias prompt with id '{}'", id))?,
        (None, None) => bail!("Either --prompt or --prompt-id is required"),
    };

    let models = if cmd.models.is_empty() {
        let registry = services.orchestrator.registry();
        registry
            .list()
            .into_iter()
            .filter(|m| m.available)
            .map(|m| m.id)
            .collect()
    } else {
        cmd.models
    };

    if cmd.output.is_some() && cmd.format == OutputFormat::Table {
        bail!("--output requires --format json or --format csv");
    }

    let request = QueryRequest::new(prompt, models, cmd.temperature);
    let result = services.orchestrator.run(request).await?;

    let rendered = render(&result, cmd.format, cmd.highlight)?;

    match cmd.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write comparison to {:?}", path))?;
            println!(
                "{}",
                format!(
                    "✓ {}/{} models responded, written to {}",
                    result.success_count(),
                    result.responses().len(),
                    path.display()
                )
                .green()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

pub fn render(result: &ComparisonResult, format: OutputFormat, highlight: bool) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = export::to_json(result).context("Failed to serialize comparison")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => Ok(export::to_csv(result)),
        OutputFormat::Table => Ok(render_table(result, highlight)),
    }
}

fn render_table(result: &ComparisonResult, highlight: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Prompt:".bold(), result.prompt());
    let _ = writeln!(out, "{}", result.timestamp().to_rfc3339().dimmed());
    let _ = writeln!(out);

    for entry in result.responses() {
        let _ = writeln!(
            out,
            "{} ({}) {}",
            entry.model_name().bold(),
            entry.model_id(),
            format!("{} ms", entry.latency_ms()).dimmed()
        );

        match (entry.response(), entry.error()) {
            (Some(text), _) => {
                let body = if highlight {
                    bias::highlight(text, decorate)
                } else {
                    text.to_string()
                };
                for line in body.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
                if highlight {
                    let summary = bias::summarize(text);
                    if !summary.is_empty() {
                        let counts: Vec<String> = summary
                            .iter()
                            .map(|(category, n)| format!("{}={}", category.as_str(), n))
                            .collect();
                        let _ = writeln!(out, "    {}", format!("indicators: {}", counts.join(" ")).dimmed());
                    }
                }
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "    {}", format!("✗ {}", error).red());
            }
            (None, None) => {}
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "{}/{} models responded",
        result.success_count(),
        result.responses().len()
    );

    out
}

fn decorate(term: &str, category: IndicatorCategory) -> String {
    let marked = match category {
        IndicatorCategory::Gender => term.magenta(),
        IndicatorCategory::Age => term.yellow(),
        IndicatorCategory::Ethnicity => term.cyan(),
        IndicatorCategory::Profession => term.blue(),
    };
    marked.bold().underline().to_string()
}
