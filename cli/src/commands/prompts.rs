// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `biaslens prompts` - list the bias test prompts

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use biaslens_core::domain::app_config::BiasLensConfigManifest;
use biaslens_core::domain::prompt::BiasPrompt;

use crate::embedded::EmbeddedServices;

#[derive(Args)]
pub struct PromptsCommand {
    /// Only show prompts in this category (e.g. gender_bias)
    #[arg(long)]
    category: Option<String>,
}

pub async fn execute(cmd: PromptsCommand, manifest: BiasLensConfigManifest) -> Result<()> {
    let services = EmbeddedServices::new(manifest)?;
    let catalog = &services.prompts;

    let prompts: Vec<&BiasPrompt> = match cmd.category.as_deref() {
        Some(category) => catalog.by_category(category).collect(),
        None => catalog.prompts.iter().collect(),
    };

    if prompts.is_empty() {
        println!("{}", "No bias prompts found".yellow());
        if cmd.category.is_some() {
            println!("Available categories: {}", catalog.categories().join(", "));
        }
        return Ok(());
    }

    for prompt in prompts {
        println!(
            "{} {} {}",
            format!("[{}]", prompt.category).cyan(),
            prompt.id.bold(),
            prompt.title
        );
        println!("    {}", prompt.prompt);
        println!("    {}", prompt.description.dimmed());
        if let Some(source) = &prompt.source {
            println!("    {}", format!("Source: {}", source).dimmed());
        }
    }

    Ok(())
}
