// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `biaslens models` - catalog listing with current availability

use anyhow::Result;
use colored::Colorize;

use biaslens_core::domain::app_config::BiasLensConfigManifest;

use crate::embedded::EmbeddedServices;

pub async fn execute(manifest: BiasLensConfigManifest) -> Result<()> {
    let services = EmbeddedServices::new(manifest)?;
    let registry = services.orchestrator.registry();
    let listing = registry.list();

    if listing.is_empty() {
        println!("{}", "No models configured".yellow());
        return Ok(());
    }

    println!(
        "{} models configured, {} available:",
        listing.len(),
        registry.available_count()
    );
    println!(
        "{:<20} {:<28} {:<24} {:<24} {}",
        "ID", "NAME", "PROVIDER", "MODEL", "STATUS"
    );

    for model in &listing {
        let status = if model.available {
            "available".green()
        } else {
            "missing API key".red()
        };
        println!(
            "{:<20} {:<28} {:<24} {:<24} {}",
            model.id,
            model.name,
            model.provider.as_str(),
            model.model_name,
            status
        );
    }

    Ok(())
}
