// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Bias prompt catalog loader. Accepts JSON or YAML, either as
// `{ prompts: [...] }` or as a bare list.

use crate::domain::prompt::{BiasPrompt, BiasPromptCatalog};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped(BiasPromptCatalog),
    Bare(Vec<BiasPrompt>),
}

impl From<CatalogFile> for BiasPromptCatalog {
    fn from(file: CatalogFile) -> Self {
        match file {
            CatalogFile::Wrapped(catalog) => catalog,
            CatalogFile::Bare(prompts) => BiasPromptCatalog::new(prompts),
        }
    }
}

pub fn load_prompt_catalog(path: impl AsRef<Path>) -> Result<BiasPromptCatalog> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt catalog {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let file: CatalogFile = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse prompt catalog {:?}", path))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse prompt catalog {:?}", path))?
    };

    Ok(file.into())
}

/// Configured catalog if set, otherwise the built-in prompts.
///
/// A configured file that fails to load is an error, not a silent fallback.
pub fn load_or_builtin(path: Option<&Path>) -> Result<BiasPromptCatalog> {
    match path {
        Some(path) => {
            let catalog = load_prompt_catalog(path)?;
            tracing::info!("Loaded {} bias prompts from {:?}", catalog.len(), path);
            Ok(catalog)
        }
        None => Ok(BiasPromptCatalog::builtin()),
    }
}
