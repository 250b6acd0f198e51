// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process service wiring
//!
//! Validates the loaded configuration, captures the environment once and
//! builds the orchestrator and prompt catalog shared by `serve` and `query`.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use biaslens_core::{
    application::QueryOrchestrator,
    domain::app_config::BiasLensConfigManifest,
    domain::prompt::BiasPromptCatalog,
    infrastructure::{
        llm::{HttpCompletionBackend, ModelRegistry},
        prompt_catalog,
    },
    presentation::api::AppState,
};

pub struct EmbeddedServices {
    pub manifest: BiasLensConfigManifest,
    pub orchestrator: Arc<QueryOrchestrator>,
    pub prompts: Arc<BiasPromptCatalog>,
}

impl EmbeddedServices {
    /// Validate a loaded manifest, then build the services from it
    pub fn new(manifest: BiasLensConfigManifest) -> Result<Self> {
        manifest
            .validate()
            .context("Configuration validation failed")?;

        Self::from_manifest(manifest)
    }

    pub fn from_manifest(manifest: BiasLensConfigManifest) -> Result<Self> {
        let config = &manifest.spec;

        let env = config.capture_environment();
        for warning in config.warnings(&env) {
            warn!("{}", warning);
        }

        let registry = Arc::new(
            ModelRegistry::from_config(config, env.clone())
                .context("Failed to initialize model registry")?,
        );
        let backend = Arc::new(HttpCompletionBackend::new(env));

        let mut orchestrator =
            QueryOrchestrator::new(registry, backend, config.query.timeout());
        if let Some(limit) = config.query.max_concurrent_queries {
            info!("Limiting concurrent model calls to {}", limit);
            orchestrator = orchestrator.with_concurrency_limit(limit);
        }

        let prompts = prompt_catalog::load_or_builtin(config.prompts_file.as_deref())
            .context("Failed to load bias prompt catalog")?;

        Ok(Self {
            manifest,
            orchestrator: Arc::new(orchestrator),
            prompts: Arc::new(prompts),
        })
    }

    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            orchestrator: self.orchestrator.clone(),
            prompts: self.prompts.clone(),
        })
    }
}
