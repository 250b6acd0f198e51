// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Model Registry - Catalog Lookup and Availability
//
// Holds the static model catalog and the environment snapshot. Availability
// is derived on every call, never stored.

use crate::domain::app_config::BiasLensConfig;
use crate::domain::model::{EnvSnapshot, ModelDescriptor, ModelListing, RegistryError};
use std::collections::HashMap;
use tracing::{info, warn};

/// Registry of queryable models, in catalog order
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
    env: EnvSnapshot,
}

impl ModelRegistry {
    /// Build a registry from descriptors; duplicate ids are rejected
    pub fn new(models: Vec<ModelDescriptor>, env: EnvSnapshot) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(models.len());
        for (position, model) in models.iter().enumerate() {
            if index.insert(model.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateModel(model.id.clone()));
            }
        }

        Ok(Self { models, index, env })
    }

    /// Create registry from service configuration
    pub fn from_config(config: &BiasLensConfig, env: EnvSnapshot) -> anyhow::Result<Self> {
        info!("Initializing model registry");

        let registry = Self::new(config.models.clone(), env)?;

        for model in &registry.models {
            if model.is_available(&registry.env) {
                info!("Model '{}' -> {} ({})", model.id, model.model_name, model.provider);
            } else {
                warn!(
                    "Model '{}' unavailable: {} not set",
                    model.id,
                    model.credential_env.as_deref().unwrap_or("credential")
                );
            }
        }

        if registry.available_count() == 0 {
            warn!("No models available - set provider API keys or configure local endpoints");
        }

        Ok(registry)
    }

    /// Every catalog entry with its current availability
    pub fn list(&self) -> Vec<ModelListing> {
        self.models
            .iter()
            .map(|m| ModelListing::from_descriptor(m, &self.env))
            .collect()
    }

    pub fn resolve(&self, id: &str) -> Result<&ModelDescriptor, RegistryError> {
        self.index
            .get(id)
            .map(|&position| &self.models[position])
            .ok_or_else(|| RegistryError::UnknownModel(id.to_string()))
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.resolve(id)
            .map(|m| m.is_available(&self.env))
            .unwrap_or(false)
    }

    pub fn available_count(&self) -> usize {
        self.models.iter().filter(|m| m.is_available(&self.env)).count()
    }

    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::app_config::default_models;

    #[test]
    fn test_registry_creation() {
        let env = EnvSnapshot::new().with("OPENAI_API_KEY", "sk-test");
        let registry = ModelRegistry::new(default_models(), env).unwrap();

        assert_eq!(registry.len(), 5);
        assert!(registry.resolve("gpt-4o-mini").is_ok());
        assert_eq!(
            registry.resolve("nope").unwrap_err(),
            RegistryError::UnknownModel("nope".to_string())
        );
    }

    #[test]
    fn test_listing_preserves_catalog_order_and_availability() {
        let env = EnvSnapshot::new().with("OPENAI_API_KEY", "sk-test");
        let registry = ModelRegistry::new(default_models(), env).unwrap();

        let listing = registry.list();
        let ids: Vec<&str> = listing.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["gpt-4o-mini", "gpt-3.5-turbo", "claude-3-5-haiku", "lm-studio", "ollama-llama3"]
        );

        let available: Vec<bool> = listing.iter().map(|m| m.available).collect();
        assert_eq!(available, vec![true, true, false, true, true]);
        assert_eq!(registry.available_count(), 4);
        assert!(!registry.is_available("claude-3-5-haiku"));
        assert!(!registry.is_available("unknown"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut models = default_models();
        models.push(models[0].clone());

        let err = ModelRegistry::new(models, EnvSnapshot::new()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateModel("gpt-4o-mini".to_string()));
    }
}
