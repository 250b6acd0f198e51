// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Model descriptors
//!
//! Static records describing every model the service can query, plus the
//! environment snapshot used to decide whether a model is currently usable.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Descriptor, provider family and availability predicate

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend family a model is served by.
///
/// The set is closed: adding a provider means adding a variant here and a
/// dispatch arm in `infrastructure::llm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// OpenAI chat-completions API (cloud)
    #[serde(rename = "openai")]
    OpenAi,

    /// Anthropic messages API (cloud)
    #[serde(rename = "anthropic")]
    Anthropic,

    /// OpenAI-compatible server running locally (LM Studio, Ollama, vLLM)
    #[serde(
        rename = "local-openai-compatible",
        alias = "lm-studio",
        alias = "ollama",
        alias = "local"
    )]
    LocalOpenAiCompatible,
}

impl ProviderKind {
    /// Wire name used in configuration files and API listings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::LocalOpenAiCompatible => "local-openai-compatible",
        }
    }

    /// Endpoint used when a descriptor does not name one.
    /// Local servers have no sensible default.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Anthropic => Some("https://api.anthropic.com/v1"),
            Self::LocalOpenAiCompatible => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalOpenAiCompatible)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a model's endpoint URL comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    /// Literal URL from the catalog
    Fixed { url: String },

    /// Named environment variable, with an optional fallback URL
    Env {
        env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

/// A queryable model, immutable after the catalog is loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique identifier used in query requests
    pub id: String,

    /// Display name
    pub name: String,

    /// Backend family
    pub provider: ProviderKind,

    /// Identifier sent to the backend (e.g. "gpt-4o-mini")
    pub model_name: String,

    /// Endpoint reference; `None` uses the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointRef>,

    /// Whether a credential must be present for the model to be usable
    #[serde(default, rename = "requires_api_key", alias = "requires_credential")]
    pub requires_credential: bool,

    /// Environment variable holding the credential
    #[serde(
        default,
        rename = "env_key",
        alias = "credential_env",
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_env: Option<String>,
}

impl ModelDescriptor {
    /// Credential for this model, if one is configured and non-empty
    pub fn resolve_credential<'a>(&self, env: &'a EnvSnapshot) -> Option<&'a str> {
        self.credential_env.as_deref().and_then(|name| env.get(name))
    }

    /// Endpoint URL for this model.
    ///
    /// Order: fixed URL, named variable, the reference's own default, then
    /// the provider default.
    pub fn resolve_endpoint(&self, env: &EnvSnapshot) -> Option<String> {
        let configured = match &self.endpoint {
            Some(EndpointRef::Fixed { url }) => Some(url.clone()),
            Some(EndpointRef::Env { env: name, default }) => env
                .get(name)
                .map(str::to_string)
                .or_else(|| default.clone()),
            None => None,
        };

        configured.or_else(|| self.provider.default_endpoint().map(str::to_string))
    }

    /// Availability predicate: no credential needed, or the named
    /// credential is present and non-empty.
    ///
    /// Local endpoints are not probed here; an unreachable server shows up
    /// as `ConnectionFailed` at query time.
    pub fn is_available(&self, env: &EnvSnapshot) -> bool {
        !self.requires_credential || self.resolve_credential(env).is_some()
    }

    /// Names of every environment variable this descriptor refers to
    pub fn referenced_env_vars(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(name) = &self.credential_env {
            names.push(name.as_str());
        }
        if let Some(EndpointRef::Env { env, .. }) = &self.endpoint {
            names.push(env.as_str());
        }
        names
    }
}

/// Catalog entry as presented by the listing interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelListing {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    pub model_name: String,
    pub requires_api_key: bool,
    pub available: bool,
}

impl ModelListing {
    pub fn from_descriptor(descriptor: &ModelDescriptor, env: &EnvSnapshot) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            provider: descriptor.provider,
            model_name: descriptor.model_name.clone(),
            requires_api_key: descriptor.requires_credential,
            available: descriptor.is_available(env),
        }
    }
}

/// Immutable view of the credential and endpoint variables, captured once
/// by the configuration layer. The core never reads the process
/// environment itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and embedding
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Value of `name`, treating blank values as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Registry lookup and construction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown model")]
    UnknownModel(String),

    #[error("duplicate model id in catalog: {0}")]
    DuplicateModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: "GPT-4o Mini".to_string(),
            provider: ProviderKind::OpenAi,
            model_name: "gpt-4o-mini".to_string(),
            endpoint: None,
            requires_credential: true,
            credential_env: Some("OPENAI_API_KEY".to_string()),
        }
    }

    fn local(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: "LM Studio".to_string(),
            provider: ProviderKind::LocalOpenAiCompatible,
            model_name: "local-model".to_string(),
            endpoint: Some(EndpointRef::Env {
                env: "LM_STUDIO_ENDPOINT".to_string(),
                default: Some("http://localhost:1234/v1".to_string()),
            }),
            requires_credential: false,
            credential_env: None,
        }
    }

    #[test]
    fn test_availability_requires_non_empty_credential() {
        let model = cloud("gpt-4o-mini");

        assert!(!model.is_available(&EnvSnapshot::new()));
        assert!(!model.is_available(&EnvSnapshot::new().with("OPENAI_API_KEY", "  ")));
        assert!(model.is_available(&EnvSnapshot::new().with("OPENAI_API_KEY", "sk-test")));
    }

    #[test]
    fn test_local_models_are_available_without_endpoint_variable() {
        let model = local("lm-studio");
        assert!(model.is_available(&EnvSnapshot::new()));
    }

    #[test]
    fn test_endpoint_resolution_order() {
        let model = local("lm-studio");
        assert_eq!(
            model.resolve_endpoint(&EnvSnapshot::new()).as_deref(),
            Some("http://localhost:1234/v1")
        );
        assert_eq!(
            model
                .resolve_endpoint(&EnvSnapshot::new().with("LM_STUDIO_ENDPOINT", "http://gpu:9000/v1"))
                .as_deref(),
            Some("http://gpu:9000/v1")
        );

        let openai = cloud("gpt-4o-mini");
        assert_eq!(
            openai.resolve_endpoint(&EnvSnapshot::new()).as_deref(),
            Some("https://api.openai.com/v1")
        );

        let mut bare_local = local("bare");
        bare_local.endpoint = None;
        assert_eq!(bare_local.resolve_endpoint(&EnvSnapshot::new()), None);
    }

    #[test]
    fn test_provider_aliases_deserialize() {
        let yaml = r#"
id: ollama-llama
name: Ollama Llama 3
provider: ollama
model_name: llama3
endpoint:
  env: OLLAMA_ENDPOINT
  default: http://localhost:11434/v1
"#;
        let model: ModelDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(model.provider, ProviderKind::LocalOpenAiCompatible);
        assert!(!model.requires_credential);
        assert_eq!(model.referenced_env_vars(), vec!["OLLAMA_ENDPOINT"]);
    }

    #[test]
    fn test_fixed_endpoint_deserializes() {
        let yaml = r#"
id: claude-haiku
name: Claude Haiku
provider: anthropic
model_name: claude-3-5-haiku-latest
endpoint:
  url: https://proxy.internal/anthropic/v1
requires_api_key: true
env_key: ANTHROPIC_API_KEY
"#;
        let model: ModelDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            model.endpoint,
            Some(EndpointRef::Fixed {
                url: "https://proxy.internal/anthropic/v1".to_string()
            })
        );
        assert_eq!(model.credential_env.as_deref(), Some("ANTHROPIC_API_KEY"));
    }
}
