// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the configuration manifest for a BiasLens deployment:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Model catalog (descriptors with endpoint and credential references)
// - HTTP server, query timeout and concurrency settings
// - Observability settings
//
// This is the only place that reads the process environment. The core
// receives an `EnvSnapshot` captured here.

use crate::domain::model::{EndpointRef, EnvSnapshot, ModelDescriptor, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "100monkeys.ai/v1";
pub const KIND: &str = "BiasLensConfig";
pub const CONFIG_PATH_ENV: &str = "BIASLENS_CONFIG_PATH";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasLensConfigManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "BiasLensConfig")
    pub kind: String,

    /// Deployment metadata
    pub metadata: ManifestMetadata,

    /// Configuration specification
    pub spec: BiasLensConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Configuration specification (content under spec:)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasLensConfig {
    /// Model catalog, in listing order
    #[serde(default = "default_models")]
    pub models: Vec<ModelDescriptor>,

    /// Bias prompt catalog file (YAML or JSON); built-in prompts when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_file: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Static front-end directory served at `/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
            cors_origins: default_cors_origins(),
            frontend_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Hard per-model timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Process-wide ceiling on concurrent model calls (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_queries: Option<usize>,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_concurrent_queries: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus exposition
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:8000".to_string(),
    ]
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

/// Catalog used when the manifest does not list any models
pub fn default_models() -> Vec<ModelDescriptor> {
    let cloud = |id: &str, name: &str, provider: ProviderKind, model: &str, env_key: &str| ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        provider,
        model_name: model.to_string(),
        endpoint: None,
        requires_credential: true,
        credential_env: Some(env_key.to_string()),
    };
    let local = |id: &str, name: &str, model: &str, env: &str, default: &str| ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        provider: ProviderKind::LocalOpenAiCompatible,
        model_name: model.to_string(),
        endpoint: Some(EndpointRef::Env {
            env: env.to_string(),
            default: Some(default.to_string()),
        }),
        requires_credential: false,
        credential_env: None,
    };

    vec![
        cloud("gpt-4o-mini", "GPT-4o Mini", ProviderKind::OpenAi, "gpt-4o-mini", "OPENAI_API_KEY"),
        cloud("gpt-3.5-turbo", "GPT-3.5 Turbo", ProviderKind::OpenAi, "gpt-3.5-turbo", "OPENAI_API_KEY"),
        cloud(
            "claude-3-5-haiku",
            "Claude 3.5 Haiku",
            ProviderKind::Anthropic,
            "claude-3-5-haiku-latest",
            "ANTHROPIC_API_KEY",
        ),
        local("lm-studio", "LM Studio (local)", "local-model", "LM_STUDIO_ENDPOINT", "http://localhost:1234/v1"),
        local("ollama-llama3", "Ollama Llama 3.2 (local)", "llama3.2", "OLLAMA_ENDPOINT", "http://localhost:11434/v1"),
    ]
}

impl Default for BiasLensConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            prompts_file: None,
            server: ServerConfig::default(),
            query: QueryConfig::default(),
            observability: None,
        }
    }
}

impl BiasLensConfig {
    /// Capture every variable the catalog refers to
    pub fn capture_environment(&self) -> EnvSnapshot {
        self.capture_environment_with(|name| std::env::var(name).ok())
    }

    pub fn capture_environment_with<F>(&self, lookup: F) -> EnvSnapshot
    where
        F: Fn(&str) -> Option<String>,
    {
        let names: HashSet<&str> = self
            .models
            .iter()
            .flat_map(|m| m.referenced_env_vars())
            .collect();

        names
            .into_iter()
            .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
            .collect()
    }

    /// Human-readable problems that do not prevent start-up
    pub fn warnings(&self, env: &EnvSnapshot) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut reported = HashSet::new();

        for model in &self.models {
            if model.is_available(env) {
                continue;
            }
            if let Some(key) = &model.credential_env {
                if reported.insert(key.clone()) {
                    warnings.push(format!(
                        "{} not configured - {} models will be unavailable",
                        key, model.provider
                    ));
                }
            }
        }

        if self.models.is_empty() {
            warnings.push("Model catalog is empty - queries can only return unknown-model errors".to_string());
        }

        warnings
    }
}

impl Default for BiasLensConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "biaslens".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: BiasLensConfig::default(),
        }
    }
}

impl BiasLensConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. BIASLENS_CONFIG_PATH environment variable
    /// 2. ./biaslens-config.yaml (working directory)
    /// 3. ~/.biaslens/config.yaml (user home)
    /// 4. /etc/biaslens/config.yaml (system, Unix) or C:\ProgramData\BiasLens\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./biaslens-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".biaslens").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/biaslens/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\BiasLens\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path (fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using built-in defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QUERY_TIMEOUT_SECONDS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    tracing::info!("Environment override: QUERY_TIMEOUT_SECONDS={}", secs);
                    self.spec.query.timeout_seconds = secs;
                }
                _ => tracing::warn!(
                    "Invalid value for QUERY_TIMEOUT_SECONDS: '{}'. Expected a positive integer. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("MAX_CONCURRENT_QUERIES") {
            match val.trim().parse::<usize>() {
                Ok(0) => {
                    tracing::info!("Environment override: MAX_CONCURRENT_QUERIES=0 (unbounded)");
                    self.spec.query.max_concurrent_queries = None;
                }
                Ok(limit) => {
                    tracing::info!("Environment override: MAX_CONCURRENT_QUERIES={}", limit);
                    self.spec.query.max_concurrent_queries = Some(limit);
                }
                Err(_) => tracing::warn!(
                    "Invalid value for MAX_CONCURRENT_QUERIES: '{}'. Expected an integer. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("BACKEND_PORT") {
            match val.trim().parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: BACKEND_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for BACKEND_PORT: '{}'. Expected a port number. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("CORS_ORIGINS") {
            let origins = parse_origin_list(&val);
            if origins.is_empty() {
                tracing::warn!("Empty CORS_ORIGINS override ignored");
            } else {
                tracing::info!("Environment override: CORS_ORIGINS ({} origins)", origins.len());
                self.spec.server.cors_origins = origins;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let mut ids = HashSet::new();
        for model in &self.spec.models {
            if model.id.is_empty() {
                anyhow::bail!("Model id cannot be empty");
            }

            if !ids.insert(model.id.as_str()) {
                anyhow::bail!("Duplicate model id: {}", model.id);
            }

            if model.name.is_empty() {
                anyhow::bail!("Model name cannot be empty for: {}", model.id);
            }

            if model.model_name.is_empty() {
                anyhow::bail!("Model identifier (model_name) cannot be empty for: {}", model.id);
            }

            if model.requires_credential && model.credential_env.is_none() {
                anyhow::bail!("Model '{}' requires an API key but has no env_key", model.id);
            }

            if model.provider.is_local() && model.endpoint.is_none() {
                anyhow::bail!("Local model '{}' must declare an endpoint", model.id);
            }
        }

        if self.spec.query.timeout_seconds == 0 {
            anyhow::bail!("query.timeout_seconds must be greater than zero");
        }

        if self.spec.query.max_concurrent_queries == Some(0) {
            anyhow::bail!("query.max_concurrent_queries must be greater than zero when set");
        }

        Ok(())
    }
}

/// Accepts either a JSON array or a comma-separated list
fn parse_origin_list(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list.into_iter().filter(|o| !o.trim().is_empty()).collect();
    }

    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
