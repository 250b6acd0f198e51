// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each provider adapter translates a single-turn completion request into its
// provider's wire call. `HttpCompletionBackend` is the one dispatch point
// from `ProviderKind` to adapter.

pub mod anthropic;
pub mod openai;
pub mod registry;

pub use registry::ModelRegistry;

use crate::domain::llm::{AdapterError, CompletionBackend};
use crate::domain::model::{EnvSnapshot, ModelDescriptor, ProviderKind};
use anthropic::AnthropicAdapter;
use async_trait::async_trait;
use openai::OpenAIAdapter;
use std::time::Duration;
use tracing::debug;

/// Upper bound on generated tokens for every provider
pub const MAX_COMPLETION_TOKENS: u32 = 500;

/// Production backend: real HTTP calls, credentials and endpoints taken
/// from the snapshot handed over at construction.
#[derive(Clone)]
pub struct HttpCompletionBackend {
    client: reqwest::Client,
    env: EnvSnapshot,
}

impl HttpCompletionBackend {
    pub fn new(env: EnvSnapshot) -> Self {
        Self::with_client(reqwest::Client::new(), env)
    }

    pub fn with_client(client: reqwest::Client, env: EnvSnapshot) -> Self {
        Self { client, env }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        descriptor: &ModelDescriptor,
        timeout: Duration,
    ) -> Result<String, AdapterError> {
        let api_key = descriptor.resolve_credential(&self.env).map(str::to_string);

        // Availability should have filtered this out already
        if descriptor.requires_credential && api_key.is_none() {
            return Err(missing_credential(descriptor));
        }

        let endpoint = descriptor.resolve_endpoint(&self.env).ok_or_else(|| {
            AdapterError::ConnectionFailed(format!(
                "no endpoint configured for model '{}'",
                descriptor.id
            ))
        })?;

        debug!(
            model_id = %descriptor.id,
            provider = %descriptor.provider,
            endpoint = %endpoint,
            "Dispatching completion"
        );

        match descriptor.provider {
            ProviderKind::OpenAi | ProviderKind::LocalOpenAiCompatible => {
                OpenAIAdapter::new(
                    self.client.clone(),
                    endpoint,
                    api_key,
                    descriptor.model_name.clone(),
                )
                .complete(prompt, temperature, timeout)
                .await
            }
            ProviderKind::Anthropic => {
                let api_key = api_key.ok_or_else(|| missing_credential(descriptor))?;
                AnthropicAdapter::new(
                    self.client.clone(),
                    endpoint,
                    api_key,
                    descriptor.model_name.clone(),
                )
                .complete(prompt, temperature, timeout)
                .await
            }
        }
    }
}

fn missing_credential(descriptor: &ModelDescriptor) -> AdapterError {
    AdapterError::AuthMissing(format!(
        "{} is not set for model '{}'",
        descriptor.credential_env.as_deref().unwrap_or("API key"),
        descriptor.id
    ))
}

/// Classify a transport-level failure
pub(crate) fn map_send_error(error: reqwest::Error, endpoint: &str, timeout: Duration) -> AdapterError {
    if error.is_timeout() {
        AdapterError::timed_out(timeout)
    } else if error.is_connect() {
        AdapterError::ConnectionFailed(format!(
            "model not running or endpoint unreachable ({}): {}",
            endpoint, error
        ))
    } else {
        AdapterError::ConnectionFailed(format!("request to {} failed: {}", endpoint, error))
    }
}

/// Classify a failure while reading or decoding a 2xx body. The request
/// timeout also covers the body, so a stalled body is a timeout.
pub(crate) fn map_body_error(error: reqwest::Error, timeout: Duration) -> AdapterError {
    if error.is_timeout() {
        AdapterError::timed_out(timeout)
    } else {
        AdapterError::Provider(format!("Failed to parse response: {}", error))
    }
}

/// Classify a non-2xx response, keeping the provider's own message
pub(crate) async fn map_status_error(response: reqwest::Response) -> AdapterError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("no error message")
            .to_string()
    });

    if status == 429 {
        AdapterError::RateLimited(message)
    } else if status == 401 || status == 403 {
        AdapterError::Provider(format!("authentication failed (HTTP {}): {}", status.as_u16(), message))
    } else {
        AdapterError::Provider(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

/// `{"error": {"message": ...}}` is shared by OpenAI-style and Anthropic
/// error bodies; anything else is passed through as text.
fn provider_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(message) = value
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .or_else(|| value.get("error").and_then(|m| m.as_str()))
            .or_else(|| value.get("message").and_then(|m| m.as_str()))
        {
            return Some(message.to_string());
        }
    }

    Some(trimmed.to_string())
}
