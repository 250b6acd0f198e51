// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Completion backend interface and adapter error taxonomy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Seam between the orchestrator and provider wire calls

// Completion Backend Domain Interface (Anti-Corruption Layer)
//
// The orchestrator only sees this trait. The production implementation
// dispatches on `ProviderKind` in infrastructure/llm/; tests inject scripted
// backends.

use crate::domain::model::ModelDescriptor;
use async_trait::async_trait;
use std::time::Duration;

/// Single-attempt completion against one model
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `prompt` as a single user turn and return the completion text.
    ///
    /// Empty text is a valid success. Implementations must not retry and
    /// should give up once `timeout` has elapsed.
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        descriptor: &ModelDescriptor,
        timeout: Duration,
    ) -> Result<String, AdapterError>;
}

/// Errors surfaced by a provider adapter. Each carries the provider's
/// message for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("Authentication missing: {0}")]
    AuthMissing(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl AdapterError {
    /// Timeout after the caller's bound elapsed, in whole seconds
    pub fn timed_out(timeout: Duration) -> Self {
        Self::Timeout(format!("model took longer than {} seconds", timeout.as_secs()))
    }

    /// Short label, used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthMissing(_) => "auth_missing",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::Timeout(_) => "timeout",
            Self::RateLimited(_) => "rate_limited",
            Self::Provider(_) => "provider_error",
        }
    }
}
