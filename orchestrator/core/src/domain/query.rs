// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Query and comparison result types
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Request validation and the per-model / aggregate result shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PROMPT_CHARS: usize = 5000;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fan-out request: one prompt, an ordered list of model ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
    pub models: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>, models: Vec<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            models,
            temperature,
        }
    }

    /// Structural validation. The only whole-request failure mode.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.prompt.trim().is_empty() {
            return Err(QueryError::InvalidRequest("prompt must not be empty".into()));
        }

        let chars = self.prompt.chars().count();
        if chars > MAX_PROMPT_CHARS {
            return Err(QueryError::InvalidRequest(format!(
                "prompt is {} characters, maximum is {}",
                chars, MAX_PROMPT_CHARS
            )));
        }

        if self.models.is_empty() {
            return Err(QueryError::InvalidRequest(
                "at least one model must be specified".into(),
            ));
        }

        if !self.temperature.is_finite()
            || self.temperature < MIN_TEMPERATURE
            || self.temperature > MAX_TEMPERATURE
        {
            return Err(QueryError::InvalidRequest(format!(
                "temperature {} is outside [{}, {}]",
                self.temperature, MIN_TEMPERATURE, MAX_TEMPERATURE
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Outcome of querying one model.
///
/// Exactly one of `response` / `error` is set; the constructors are the only
/// way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResult {
    model_id: String,
    model_name: String,
    response: Option<String>,
    latency_ms: u64,
    error: Option<String>,
}

impl ModelResult {
    pub fn success(
        model_id: impl Into<String>,
        model_name: impl Into<String>,
        response: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            response: Some(response.into()),
            latency_ms,
            error: None,
        }
    }

    pub fn failure(
        model_id: impl Into<String>,
        model_name: impl Into<String>,
        error: impl Into<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            response: None,
            latency_ms,
            error: Some(error.into()),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

/// Aggregate returned to the caller: one entry per requested model, in
/// request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    prompt: String,
    timestamp: DateTime<Utc>,
    responses: Vec<ModelResult>,
}

impl ComparisonResult {
    pub fn new(prompt: impl Into<String>, timestamp: DateTime<Utc>, responses: Vec<ModelResult>) -> Self {
        Self {
            prompt: prompt.into(),
            timestamp,
            responses,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn responses(&self) -> &[ModelResult] {
        &self.responses
    }

    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str, models: &[&str], temperature: f32) -> QueryRequest {
        QueryRequest::new(
            prompt,
            models.iter().map(|m| m.to_string()).collect(),
            temperature,
        )
    }

    #[test]
    fn test_valid_request() {
        assert!(request("The doctor said", &["m1"], 0.7).validate().is_ok());
        assert!(request("x", &["m1"], 0.0).validate().is_ok());
        assert!(request("x", &["m1"], 2.0).validate().is_ok());
    }

    #[test]
    fn test_invalid_requests() {
        assert!(request("", &["m1"], 0.7).validate().is_err());
        assert!(request("   \n", &["m1"], 0.7).validate().is_err());
        assert!(request("x", &[], 0.7).validate().is_err());
        assert!(request("x", &["m1"], -0.1).validate().is_err());
        assert!(request("x", &["m1"], 2.01).validate().is_err());
        assert!(request("x", &["m1"], f32::NAN).validate().is_err());

        let long = "a".repeat(MAX_PROMPT_CHARS + 1);
        assert!(request(&long, &["m1"], 0.7).validate().is_err());
    }

    #[test]
    fn test_temperature_defaults_on_the_wire() {
        let parsed: QueryRequest =
            serde_json::from_str(r#"{"prompt": "hi", "models": ["m1"]}"#).unwrap();
        assert_eq!(parsed.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_model_result_serializes_nulls() {
        let ok = ModelResult::success("m1", "Model One", "", 12);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["response"], "");
        assert!(json["error"].is_null());

        let failed = ModelResult::failure("m2", "Model Two", "Connection failed", 3);
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json["response"].is_null());
        assert_eq!(json["error"], "Connection failed");
        assert_eq!(json["latency_ms"], 3);
    }
}
