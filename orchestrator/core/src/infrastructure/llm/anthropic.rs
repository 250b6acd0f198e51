// Anthropic LLM Provider Adapter
//
// Anti-Corruption Layer for the Anthropic messages API

use super::{map_body_error, map_send_error, map_status_error, MAX_COMPLETION_TOKENS};
use crate::domain::llm::AdapterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    pub async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<String, AdapterError> {
        let request = AnthropicRequest {
            model: &self.model,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature,
        };

        let url = format!("{}/messages", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.endpoint, timeout))?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await);
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| map_body_error(e, timeout))?;

        // Concatenate text blocks; an empty content list is an empty completion
        let text = anthropic_response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}
