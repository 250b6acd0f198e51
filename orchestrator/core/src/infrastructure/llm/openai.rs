// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat-completions API.
// Also serves OpenAI-compatible local servers (LM Studio, Ollama /v1, vLLM),
// which simply omit the credential.

use super::{map_body_error, map_send_error, map_status_error, MAX_COMPLETION_TOKENS};
use crate::domain::llm::AdapterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    // Null when the model produced no text
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIAdapter {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>, model: String) -> Self {
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
        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let mut builder = self
            .client
            .post(&url)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.endpoint, timeout))?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await);
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| map_body_error(e, timeout))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::Provider("No response from model".into()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
