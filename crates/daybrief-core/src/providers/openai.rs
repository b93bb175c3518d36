//! OpenAI provider client
//!
//! Talks to the OpenAI chat completions API. The persona prompt rides in the
//! system message; the rendered metrics ride in the user message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ProviderSettings;
use crate::error::{Error, Result};

use super::{ProviderBackend, ProviderKind};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI chat completions API
///
/// Holds a shared reqwest client built once at construction; clones reuse
/// the same connection pool, so the client is cheap to share across
/// concurrent requests.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    enabled: bool,
}

impl OpenAiClient {
    /// Create a new client from provider settings
    pub fn new(settings: &ProviderSettings) -> Self {
        let base_url = settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            http_client: Client::new(),
            base_url,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout,
            enabled: settings.enabled,
        }
    }
}

#[async_trait]
impl ProviderBackend for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_available(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }

    fn unavailable_reason(&self) -> Option<String> {
        if !self.enabled {
            return Some("OpenAI provider is disabled".to_string());
        }
        if self.api_key.is_none() {
            return Some("OpenAI API key is not configured".to_string());
        }
        None
    }

    async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(self.timeout)
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "OpenAI request failed: {}", body);
            return Err(Error::InvalidData(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("Unexpected OpenAI response format".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
