//! Gemini provider client
//!
//! Talks to the Google Generative Language API. Unlike OpenAI, Gemini takes
//! the system prompt as a dedicated `systemInstruction` block and the API key
//! in an `x-goog-api-key` header rather than a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ProviderSettings;
use crate::error::{Error, Result};

use super::{ProviderBackend, ProviderKind};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini generateContent API
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    enabled: bool,
}

impl GeminiClient {
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
impl ProviderBackend for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
            return Some("Gemini provider is disabled".to_string());
        }
        if self.api_key.is_none() {
            return Some("Gemini API key is not configured".to_string());
        }
        None
    }

    async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let request = GenerateContentRequest {
            system_instruction: InstructionContent {
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: user_message.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: self.temperature,
            },
        };

        let mut req_builder = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .timeout(self.timeout)
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("x-goog-api-key", api_key);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini request failed: {}", body);
            return Err(Error::InvalidData(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let content_response: GenerateContentResponse = response.json().await?;

        let text = content_response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::InvalidData(
                "Unexpected Gemini response format".into(),
            ));
        }

        Ok(text)
    }
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: InstructionContent,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// System instruction block
#[derive(Debug, Serialize)]
struct InstructionContent {
    parts: Vec<Part>,
}

/// Conversation turn
#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

/// Text fragment
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// Generation parameters
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

/// Candidate content
#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
