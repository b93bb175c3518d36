//! Provider configuration loading
//!
//! Config is loaded with a two-layer resolution:
//! 1. An override file passed by the caller, when it exists
//! 2. Embedded defaults (compiled into the binary)
//!
//! API keys never live in the embedded defaults; they come from the override
//! file or from the environment (`OPENAI_API_KEY`, `GEMINI_API_KEY`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::providers::ProviderKind;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/providers.toml");

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Settings for one provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Whether this provider may be used at all
    pub enabled: bool,
    /// Credential sent with every request; None leaves the provider unavailable
    pub api_key: Option<String>,
    /// Model requested from the provider
    pub model: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
    /// API endpoint override; tests point this at a local mock
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Stock OpenAI settings, without a credential
    pub fn openai_defaults() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "gpt-4.1-nano".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            base_url: None,
        }
    }

    /// Stock Gemini settings, without a credential
    pub fn gemini_defaults() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            base_url: None,
        }
    }
}

/// Full provider configuration consumed by the selector
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Order in which automatic selection tries providers
    pub priority: Vec<ProviderKind>,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl AiConfig {
    /// Load configuration (override file first, then embedded defaults)
    ///
    /// Missing API keys are filled from the environment after parsing.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = if let Some(path) = override_path {
            if path.exists() {
                fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            } else {
                DEFAULT_CONFIG.to_string()
            }
        } else {
            DEFAULT_CONFIG.to_string()
        };

        let mut config = parse_config(&content)?;
        config.fill_env_keys();
        Ok(config)
    }

    /// Settings for one provider kind
    pub fn provider(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    /// Fill missing API keys from the environment
    fn fill_env_keys(&mut self) {
        if self.openai.api_key.is_none() {
            self.openai.api_key = env_key(OPENAI_API_KEY_ENV);
        }
        if self.gemini.api_key.is_none() {
            self.gemini.api_key = env_key(GEMINI_API_KEY_ENV);
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            priority: vec![ProviderKind::OpenAi, ProviderKind::Gemini],
            openai: ProviderSettings::openai_defaults(),
            gemini: ProviderSettings::gemini_defaults(),
        }
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    priority: Option<Vec<String>>,
    openai: Option<RawProvider>,
    gemini: Option<RawProvider>,
}

#[derive(Debug, Deserialize)]
struct RawProvider {
    enabled: Option<bool>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_seconds: Option<u64>,
    base_url: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AiConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AiConfig::default();

    if let Some(priority) = raw.priority {
        let mut order = Vec::with_capacity(priority.len());
        for name in priority {
            let kind = name.parse::<ProviderKind>().map_err(Error::Config)?;
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
        config.priority = order;
    }

    if let Some(raw_openai) = raw.openai {
        apply_provider(&mut config.openai, raw_openai);
    }
    if let Some(raw_gemini) = raw.gemini {
        apply_provider(&mut config.gemini, raw_gemini);
    }

    Ok(config)
}

fn apply_provider(settings: &mut ProviderSettings, raw: RawProvider) {
    if let Some(enabled) = raw.enabled {
        settings.enabled = enabled;
    }
    if raw.api_key.is_some() {
        settings.api_key = raw.api_key;
    }
    if let Some(model) = raw.model {
        settings.model = model;
    }
    if let Some(max_tokens) = raw.max_tokens {
        settings.max_tokens = max_tokens;
    }
    if let Some(temperature) = raw.temperature {
        settings.temperature = temperature;
    }
    if let Some(timeout) = raw.timeout_seconds {
        settings.timeout = Duration::from_secs(timeout);
    }
    if raw.base_url.is_some() {
        settings.base_url = raw.base_url;
    }
}
