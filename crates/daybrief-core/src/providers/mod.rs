//! Pluggable AI provider abstraction
//!
//! Backend-agnostic interface for summary generation against external AI
//! providers. Each client speaks one vendor API; failover across providers
//! lives in [`selector`].
//!
//! # Architecture
//!
//! - `ProviderBackend` trait: defines the uniform generate/availability contract
//! - `ProviderClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Client implementations: `OpenAiClient`, `GeminiClient`

mod gemini;
mod openai;
pub mod selector;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use selector::{ProviderSelector, ProviderStatus};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// External AI generation backend identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Vendor name used in human-readable reasons
    pub fn vendor_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenAi, ProviderKind::Gemini]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Caller's provider choice for one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderSelection {
    /// Try configured providers in priority order until one succeeds
    #[default]
    Auto,
    /// Use exactly one provider, no failover
    Only(ProviderKind),
}

impl ProviderSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderSelection::Auto => "auto",
            ProviderSelection::Only(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ProviderSelection::Auto),
            other => other.parse::<ProviderKind>().map(ProviderSelection::Only),
        }
    }
}

/// Outcome of one generation request, after selection and failover
///
/// Never an `Err`: provider trouble is data here, not an error. Only the
/// durable tier raises.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Success {
        summary: String,
        model: String,
        provider: ProviderKind,
    },
    Failure {
        reason: String,
    },
}

/// Trait defining the interface for all provider clients
///
/// Clients must be Send + Sync so a single instance can serve concurrent
/// requests from different owners.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// Which provider this client talks to
    fn kind(&self) -> ProviderKind;

    /// Model name the client is configured with
    fn model(&self) -> &str;

    /// Whether the provider is switched on in configuration
    fn is_enabled(&self) -> bool;

    /// Configuration-level availability: enabled with a credential present
    fn is_available(&self) -> bool;

    /// Why the client cannot be used, when it cannot
    fn unavailable_reason(&self) -> Option<String>;

    /// Generate summary text from a system prompt and a user message
    async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}

/// Concrete provider client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ProviderClient {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

#[async_trait]
impl ProviderBackend for ProviderClient {
    fn kind(&self) -> ProviderKind {
        match self {
            ProviderClient::OpenAi(c) => c.kind(),
            ProviderClient::Gemini(c) => c.kind(),
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderClient::OpenAi(c) => c.model(),
            ProviderClient::Gemini(c) => c.model(),
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            ProviderClient::OpenAi(c) => c.is_enabled(),
            ProviderClient::Gemini(c) => c.is_enabled(),
        }
    }

    fn is_available(&self) -> bool {
        match self {
            ProviderClient::OpenAi(c) => c.is_available(),
            ProviderClient::Gemini(c) => c.is_available(),
        }
    }

    fn unavailable_reason(&self) -> Option<String> {
        match self {
            ProviderClient::OpenAi(c) => c.unavailable_reason(),
            ProviderClient::Gemini(c) => c.unavailable_reason(),
        }
    }

    async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        match self {
            ProviderClient::OpenAi(c) => c.generate(system_prompt, user_message).await,
            ProviderClient::Gemini(c) => c.generate(system_prompt, user_message).await,
        }
    }
}
