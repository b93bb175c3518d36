//! Daybrief Core Library
//!
//! Insight orchestration for the Daybrief todo companion:
//! - Persona catalog with generation prompts compiled in
//! - Provider clients for OpenAI and Gemini with priority failover
//! - Two-tier insight cache over SQLite with an in-memory front
//! - Orchestrator tying metrics, providers, and cache together

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod orchestrator;
pub mod personas;
pub mod providers;

/// Test utilities including the mock provider server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::InsightCache;
pub use config::{AiConfig, ProviderSettings, GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV};
pub use db::{Database, InsightRecord, StoredInsight};
pub use error::{Error, Result};
pub use insight::{Insight, InsightBody, OwnerId};
pub use metrics::{MetricsProvider, TaskMetrics};
pub use orchestrator::InsightOrchestrator;
pub use personas::{Persona, PersonaInfo};
pub use providers::{
    GeminiClient, GenerationResult, OpenAiClient, ProviderBackend, ProviderClient, ProviderKind,
    ProviderSelection, ProviderSelector, ProviderStatus,
};
