//! Provider selection and failover
//!
//! Resolves a selection (explicit provider or automatic) against the
//! configured priority order and walks the matching clients until one
//! produces a summary. Provider trouble never escapes as an error: every
//! failure path folds into `GenerationResult::Failure` with a reason a
//! caller can persist and show.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::metrics::TaskMetrics;
use crate::personas::Persona;

use super::{
    GeminiClient, GenerationResult, OpenAiClient, ProviderBackend, ProviderClient, ProviderKind,
    ProviderSelection,
};

/// Availability snapshot for one configured provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub model: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Orders provider clients by configured priority and fails over between them
pub struct ProviderSelector {
    clients: Vec<ProviderClient>,
}

impl ProviderSelector {
    /// Build one client per provider named in the priority order
    ///
    /// Clients are constructed eagerly, including for disabled providers, so
    /// that status reporting can describe every configured provider.
    pub fn from_config(config: &AiConfig) -> Self {
        let clients = config
            .priority
            .iter()
            .map(|kind| match kind {
                ProviderKind::OpenAi => ProviderClient::OpenAi(OpenAiClient::new(&config.openai)),
                ProviderKind::Gemini => ProviderClient::Gemini(GeminiClient::new(&config.gemini)),
            })
            .collect();

        Self { clients }
    }

    /// Clients matching the selection, in priority order
    fn candidates(&self, selection: &ProviderSelection) -> Vec<&ProviderClient> {
        match selection {
            ProviderSelection::Auto => self.clients.iter().collect(),
            ProviderSelection::Only(kind) => self
                .clients
                .iter()
                .filter(|client| client.kind() == *kind)
                .collect(),
        }
    }

    /// Whether any client matching the selection can take a request
    pub fn is_provider_available(&self, selection: &ProviderSelection) -> bool {
        self.candidates(selection)
            .iter()
            .any(|client| client.is_available())
    }

    /// Whether any configured provider at all can take a request
    pub fn is_any_provider_available(&self) -> bool {
        self.is_provider_available(&ProviderSelection::Auto)
    }

    /// Human-readable reason why no client matching the selection is usable
    ///
    /// Collapses to a single message when every candidate is switched off;
    /// otherwise joins the per-provider reasons.
    pub fn unavailable_reason(&self, selection: &ProviderSelection) -> String {
        let candidates = self.candidates(selection);

        if candidates.is_empty() {
            return match selection {
                ProviderSelection::Only(kind) => {
                    format!("{} provider is not configured", kind.vendor_name())
                }
                ProviderSelection::Auto => "All AI providers are disabled".to_string(),
            };
        }

        if candidates.iter().all(|client| !client.is_enabled()) {
            return "All AI providers are disabled".to_string();
        }

        let reasons: Vec<String> = candidates
            .iter()
            .filter_map(|client| client.unavailable_reason())
            .collect();

        if reasons.is_empty() {
            "AI service encountered an error".to_string()
        } else {
            reasons.join("; ")
        }
    }

    /// Generate a summary, failing over through the selected providers
    ///
    /// Attempts each available candidate in priority order and returns on the
    /// first success. Errors from individual providers are logged and
    /// swallowed; when every attempt fails the result is a `Failure` whose
    /// reason does not expose provider internals.
    pub async fn generate_summary(
        &self,
        metrics: &TaskMetrics,
        persona: Persona,
        selection: &ProviderSelection,
    ) -> GenerationResult {
        let candidates = self.candidates(selection);

        if !candidates.iter().any(|client| client.is_available()) {
            return GenerationResult::Failure {
                reason: self.unavailable_reason(selection),
            };
        }

        let system_prompt = persona.prompt();
        let user_message = metrics.prompt_message();

        for client in candidates {
            if !client.is_available() {
                debug!(provider = %client.kind(), "Skipping unavailable provider");
                continue;
            }

            debug!(
                provider = %client.kind(),
                model = client.model(),
                "Requesting summary"
            );

            match client.generate(system_prompt, &user_message).await {
                Ok(summary) => {
                    return GenerationResult::Success {
                        summary,
                        model: client.model().to_string(),
                        provider: client.kind(),
                    };
                }
                Err(err) => {
                    warn!(provider = %client.kind(), "Summary generation failed: {}", err);
                }
            }
        }

        GenerationResult::Failure {
            reason: "AI service encountered an error".to_string(),
        }
    }

    /// Availability snapshot for every configured provider, in priority order
    pub fn provider_info(&self) -> Vec<ProviderStatus> {
        self.clients
            .iter()
            .map(|client| ProviderStatus {
                provider: client.kind(),
                model: client.model().to_string(),
                available: client.is_available(),
                reason: client.unavailable_reason(),
            })
            .collect()
    }
}
