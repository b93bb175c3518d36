//! Insight orchestration
//!
//! The orchestrator fronts the whole subsystem: it answers requests from the
//! cache when the cached persona matches, regenerates through the provider
//! selector when it does not, and persists every result it produces,
//! AI-generated and fallback alike.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::InsightCache;
use crate::config::AiConfig;
use crate::db::Database;
use crate::error::Result;
use crate::insight::{Insight, OwnerId};
use crate::metrics::MetricsProvider;
use crate::personas::{Persona, PersonaInfo};
use crate::providers::{GenerationResult, ProviderSelection, ProviderSelector, ProviderStatus};

/// Entry point for insight requests
///
/// Provider trouble never surfaces from here; callers always get an insight
/// back, AI-generated when possible and a fallback otherwise. Only cache and
/// metrics failures escape as errors.
pub struct InsightOrchestrator {
    metrics: Arc<dyn MetricsProvider>,
    selector: ProviderSelector,
    cache: InsightCache,
}

impl InsightOrchestrator {
    pub fn new(config: &AiConfig, db: Database, metrics: Arc<dyn MetricsProvider>) -> Self {
        let selector = ProviderSelector::from_config(config);
        let cache = InsightCache::new(db, Arc::clone(&metrics));

        Self {
            metrics,
            selector,
            cache,
        }
    }

    /// Get the insight for an owner, generating one if needed
    ///
    /// A cached insight is returned as-is when its persona matches the
    /// request. Anything else, including a cached insight for a different
    /// persona, triggers generation, and the result overwrites whatever was
    /// cached for the owner.
    pub async fn get_insight(&self, owner: &OwnerId, persona: Persona) -> Result<Insight> {
        self.get_insight_from(owner, persona, &ProviderSelection::Auto)
            .await
    }

    /// Get the insight for an owner with an explicit provider selection
    pub async fn get_insight_from(
        &self,
        owner: &OwnerId,
        persona: Persona,
        selection: &ProviderSelection,
    ) -> Result<Insight> {
        if let Some(cached) = self.cache.get_cached_insight(owner)? {
            if cached.persona == persona {
                debug!(%owner, persona = %persona, "Serving cached insight");
                return Ok(cached);
            }
            debug!(
                %owner,
                cached = %cached.persona,
                requested = %persona,
                "Cached persona differs, regenerating"
            );
        }

        self.generate_new_insight(owner, persona, selection).await
    }

    /// Generate a fresh insight and persist it, ignoring any cached one
    pub async fn generate_new_insight(
        &self,
        owner: &OwnerId,
        persona: Persona,
        selection: &ProviderSelection,
    ) -> Result<Insight> {
        let metrics = self.metrics.snapshot(owner)?;
        let date = metrics.date;

        let insight = match self
            .selector
            .generate_summary(&metrics, persona, selection)
            .await
        {
            GenerationResult::Success {
                summary,
                model,
                provider,
            } => {
                info!(%owner, persona = %persona, provider = %provider, "Insight generated");
                Insight::generated(date, persona, summary, model, provider, metrics)
            }
            GenerationResult::Failure { reason } => {
                info!(%owner, persona = %persona, reason = %reason, "Serving fallback insight");
                Insight::fallback(date, persona, reason, metrics)
            }
        };

        self.cache.save_insight(owner, &insight)?;

        Ok(insight)
    }

    /// Cached insight for an owner, never triggering generation
    pub fn get_cached_insight(&self, owner: &OwnerId) -> Result<Option<Insight>> {
        self.cache.get_cached_insight(owner)
    }

    /// Drop the cached insight for an owner from both tiers
    ///
    /// Callers must invoke this whenever the owner's underlying task data
    /// changes; a persona-matched cache hit serves stale content until then.
    pub fn invalidate_insight_cache(&self, owner: &OwnerId) -> Result<bool> {
        self.cache.invalidate(owner)
    }

    /// All personas an insight can be requested for
    pub fn available_personas(&self) -> Vec<PersonaInfo> {
        Persona::catalog()
    }

    /// Whether at least one configured provider can take requests
    pub fn is_ai_available(&self) -> bool {
        self.selector.is_any_provider_available()
    }

    /// Availability snapshot for every configured provider
    pub fn provider_info(&self) -> Vec<ProviderStatus> {
        self.selector.provider_info()
    }
}
