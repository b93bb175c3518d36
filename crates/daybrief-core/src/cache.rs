//! Two-tier insight cache
//!
//! A moka in-memory tier sits in front of the durable insights table. Reads
//! check memory first and promote durable hits; writes go through to both
//! tiers. Nothing here expires on its own: entries leave the cache only by
//! being overwritten or explicitly invalidated.

use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::db::{Database, InsightRecord, StoredInsight};
use crate::error::{Error, Result};
use crate::insight::{Insight, InsightBody, OwnerId};
use crate::metrics::{MetricsProvider, TaskMetrics};

/// Upper bound on in-memory entries
const MEMORY_CAPACITY: u64 = 10_000;

/// Caches one insight per owner across a memory tier and a durable tier
///
/// The durable tier is the source of truth; the memory tier only ever holds
/// what was read from or written through to it.
pub struct InsightCache {
    db: Database,
    memory: Cache<OwnerId, Insight>,
    metrics: Arc<dyn MetricsProvider>,
}

impl InsightCache {
    pub fn new(db: Database, metrics: Arc<dyn MetricsProvider>) -> Self {
        Self {
            db,
            memory: Cache::new(MEMORY_CAPACITY),
            metrics,
        }
    }

    /// Look up the cached insight for an owner
    ///
    /// Memory hits return as-is. Durable hits get a fresh metrics snapshot
    /// attached (the table stores no metrics), are promoted into the memory
    /// tier, and then returned.
    pub fn get_cached_insight(&self, owner: &OwnerId) -> Result<Option<Insight>> {
        if let Some(insight) = self.memory.get(owner) {
            debug!(%owner, "Memory cache hit");
            return Ok(Some(insight));
        }

        let stored = match self.db.find_insight(owner)? {
            Some(stored) => stored,
            None => {
                debug!(%owner, "Cache miss");
                return Ok(None);
            }
        };

        debug!(%owner, "Durable cache hit");
        let metrics = self.metrics.snapshot(owner)?;
        let insight = stored_to_insight(stored, metrics)?;
        self.memory.insert(owner.clone(), insight.clone());

        Ok(Some(insight))
    }

    /// Write an insight through both tiers
    ///
    /// The durable write happens first; if it fails the memory tier is left
    /// untouched.
    pub fn save_insight(&self, owner: &OwnerId, insight: &Insight) -> Result<()> {
        let record = InsightRecord {
            owner_id: owner.clone(),
            persona: insight.persona,
            provider: insight.provider_used(),
            summary: insight.summary_text().map(String::from),
            ai_generated: insight.ai_generated(),
            fallback_reason: insight.fallback_reason().map(String::from),
            model: insight.model_name().map(String::from),
            summary_date: insight.date,
        };

        self.db.upsert_insight(&record)?;
        self.memory.insert(owner.clone(), insight.clone());
        debug!(%owner, "Insight saved");

        Ok(())
    }

    /// Drop an owner's insight from both tiers
    ///
    /// Returns whether a durable row existed. Invalidating an owner with no
    /// cached insight is a no-op.
    pub fn invalidate(&self, owner: &OwnerId) -> Result<bool> {
        let removed = self.db.delete_insight(owner)?;
        self.memory.invalidate(owner);
        debug!(%owner, removed, "Insight invalidated");

        Ok(removed)
    }
}

/// Rebuild a domain insight from a durable row plus a fresh metrics snapshot
///
/// Rejects rows whose shape contradicts their ai_generated flag rather than
/// papering over missing fields.
fn stored_to_insight(stored: StoredInsight, metrics: TaskMetrics) -> Result<Insight> {
    let body = if stored.ai_generated {
        let summary = stored.summary.ok_or_else(|| {
            Error::InvalidData("AI-generated insight row is missing its summary".to_string())
        })?;
        let model = stored.model.ok_or_else(|| {
            Error::InvalidData("AI-generated insight row is missing its model".to_string())
        })?;
        let provider = stored.provider.ok_or_else(|| {
            Error::InvalidData("AI-generated insight row is missing its provider".to_string())
        })?;

        InsightBody::Generated {
            summary,
            model,
            provider,
        }
    } else {
        let reason = stored.fallback_reason.ok_or_else(|| {
            Error::InvalidData("Fallback insight row is missing its reason".to_string())
        })?;

        InsightBody::Fallback { reason }
    };

    Ok(Insight {
        date: stored.summary_date,
        persona: stored.persona,
        body,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas::Persona;
    use crate::providers::ProviderKind;
    use crate::test_utils::{sample_metrics, FixedMetrics};

    fn cache_over(db: &Database, metrics: TaskMetrics) -> InsightCache {
        InsightCache::new(db.clone(), Arc::new(FixedMetrics::new(metrics)))
    }

    fn generated_insight() -> Insight {
        Insight::generated(
            sample_metrics().date,
            Persona::Developer,
            "You closed out the tricky migrations today.",
            "gpt-4.1-nano",
            ProviderKind::OpenAi,
            sample_metrics(),
        )
    }

    #[test]
    fn test_miss_returns_none() {
        let db = Database::in_memory().unwrap();
        let cache = cache_over(&db, sample_metrics());

        assert!(cache.get_cached_insight(&OwnerId::from("user-1")).unwrap().is_none());
    }

    #[test]
    fn test_memory_tier_serves_after_save() {
        let db = Database::in_memory().unwrap();
        let cache = cache_over(&db, sample_metrics());
        let owner = OwnerId::from("user-1");

        cache.save_insight(&owner, &generated_insight()).unwrap();

        // Remove the durable row behind the cache's back; the memory tier
        // must still serve the entry without touching the database.
        db.conn()
            .unwrap()
            .execute("DELETE FROM insights", [])
            .unwrap();

        let hit = cache.get_cached_insight(&owner).unwrap().unwrap();
        assert_eq!(
            hit.summary_text(),
            Some("You closed out the tricky migrations today.")
        );
    }

    #[test]
    fn test_durable_hit_promotes_with_fresh_metrics() {
        let db = Database::in_memory().unwrap();
        let owner = OwnerId::from("user-1");

        cache_over(&db, sample_metrics())
            .save_insight(&owner, &generated_insight())
            .unwrap();

        // A new cache instance has an empty memory tier, so this read comes
        // from the durable row and attaches the current metrics snapshot.
        let mut fresher = sample_metrics();
        fresher.completed_count = 11;
        let cache = cache_over(&db, fresher.clone());

        let hit = cache.get_cached_insight(&owner).unwrap().unwrap();
        assert!(hit.ai_generated());
        assert_eq!(hit.provider_used(), Some(ProviderKind::OpenAi));
        assert_eq!(hit.metrics, fresher);
    }

    #[test]
    fn test_fallback_round_trips_through_durable_tier() {
        let db = Database::in_memory().unwrap();
        let owner = OwnerId::from("user-2");

        let fallback = Insight::fallback(
            sample_metrics().date,
            Persona::Executive,
            "All AI providers are disabled",
            sample_metrics(),
        );
        cache_over(&db, sample_metrics())
            .save_insight(&owner, &fallback)
            .unwrap();

        let cache = cache_over(&db, sample_metrics());
        let hit = cache.get_cached_insight(&owner).unwrap().unwrap();
        assert!(!hit.ai_generated());
        assert_eq!(hit.fallback_reason(), Some("All AI providers are disabled"));
        assert_eq!(hit.summary_text(), None);
        assert_eq!(hit.model_name(), None);
        assert_eq!(hit.provider_used(), None);
    }

    #[test]
    fn test_invalidate_clears_both_tiers() {
        let db = Database::in_memory().unwrap();
        let cache = cache_over(&db, sample_metrics());
        let owner = OwnerId::from("user-3");

        cache.save_insight(&owner, &generated_insight()).unwrap();

        assert!(cache.invalidate(&owner).unwrap());
        assert!(cache.get_cached_insight(&owner).unwrap().is_none());
        assert!(!cache.invalidate(&owner).unwrap());
    }

    #[test]
    fn test_contradictory_row_shape_is_rejected() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO insights (owner_id, persona, ai_generated, summary_date)
                 VALUES ('user-4', 'DEVELOPER', 1, '2026-01-09')",
                [],
            )
            .unwrap();

        let cache = cache_over(&db, sample_metrics());
        let err = cache.get_cached_insight(&OwnerId::from("user-4")).unwrap_err();
        assert!(err.to_string().contains("missing its summary"));
    }
}
