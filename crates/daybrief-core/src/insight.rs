//! Insight views and owner identity
//!
//! An insight is the owner-scoped record of the most recent generated or
//! fallback summary. The generated/fallback split is a tagged variant so a
//! fallback can never carry a model name or summary text.

use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::metrics::TaskMetrics;
use crate::personas::Persona;
use crate::providers::ProviderKind;

/// Identity that scopes the one-insight invariant and all cache operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Generated-or-fallback payload of an insight
#[derive(Debug, Clone, PartialEq)]
pub enum InsightBody {
    /// Text produced by an AI provider
    Generated {
        summary: String,
        model: String,
        provider: ProviderKind,
    },
    /// Deterministic response when no provider could produce text
    Fallback { reason: String },
}

/// Owner-scoped summary view returned to callers
///
/// The attached metrics snapshot is present in every branch; callers
/// rendering a fallback still have the raw numbers to show.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    /// As-of date of the metrics the summary describes
    pub date: NaiveDate,
    pub persona: Persona,
    pub body: InsightBody,
    pub metrics: TaskMetrics,
}

impl Insight {
    /// Build a view for successfully generated text
    pub fn generated(
        date: NaiveDate,
        persona: Persona,
        summary: impl Into<String>,
        model: impl Into<String>,
        provider: ProviderKind,
        metrics: TaskMetrics,
    ) -> Self {
        Self {
            date,
            persona,
            body: InsightBody::Generated {
                summary: summary.into(),
                model: model.into(),
                provider,
            },
            metrics,
        }
    }

    /// Build a metrics-only fallback view
    pub fn fallback(
        date: NaiveDate,
        persona: Persona,
        reason: impl Into<String>,
        metrics: TaskMetrics,
    ) -> Self {
        Self {
            date,
            persona,
            body: InsightBody::Fallback {
                reason: reason.into(),
            },
            metrics,
        }
    }

    pub fn ai_generated(&self) -> bool {
        matches!(self.body, InsightBody::Generated { .. })
    }

    pub fn summary_text(&self) -> Option<&str> {
        match &self.body {
            InsightBody::Generated { summary, .. } => Some(summary),
            InsightBody::Fallback { .. } => None,
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        match &self.body {
            InsightBody::Generated { model, .. } => Some(model),
            InsightBody::Fallback { .. } => None,
        }
    }

    pub fn provider_used(&self) -> Option<ProviderKind> {
        match &self.body {
            InsightBody::Generated { provider, .. } => Some(*provider),
            InsightBody::Fallback { .. } => None,
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.body {
            InsightBody::Generated { .. } => None,
            InsightBody::Fallback { reason } => Some(reason),
        }
    }
}

// Callers consume a flat view; the generated/fallback holes serialize as null.
impl Serialize for Insight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Insight", 8)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("persona", &self.persona)?;
        state.serialize_field("ai_generated", &self.ai_generated())?;
        state.serialize_field("summary", &self.summary_text())?;
        state.serialize_field("model", &self.model_name())?;
        state.serialize_field("provider", &self.provider_used())?;
        state.serialize_field("fallback_reason", &self.fallback_reason())?;
        state.serialize_field("metrics", &self.metrics)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn metrics() -> TaskMetrics {
        TaskMetrics {
            date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            total_todos: 3,
            completed_count: 1,
            in_progress_count: 1,
            not_started_count: 1,
            cancelled_count: 0,
            overdue_count: 0,
            due_today_count: 1,
            upcoming_count: 2,
            completion_rate: 33.33,
            by_priority: BTreeMap::new(),
            by_status: BTreeMap::new(),
        }
    }

    #[test]
    fn test_generated_accessors() {
        let insight = Insight::generated(
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            Persona::Developer,
            "Shipped the parser.",
            "gpt-4.1-nano",
            ProviderKind::OpenAi,
            metrics(),
        );

        assert!(insight.ai_generated());
        assert_eq!(insight.summary_text(), Some("Shipped the parser."));
        assert_eq!(insight.model_name(), Some("gpt-4.1-nano"));
        assert_eq!(insight.provider_used(), Some(ProviderKind::OpenAi));
        assert_eq!(insight.fallback_reason(), None);
    }

    #[test]
    fn test_fallback_never_carries_generation_fields() {
        let insight = Insight::fallback(
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            Persona::Executive,
            "All AI providers are disabled",
            metrics(),
        );

        assert!(!insight.ai_generated());
        assert_eq!(insight.summary_text(), None);
        assert_eq!(insight.model_name(), None);
        assert_eq!(insight.provider_used(), None);
        assert_eq!(
            insight.fallback_reason(),
            Some("All AI providers are disabled")
        );
    }

    #[test]
    fn test_serialized_view_shape() {
        let insight = Insight::generated(
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            Persona::Minimal,
            "- done",
            "gemini-2.0-flash",
            ProviderKind::Gemini,
            metrics(),
        );

        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["date"], "2026-01-09");
        assert_eq!(value["persona"], "MINIMAL");
        assert_eq!(value["ai_generated"], true);
        assert_eq!(value["summary"], "- done");
        assert_eq!(value["model"], "gemini-2.0-flash");
        assert_eq!(value["provider"], "gemini");
        assert_eq!(value["fallback_reason"], serde_json::Value::Null);
        assert_eq!(value["metrics"]["total_todos"], 3);
    }

    #[test]
    fn test_serialized_fallback_has_null_holes() {
        let insight = Insight::fallback(
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            Persona::Student,
            "OpenAI API key is not configured",
            metrics(),
        );

        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["ai_generated"], false);
        assert_eq!(value["summary"], serde_json::Value::Null);
        assert_eq!(value["model"], serde_json::Value::Null);
        assert_eq!(value["provider"], serde_json::Value::Null);
        assert_eq!(value["fallback_reason"], "OpenAI API key is not configured");
    }

    #[test]
    fn test_owner_id_display() {
        let owner = OwnerId::new("user-42");
        assert_eq!(owner.as_str(), "user-42");
        assert_eq!(owner.to_string(), "user-42");
    }
}
