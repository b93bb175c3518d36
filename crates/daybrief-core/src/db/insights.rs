//! Durable insight row operations
//!
//! The insights table holds at most one row per owner. Saving a new summary
//! for an owner overwrites whatever was there; there is no history.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::insight::OwnerId;
use crate::personas::Persona;
use crate::providers::ProviderKind;

/// Fields written when saving an insight for an owner
#[derive(Debug, Clone)]
pub struct InsightRecord {
    pub owner_id: OwnerId,
    pub persona: Persona,
    pub provider: Option<ProviderKind>,
    pub summary: Option<String>,
    pub ai_generated: bool,
    pub fallback_reason: Option<String>,
    pub model: Option<String>,
    pub summary_date: NaiveDate,
}

/// An insight row as stored, including audit timestamps
#[derive(Debug, Clone)]
pub struct StoredInsight {
    pub id: i64,
    pub owner_id: OwnerId,
    pub persona: Persona,
    pub provider: Option<ProviderKind>,
    pub summary: Option<String>,
    pub ai_generated: bool,
    pub fallback_reason: Option<String>,
    pub model: Option<String>,
    pub summary_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values read straight off a row, before domain parsing
struct RawInsightRow {
    id: i64,
    owner_id: String,
    persona: String,
    provider: Option<String>,
    summary: Option<String>,
    ai_generated: bool,
    fallback_reason: Option<String>,
    model: Option<String>,
    summary_date: String,
    created_at: String,
    updated_at: String,
}

impl RawInsightRow {
    /// Parse the enum-valued and date columns strictly
    ///
    /// A row that no longer parses means the stored data is corrupt; callers
    /// get an error rather than a silently-defaulted insight.
    fn into_stored(self) -> Result<StoredInsight> {
        let persona: Persona = self.persona.parse().map_err(Error::InvalidData)?;
        let provider: Option<ProviderKind> = self
            .provider
            .map(|p| p.parse().map_err(Error::InvalidData))
            .transpose()?;
        let summary_date = NaiveDate::parse_from_str(&self.summary_date, "%Y-%m-%d")
            .map_err(|e| Error::InvalidData(format!("Invalid summary date: {}", e)))?;

        Ok(StoredInsight {
            id: self.id,
            owner_id: OwnerId::new(self.owner_id),
            persona,
            provider,
            summary: self.summary,
            ai_generated: self.ai_generated,
            fallback_reason: self.fallback_reason,
            model: self.model,
            summary_date,
            created_at: parse_datetime(&self.created_at),
            updated_at: parse_datetime(&self.updated_at),
        })
    }
}

impl Database {
    /// Upsert the insight row for an owner
    ///
    /// If the owner already has a row, overwrites it in place and refreshes
    /// updated_at. Otherwise inserts a new record.
    pub fn upsert_insight(&self, record: &InsightRecord) -> Result<i64> {
        let conn = self.conn()?;

        let provider = record.provider.map(|p| p.as_str());
        let summary_date = record.summary_date.format("%Y-%m-%d").to_string();

        // Try to update existing
        let updated = conn.execute(
            r#"
            UPDATE insights
            SET persona = ?,
                provider = ?,
                summary = ?,
                ai_generated = ?,
                fallback_reason = ?,
                model = ?,
                summary_date = ?,
                updated_at = datetime('now')
            WHERE owner_id = ?
            "#,
            params![
                record.persona.as_str(),
                provider,
                record.summary,
                record.ai_generated,
                record.fallback_reason,
                record.model,
                summary_date,
                record.owner_id.as_str()
            ],
        )?;

        if updated > 0 {
            // Get the existing id
            let id: i64 = conn.query_row(
                "SELECT id FROM insights WHERE owner_id = ?",
                params![record.owner_id.as_str()],
                |row| row.get(0),
            )?;
            return Ok(id);
        }

        // Insert new
        conn.execute(
            r#"
            INSERT INTO insights (
                owner_id, persona, provider, summary, ai_generated,
                fallback_reason, model, summary_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.owner_id.as_str(),
                record.persona.as_str(),
                provider,
                record.summary,
                record.ai_generated,
                record.fallback_reason,
                record.model,
                summary_date
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get the insight row for an owner, if one exists
    pub fn find_insight(&self, owner: &OwnerId) -> Result<Option<StoredInsight>> {
        let conn = self.conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, owner_id, persona, provider, summary, ai_generated,
                   fallback_reason, model, summary_date, created_at, updated_at
            FROM insights
            WHERE owner_id = ?
            "#,
            params![owner.as_str()],
            |row| {
                Ok(RawInsightRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    persona: row.get(2)?,
                    provider: row.get(3)?,
                    summary: row.get(4)?,
                    ai_generated: row.get(5)?,
                    fallback_reason: row.get(6)?,
                    model: row.get(7)?,
                    summary_date: row.get(8)?,
                    created_at: row.get(9)?,
                    updated_at: row.get(10)?,
                })
            },
        );

        match result {
            Ok(raw) => Ok(Some(raw.into_stored()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the insight row for an owner
    ///
    /// Returns whether a row was actually removed; deleting an owner with
    /// no row is not an error.
    pub fn delete_insight(&self, owner: &OwnerId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM insights WHERE owner_id = ?",
            params![owner.as_str()],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated_record(owner: &str) -> InsightRecord {
        InsightRecord {
            owner_id: OwnerId::from(owner),
            persona: Persona::Developer,
            provider: Some(ProviderKind::OpenAi),
            summary: Some("You shipped three fixes today.".to_string()),
            ai_generated: true,
            fallback_reason: None,
            model: Some("gpt-4.1-nano".to_string()),
            summary_date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
        }
    }

    fn fallback_record(owner: &str) -> InsightRecord {
        InsightRecord {
            owner_id: OwnerId::from(owner),
            persona: Persona::Executive,
            provider: None,
            summary: None,
            ai_generated: false,
            fallback_reason: Some("All AI providers are disabled".to_string()),
            model: None,
            summary_date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
        }
    }

    fn count_rows(db: &Database, owner: &str) -> i64 {
        db.conn()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM insights WHERE owner_id = ?",
                params![owner],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_upsert_inserts_then_updates_in_place() {
        let db = Database::in_memory().unwrap();

        let id1 = db.upsert_insight(&generated_record("user-1")).unwrap();
        assert!(id1 > 0);

        let mut second = generated_record("user-1");
        second.persona = Persona::Executive;
        second.summary = Some("Delivery is on track.".to_string());
        let id2 = db.upsert_insight(&second).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(count_rows(&db, "user-1"), 1);

        let stored = db.find_insight(&OwnerId::from("user-1")).unwrap().unwrap();
        assert_eq!(stored.persona, Persona::Executive);
        assert_eq!(stored.summary.as_deref(), Some("Delivery is on track."));
    }

    #[test]
    fn test_owners_do_not_collide() {
        let db = Database::in_memory().unwrap();

        db.upsert_insight(&generated_record("user-1")).unwrap();
        db.upsert_insight(&fallback_record("user-2")).unwrap();

        assert_eq!(count_rows(&db, "user-1"), 1);
        assert_eq!(count_rows(&db, "user-2"), 1);

        let first = db.find_insight(&OwnerId::from("user-1")).unwrap().unwrap();
        assert!(first.ai_generated);

        let second = db.find_insight(&OwnerId::from("user-2")).unwrap().unwrap();
        assert!(!second.ai_generated);
    }

    #[test]
    fn test_find_missing_owner_returns_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.find_insight(&OwnerId::from("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_fallback_row_round_trips_with_null_generation_fields() {
        let db = Database::in_memory().unwrap();
        db.upsert_insight(&fallback_record("user-3")).unwrap();

        let stored = db.find_insight(&OwnerId::from("user-3")).unwrap().unwrap();
        assert!(!stored.ai_generated);
        assert_eq!(stored.provider, None);
        assert_eq!(stored.summary, None);
        assert_eq!(stored.model, None);
        assert_eq!(
            stored.fallback_reason.as_deref(),
            Some("All AI providers are disabled")
        );
        assert_eq!(
            stored.summary_date,
            NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let db = Database::in_memory().unwrap();
        let owner = OwnerId::from("user-4");

        db.upsert_insight(&generated_record("user-4")).unwrap();
        assert!(db.delete_insight(&owner).unwrap());
        assert!(db.find_insight(&owner).unwrap().is_none());
        assert!(!db.delete_insight(&owner).unwrap());
    }

    #[test]
    fn test_corrupt_persona_column_is_rejected() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO insights (owner_id, persona, ai_generated, fallback_reason, summary_date)
                 VALUES ('user-5', 'NOT_A_PERSONA', 0, 'reason', '2026-01-09')",
                [],
            )
            .unwrap();

        let err = db.find_insight(&OwnerId::from("user-5")).unwrap_err();
        assert!(err.to_string().contains("Unknown persona: NOT_A_PERSONA"));
    }

    #[test]
    fn test_upsert_refreshes_updated_at() {
        let db = Database::in_memory().unwrap();

        db.upsert_insight(&generated_record("user-6")).unwrap();
        let first = db.find_insight(&OwnerId::from("user-6")).unwrap().unwrap();

        // Force a visibly different timestamp
        db.conn()
            .unwrap()
            .execute(
                "UPDATE insights SET updated_at = '2020-01-01 00:00:00' WHERE owner_id = 'user-6'",
                [],
            )
            .unwrap();

        db.upsert_insight(&generated_record("user-6")).unwrap();
        let second = db.find_insight(&OwnerId::from("user-6")).unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at > parse_datetime("2020-01-01 00:00:00"));
    }
}
