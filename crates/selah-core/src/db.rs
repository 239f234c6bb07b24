//! Database wrapper over rusqlite.
//!
//! Domain modules (`theme`, `activity`, `recap`, `prefs`) add their own
//! table-specific operations via `impl Database` blocks; this module owns the
//! connection, schema migration, user provisioning, and the activity-fact
//! writers used by tests and demo seeding.
//!
//! Activity timestamps are stored as Pacific civil time
//! (`YYYY-MM-DDTHH:MM:SS`), the same frame the week boundaries are computed
//! in, so range filters are plain text comparisons.

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use uuid::Uuid;

use crate::error::{Result, SelahError};
use crate::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};

pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(path).map_err(|e| SelahError::ConnectionFailed(e.to_string()))?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SelahError::ConnectionFailed(e.to_string()))?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| SelahError::MigrationFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| SelahError::MigrationFailed(e.to_string()))?;

        let current_version = self.schema_version()?;
        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<i32> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );
        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(SelahError::QueryFailed(e.to_string())),
        }
    }

    fn migrate(&self, from_version: i32) -> Result<()> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| SelahError::MigrationFailed(e.to_string()))?;
            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| SelahError::MigrationFailed(e.to_string()))?;
            tracing::info!("database migrated to version {}", CURRENT_VERSION);
        }
        Ok(())
    }

    // ========== Users ==========

    /// Provision a user row if it does not exist. Any opaque id from the
    /// session gateway (including the guest identity) must pass through here
    /// before a foreign-key-referencing write can succeed.
    pub fn ensure_user(&self, user_id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO users (id, created_at) VALUES (?1, ?2)",
                params![user_id, Utc::now().to_rfc3339()],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    // ========== Activity facts (owned by other subsystems) ==========

    pub fn record_reflection(
        &self,
        user_id: &str,
        text: &str,
        at: NaiveDateTime,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO reflections (id, user_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, text, format_ts(at)],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(id)
    }

    pub fn upsert_exercise(&self, exercise_id: &str, title: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO exercises (id, title) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET title = excluded.title",
                params![exercise_id, title],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    pub fn record_practice_completion(
        &self,
        user_id: &str,
        exercise_id: &str,
        at: NaiveDateTime,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO practice_completions (id, user_id, exercise_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, exercise_id, format_ts(at)],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(id)
    }

    pub fn record_check_in(&self, user_id: &str, at: NaiveDateTime) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO check_ins (id, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![id, user_id, format_ts(at)],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(id)
    }

    pub fn record_community_post(&self, user_id: &str, at: NaiveDateTime) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO community_posts (id, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![id, user_id, format_ts(at)],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        Ok(id)
    }
}

/// Civil timestamp text form used across the activity tables.
pub(crate) fn format_ts(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn open_in_memory_applies_schema() {
        let db = Database::open_in_memory().unwrap();
        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for t in [
            "users",
            "weekly_themes",
            "daily_content",
            "weekly_recaps",
            "recap_preferences",
            "reflections",
            "exercises",
            "practice_completions",
            "check_ins",
            "community_posts",
        ] {
            assert!(tables.contains(&t.to_string()), "missing table {t}");
        }
    }

    #[test]
    fn ensure_user_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_user("guest").unwrap();
        db.ensure_user("guest").unwrap();

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn activity_writes_require_a_user_row() {
        let db = Database::open_in_memory().unwrap();
        let at = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        // No user row yet: the foreign key rejects the write.
        assert!(db.record_reflection("nobody", "hello", at).is_err());

        db.ensure_user("nobody").unwrap();
        db.record_reflection("nobody", "hello", at).unwrap();
    }
}
