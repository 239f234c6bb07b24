//! Aggregation of one user's week of activity across reflections, practice
//! completions, check-ins, and community posts.

use chrono::NaiveDate;
use rusqlite::params;
use serde::Serialize;

use crate::db::Database;
use crate::error::{Result, SelahError};

/// Completions of one exercise within the week, grouped by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSummary {
    pub title: String,
    pub completed_count: i64,
}

/// Everything the recap generator needs about a user's week. All-empty is a
/// valid value: an inactive week still gets a recap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    pub reflection_texts: Vec<String>,
    pub practices: Vec<PracticeSummary>,
    pub check_in_count: i64,
    pub shared_post_count: i64,
    pub total_practice_sessions: i64,
}

impl Database {
    /// Collect the user's activity in `[week_start 00:00, week_end 23:59:59.999]`.
    /// Four independent range-filtered reads; no side effects.
    pub fn collect_activity(
        &self,
        user_id: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<ActivityData> {
        let lo = format!("{week_start}T00:00:00");
        let hi = format!("{week_end}T23:59:59.999");

        let mut stmt = self
            .conn
            .prepare(
                "SELECT text FROM reflections
                 WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3
                 ORDER BY created_at ASC",
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        let reflection_texts = stmt
            .query_map(params![user_id, lo, hi], |row| row.get(0))
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT e.title, COUNT(*) AS completed
                 FROM practice_completions pc
                 JOIN exercises e ON e.id = pc.exercise_id
                 WHERE pc.user_id = ?1 AND pc.created_at >= ?2 AND pc.created_at <= ?3
                 GROUP BY e.title
                 ORDER BY completed DESC, e.title ASC",
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        let practices = stmt
            .query_map(params![user_id, lo, hi], |row| {
                Ok(PracticeSummary {
                    title: row.get(0)?,
                    completed_count: row.get(1)?,
                })
            })
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        let check_in_count = self.count_in_range("check_ins", user_id, &lo, &hi)?;
        let shared_post_count = self.count_in_range("community_posts", user_id, &lo, &hi)?;
        let total_practice_sessions = practices.iter().map(|p| p.completed_count).sum();

        Ok(ActivityData {
            reflection_texts,
            practices,
            check_in_count,
            shared_post_count,
            total_practice_sessions,
        })
    }

    fn count_in_range(&self, table: &str, user_id: &str, lo: &str, hi: &str) -> Result<i64> {
        // Table names come from the two fixed call sites above.
        let sql = format!(
            "SELECT COUNT(*) FROM {table}
             WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3"
        );
        self.conn
            .query_row(&sql, params![user_id, lo, hi], |row| row.get(0))
            .map_err(|e| SelahError::QueryFailed(e.to_string()))
    }
}
