//! Weekly themes and daily content: seeding the rotation into the database
//! and serving the current week's rows.

use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{self, Clock};
use crate::db::Database;
use crate::error::{Result, SelahError};
use crate::rotation::{self, FALLBACK_SCRIPTURE};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTheme {
    pub id: String,
    pub week_start_date: NaiveDate,
    pub liturgical_season: String,
    pub theme_title: String,
    pub theme_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_exercise_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyContent {
    pub id: String,
    pub weekly_theme_id: String,
    pub day_of_week: u8,
    pub scripture_reference: String,
    pub scripture_text: String,
    pub reflection_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub somatic_prompt: Option<String>,
}

/// The always-available preview payload for unauthenticated callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewContent {
    pub scripture_reference: String,
    pub scripture_text: String,
    pub reflection_prompt: String,
}

impl PreviewContent {
    pub fn fallback() -> Self {
        Self {
            scripture_reference: FALLBACK_SCRIPTURE.reference.to_string(),
            scripture_text: FALLBACK_SCRIPTURE.text.to_string(),
            reflection_prompt: FALLBACK_SCRIPTURE.reflection_prompt.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

impl Database {
    /// Seed the 52-week rotation starting at `start` (default: the next
    /// Sunday). One-time bootstrap: a no-op returning 0 when any theme row
    /// already exists. Otherwise creates 52 themes and 7 daily-content rows
    /// per theme in one transaction.
    pub fn seed_rotation(&mut self, clock: &dyn Clock, start: Option<NaiveDate>) -> Result<usize> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM weekly_themes", [], |row| row.get(0))
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        if existing > 0 {
            tracing::info!(existing, "rotation already seeded; skipping");
            return Ok(0);
        }

        let start = start.unwrap_or_else(|| clock::next_week_start(clock));
        let now = chrono::Utc::now().to_rfc3339();

        let tx = self
            .conn
            .transaction()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        {
            let mut insert_theme = tx
                .prepare(
                    "INSERT INTO weekly_themes
                     (id, week_start_date, liturgical_season, theme_title, theme_description,
                      featured_exercise_id, reflection_prompt, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)",
                )
                .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
            let mut insert_day = tx
                .prepare(
                    "INSERT INTO daily_content
                     (id, weekly_theme_id, day_of_week, scripture_reference, scripture_text,
                      reflection_prompt, day_title, somatic_prompt)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
                )
                .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

            for (i, descriptor) in rotation::rotation().iter().enumerate() {
                let theme_id = Uuid::new_v4().to_string();
                let week_start = start + Duration::days(7 * i as i64);
                insert_theme
                    .execute(params![
                        theme_id,
                        week_start.to_string(),
                        descriptor.season.as_str(),
                        descriptor.title,
                        descriptor.description,
                        descriptor.reflection_prompt,
                        now,
                    ])
                    .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

                let season_key = descriptor.season_key();
                for day in 0u8..7 {
                    let entry = rotation::scripture_or_fallback(&season_key, day);
                    insert_day
                        .execute(params![
                            Uuid::new_v4().to_string(),
                            theme_id,
                            day,
                            entry.reference,
                            entry.text,
                            entry.reflection_prompt,
                            entry.day_title,
                        ])
                        .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
                }
            }
        }
        tx.commit()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        let created = rotation::rotation().len();
        tracing::info!(themes = created, start = %start, "rotation seeded");
        Ok(created)
    }

    pub fn theme_for_week(&self, week_start: NaiveDate) -> Result<Option<WeeklyTheme>> {
        self.conn
            .query_row(
                "SELECT id, week_start_date, liturgical_season, theme_title, theme_description,
                        featured_exercise_id, reflection_prompt
                 FROM weekly_themes WHERE week_start_date = ?1",
                params![week_start.to_string()],
                theme_from_row,
            )
            .optional()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?
            .map(|row| row.into_theme())
            .transpose()
    }

    pub fn daily_content_for(&self, theme_id: &str, day_of_week: u8) -> Result<Option<DailyContent>> {
        self.conn
            .query_row(
                "SELECT id, weekly_theme_id, day_of_week, scripture_reference, scripture_text,
                        reflection_prompt, day_title, somatic_prompt
                 FROM daily_content WHERE weekly_theme_id = ?1 AND day_of_week = ?2",
                params![theme_id, day_of_week],
                |row| {
                    Ok(DailyContent {
                        id: row.get(0)?,
                        weekly_theme_id: row.get(1)?,
                        day_of_week: row.get::<_, i64>(2)? as u8,
                        scripture_reference: row.get(3)?,
                        scripture_text: row.get(4)?,
                        reflection_prompt: row.get(5)?,
                        day_title: row.get(6)?,
                        somatic_prompt: row.get(7)?,
                    })
                },
            )
            .optional()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))
    }

    /// The theme for the current week, or `ThemeNotFound` when seeding has
    /// not reached this week. Never fabricates a row.
    pub fn current_theme(&self, clock: &dyn Clock) -> Result<WeeklyTheme> {
        let week_start = clock::current_week_start(clock);
        self.theme_for_week(week_start)?
            .ok_or_else(|| SelahError::ThemeNotFound(week_start.to_string()))
    }

    /// Today's content under the current theme. "No theme this week" and
    /// "no content today" stay distinct error cases.
    pub fn current_daily_content(&self, clock: &dyn Clock) -> Result<(WeeklyTheme, DailyContent)> {
        let theme = self.current_theme(clock)?;
        let day = clock::current_day_of_week(clock);
        let content =
            self.daily_content_for(&theme.id, day)?
                .ok_or_else(|| SelahError::DailyContentNotFound {
                    week_start: theme.week_start_date.to_string(),
                    day,
                })?;
        Ok((theme, content))
    }

    /// Preview content for the unauthenticated path: today's row when it
    /// exists, the fixed fallback otherwise. Always available.
    pub fn preview_content(&self, clock: &dyn Clock) -> Result<PreviewContent> {
        match self.current_daily_content(clock) {
            Ok((_, content)) => Ok(PreviewContent {
                scripture_reference: content.scripture_reference,
                scripture_text: content.scripture_text,
                reflection_prompt: content.reflection_prompt,
            }),
            Err(SelahError::ThemeNotFound(_)) | Err(SelahError::DailyContentNotFound { .. }) => {
                Ok(PreviewContent::fallback())
            }
            Err(e) => Err(e),
        }
    }
}

struct ThemeRow {
    id: String,
    week_start_date: String,
    liturgical_season: String,
    theme_title: String,
    theme_description: String,
    featured_exercise_id: Option<String>,
    reflection_prompt: Option<String>,
}

fn theme_from_row(row: &rusqlite::Row) -> rusqlite::Result<ThemeRow> {
    Ok(ThemeRow {
        id: row.get(0)?,
        week_start_date: row.get(1)?,
        liturgical_season: row.get(2)?,
        theme_title: row.get(3)?,
        theme_description: row.get(4)?,
        featured_exercise_id: row.get(5)?,
        reflection_prompt: row.get(6)?,
    })
}

impl ThemeRow {
    fn into_theme(self) -> Result<WeeklyTheme> {
        let week_start_date = self
            .week_start_date
            .parse::<NaiveDate>()
            .map_err(|e| SelahError::CorruptRow(format!("week_start_date: {e}")))?;
        Ok(WeeklyTheme {
            id: self.id,
            week_start_date,
            liturgical_season: self.liturgical_season,
            theme_title: self.theme_title,
            theme_description: self.theme_description,
            featured_exercise_id: self.featured_exercise_id,
            reflection_prompt: self.reflection_prompt,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Wednesday; next Sunday is 2025-06-15
    fn wednesday_clock() -> FixedClock {
        FixedClock(date(2025, 6, 11))
    }

    #[test]
    fn seed_creates_52_weeks_at_seven_day_strides() {
        let mut db = Database::open_in_memory().unwrap();
        let created = db
            .seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
            .unwrap();
        assert_eq!(created, 52);

        for i in 0..52 {
            let week = date(2025, 6, 15) + Duration::days(7 * i);
            let theme = db.theme_for_week(week).unwrap();
            assert!(theme.is_some(), "missing theme at stride {i}");
        }

        let days: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM daily_content", [], |row| row.get(0))
            .unwrap();
        assert_eq!(days, 52 * 7);
    }

    #[test]
    fn seed_is_a_no_op_when_any_theme_exists() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(
            db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
                .unwrap(),
            52
        );
        // Second run reports zero and leaves the row count unchanged.
        assert_eq!(
            db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
                .unwrap(),
            0
        );
        let themes: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM weekly_themes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(themes, 52);
    }

    #[test]
    fn seed_defaults_to_next_week_start() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_rotation(&wednesday_clock(), None).unwrap();
        assert!(db.theme_for_week(date(2025, 6, 15)).unwrap().is_some());
        assert!(db.theme_for_week(date(2025, 6, 8)).unwrap().is_none());
    }

    #[test]
    fn sparse_weeks_carry_the_fallback_verse() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
            .unwrap();
        // Week index 28 is ordinary-time-1: entirely absent from the table.
        let week = date(2025, 6, 15) + Duration::days(7 * 28);
        let theme = db.theme_for_week(week).unwrap().unwrap();
        assert_eq!(theme.liturgical_season, "ordinary-time");
        let content = db.daily_content_for(&theme.id, 3).unwrap().unwrap();
        assert_eq!(content.scripture_reference, FALLBACK_SCRIPTURE.reference);
    }

    #[test]
    fn first_week_uses_the_advent_table() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
            .unwrap();
        let theme = db.theme_for_week(date(2025, 6, 15)).unwrap().unwrap();
        assert_eq!(theme.liturgical_season, "advent");
        assert_eq!(theme.theme_title, "Watchful Waiting");
        let sunday = db.daily_content_for(&theme.id, 0).unwrap().unwrap();
        assert_eq!(sunday.scripture_reference, "Isaiah 40:3");
        assert_eq!(sunday.day_title.as_deref(), Some("Prepare"));
    }

    #[test]
    fn current_theme_reports_not_found_before_seeding() {
        let db = Database::open_in_memory().unwrap();
        match db.current_theme(&wednesday_clock()) {
            Err(SelahError::ThemeNotFound(week)) => assert_eq!(week, "2025-06-08"),
            other => panic!("expected ThemeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn current_daily_content_resolves_from_the_clock() {
        let mut db = Database::open_in_memory().unwrap();
        // Seed so that the current week (starting Sunday 2025-06-08) is covered.
        db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 8)))
            .unwrap();
        let (theme, content) = db.current_daily_content(&wednesday_clock()).unwrap();
        assert_eq!(theme.week_start_date, date(2025, 6, 8));
        assert_eq!(content.day_of_week, 3);
    }

    #[test]
    fn preview_falls_back_instead_of_failing() {
        let db = Database::open_in_memory().unwrap();
        let preview = db.preview_content(&wednesday_clock()).unwrap();
        assert_eq!(preview.scripture_reference, FALLBACK_SCRIPTURE.reference);
    }

    #[test]
    fn deleting_a_theme_cascades_to_daily_content() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_rotation(&wednesday_clock(), Some(date(2025, 6, 15)))
            .unwrap();
        let theme = db.theme_for_week(date(2025, 6, 15)).unwrap().unwrap();
        db.conn
            .execute("DELETE FROM weekly_themes WHERE id = ?1", params![theme.id])
            .unwrap();
        let orphans: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM daily_content WHERE weekly_theme_id = ?1",
                params![theme.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
