//! Weekly recaps: the structured sections, the prompt and data-context the
//! generator sends to the model, validation of the model's reply, and the
//! recap store with its upsert rules.
//!
//! The model reply is the one untrusted input in the system. It is accepted
//! only if it deserializes into the typed section structs; anything else is
//! a [`ParseFailure`] and the caller substitutes [`RecapSections::safe_default`].

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::activity::ActivityData;
use crate::db::Database;
use crate::error::{Result, SelahError};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptureSection {
    #[serde(default)]
    pub reflections: Vec<String>,
    #[serde(default)]
    pub shared_reflections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySection {
    #[serde(default)]
    pub practices: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySection {
    #[serde(default)]
    pub check_in_summary: String,
    #[serde(default)]
    pub shared_posts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptingSection {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Premium-only count series: one value per day of the week plus the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeVisualization {
    pub daily_counts: Vec<i64>,
    pub weekly_total: i64,
}

/// The generated body of a recap. The four sections are always present;
/// the premium fields exist only on premium recaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapSections {
    pub scripture_section: ScriptureSection,
    pub body_section: BodySection,
    pub community_section: CommunitySection,
    pub prompting_section: PromptingSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_synthesis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_visualization: Option<PracticeVisualization>,
}

impl RecapSections {
    /// The structure substituted when generation or parsing fails: every
    /// required section present and empty, no premium fields. Callers never
    /// see a malformed or missing recap.
    pub fn safe_default() -> Self {
        Self {
            scripture_section: ScriptureSection::default(),
            body_section: BodySection::default(),
            community_section: CommunitySection::default(),
            prompting_section: PromptingSection::default(),
            personal_synthesis: None,
            practice_visualization: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

const EXCERPT_LIMIT: usize = 3;
const EXCERPT_MAX_CHARS: usize = 200;

/// Fixed system instruction sent with every generation call.
pub fn system_prompt(is_premium: bool) -> String {
    let mut prompt = String::from(
        "You are a gentle spiritual companion writing a weekly recap for one person. \
Address them in the second person, in a warm, contemplative tone. Do not preach, \
diagnose, or exaggerate; work only from the activity data you are given.\n\n\
Respond with a single JSON object and nothing else: no markdown, no code fences, \
no prose before or after. Required keys:\n\
- \"scriptureSection\": {\"reflections\": [string], \"sharedReflections\": [string]}\n\
- \"bodySection\": {\"practices\": [string], \"notes\": [string]}\n\
- \"communitySection\": {\"checkInSummary\": string, \"sharedPosts\": [string]}\n\
- \"promptingSection\": {\"suggestions\": [string]}\n",
    );
    if is_premium {
        prompt.push_str(
            "Also include:\n\
- \"personalSynthesis\": string — a short paragraph weaving the week into one thread\n\
- \"practiceVisualization\": {\"dailyCounts\": [7 integers, Sunday first], \"weeklyTotal\": integer}\n",
        );
    }
    prompt
}

/// Human-readable description of the user's week, handed to the model as the
/// user prompt.
pub fn build_data_context(
    week_start: NaiveDate,
    week_end: NaiveDate,
    activity: &ActivityData,
) -> String {
    let mut ctx = format!("Week of {week_start} through {week_end}.\n\n");

    ctx.push_str(&format!(
        "Reflections written: {}\n",
        activity.reflection_texts.len()
    ));
    ctx.push_str(&format!(
        "Practice sessions completed: {}\n",
        activity.total_practice_sessions
    ));
    ctx.push_str(&format!("Check-in conversations: {}\n", activity.check_in_count));
    ctx.push_str(&format!("Posts shared with community: {}\n", activity.shared_post_count));

    if activity.practices.is_empty() {
        ctx.push_str("\nPractices: none this week.\n");
    } else {
        ctx.push_str("\nPractices:\n");
        for p in &activity.practices {
            ctx.push_str(&format!("- {} (completed {} times)\n", p.title, p.completed_count));
        }
    }

    if activity.reflection_texts.is_empty() {
        ctx.push_str("\nNo reflections were written this week.\n");
    } else {
        ctx.push_str("\nSample reflections:\n");
        for text in activity.reflection_texts.iter().take(EXCERPT_LIMIT) {
            let excerpt: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
            ctx.push_str(&format!("- \"{excerpt}\"\n"));
        }
    }

    ctx
}

// ---------------------------------------------------------------------------
// Response validation
// ---------------------------------------------------------------------------

/// Why a model reply was rejected.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("reply contains no JSON object")]
    NoJsonObject,
    #[error("reply does not match the recap contract: {0}")]
    BadShape(#[from] serde_json::Error),
}

/// Validate a raw model reply against the recap contract.
///
/// Pulls the outermost `{ ... }` from the text (models occasionally wrap the
/// object in stray prose), then requires it to deserialize into
/// [`RecapSections`]. Non-premium results have the premium fields stripped so
/// a free recap can never carry them, whatever the model returned.
pub fn parse_generated(raw: &str, is_premium: bool) -> std::result::Result<RecapSections, ParseFailure> {
    let start = raw.find('{').ok_or(ParseFailure::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ParseFailure::NoJsonObject)?;
    if end < start {
        return Err(ParseFailure::NoJsonObject);
    }

    let mut sections: RecapSections = serde_json::from_str(&raw[start..=end])?;
    if !is_premium {
        sections.personal_synthesis = None;
        sections.practice_visualization = None;
    }
    Ok(sections)
}

// ---------------------------------------------------------------------------
// Recap row + store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecap {
    pub id: String,
    pub user_id: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub is_premium: bool,
    #[serde(flatten)]
    pub sections: RecapSections,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    /// Insert a recap for (user, week) unless one already exists, then return
    /// the persisted row. A concurrent duplicate create folds into a re-read
    /// of the winner; the unique index guarantees one row per (user, week).
    pub fn insert_recap_if_absent(
        &self,
        user_id: &str,
        week_start: NaiveDate,
        week_end: NaiveDate,
        is_premium: bool,
        sections: &RecapSections,
    ) -> Result<WeeklyRecap> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO weekly_recaps
                 (id, user_id, week_start_date, week_end_date, is_premium,
                  scripture_section, body_section, community_section, prompting_section,
                  personal_synthesis, practice_visualization, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                 ON CONFLICT(user_id, week_start_date) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    week_start.to_string(),
                    week_end.to_string(),
                    is_premium as i32,
                    serde_json::to_string(&sections.scripture_section)?,
                    serde_json::to_string(&sections.body_section)?,
                    serde_json::to_string(&sections.community_section)?,
                    serde_json::to_string(&sections.prompting_section)?,
                    sections.personal_synthesis,
                    sections
                        .practice_visualization
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()?,
                    now,
                ],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        self.recap_for_week(user_id, week_start)?
            .ok_or_else(|| SelahError::RecapNotFound(week_start.to_string()))
    }

    /// Overwrite an existing recap's generated content with a premium
    /// regeneration. The row id and `created_at` are preserved; sections,
    /// the premium flag, premium fields, and `updated_at` are replaced.
    pub fn overwrite_recap_premium(
        &self,
        user_id: &str,
        week_start: NaiveDate,
        sections: &RecapSections,
    ) -> Result<WeeklyRecap> {
        let affected = self
            .conn
            .execute(
                "UPDATE weekly_recaps SET
                    is_premium = 1,
                    scripture_section = ?3,
                    body_section = ?4,
                    community_section = ?5,
                    prompting_section = ?6,
                    personal_synthesis = ?7,
                    practice_visualization = ?8,
                    updated_at = ?9
                 WHERE user_id = ?1 AND week_start_date = ?2",
                params![
                    user_id,
                    week_start.to_string(),
                    serde_json::to_string(&sections.scripture_section)?,
                    serde_json::to_string(&sections.body_section)?,
                    serde_json::to_string(&sections.community_section)?,
                    serde_json::to_string(&sections.prompting_section)?,
                    sections.personal_synthesis,
                    sections
                        .practice_visualization
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()?,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        if affected == 0 {
            return Err(SelahError::RecapNotFound(week_start.to_string()));
        }
        self.recap_for_week(user_id, week_start)?
            .ok_or_else(|| SelahError::RecapNotFound(week_start.to_string()))
    }

    /// Exact lookup for one week.
    pub fn recap_for_week(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyRecap>> {
        self.conn
            .query_row(
                &format!("{RECAP_SELECT} WHERE user_id = ?1 AND week_start_date = ?2"),
                params![user_id, week_start.to_string()],
                recap_from_row,
            )
            .optional()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?
            .map(|row| row.into_recap())
            .transpose()
    }

    /// All recaps for a user, newest week first. Unbounded by design.
    pub fn recap_history(&self, user_id: &str) -> Result<Vec<WeeklyRecap>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{RECAP_SELECT} WHERE user_id = ?1 ORDER BY week_start_date DESC"
            ))
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;
        let rows = stmt
            .query_map(params![user_id], recap_from_row)
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        let mut recaps = Vec::new();
        for row in rows {
            let row = row.map_err(|e| SelahError::QueryFailed(e.to_string()))?;
            recaps.push(row.into_recap()?);
        }
        Ok(recaps)
    }
}

const RECAP_SELECT: &str = "SELECT id, user_id, week_start_date, week_end_date, is_premium,
        scripture_section, body_section, community_section, prompting_section,
        personal_synthesis, practice_visualization, created_at, updated_at
 FROM weekly_recaps";

struct RecapRow {
    id: String,
    user_id: String,
    week_start_date: String,
    week_end_date: String,
    is_premium: i64,
    scripture_section: String,
    body_section: String,
    community_section: String,
    prompting_section: String,
    personal_synthesis: Option<String>,
    practice_visualization: Option<String>,
    created_at: String,
    updated_at: String,
}

fn recap_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecapRow> {
    Ok(RecapRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        week_start_date: row.get(2)?,
        week_end_date: row.get(3)?,
        is_premium: row.get(4)?,
        scripture_section: row.get(5)?,
        body_section: row.get(6)?,
        community_section: row.get(7)?,
        prompting_section: row.get(8)?,
        personal_synthesis: row.get(9)?,
        practice_visualization: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl RecapRow {
    fn into_recap(self) -> Result<WeeklyRecap> {
        let parse_date = |s: &str| {
            s.parse::<NaiveDate>()
                .map_err(|e| SelahError::CorruptRow(format!("date column: {e}")))
        };
        let parse_ts = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| SelahError::CorruptRow(format!("timestamp column: {e}")))
        };

        let sections = RecapSections {
            scripture_section: serde_json::from_str(&self.scripture_section)?,
            body_section: serde_json::from_str(&self.body_section)?,
            community_section: serde_json::from_str(&self.community_section)?,
            prompting_section: serde_json::from_str(&self.prompting_section)?,
            personal_synthesis: self.personal_synthesis,
            practice_visualization: self
                .practice_visualization
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
        };

        Ok(WeeklyRecap {
            id: self.id,
            user_id: self.user_id,
            week_start_date: parse_date(&self.week_start_date)?,
            week_end_date: parse_date(&self.week_end_date)?,
            is_premium: self.is_premium != 0,
            sections,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::PracticeSummary;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_sections(premium: bool) -> RecapSections {
        RecapSections {
            scripture_section: ScriptureSection {
                reflections: vec!["You sat with the text three times.".into()],
                shared_reflections: vec![],
            },
            body_section: BodySection {
                practices: vec!["Breath Prayer".into()],
                notes: vec!["Twice this week.".into()],
            },
            community_section: CommunitySection {
                check_in_summary: "A quiet week.".into(),
                shared_posts: vec!["One post shared.".into()],
            },
            prompting_section: PromptingSection {
                suggestions: vec!["Return to Sunday's verse.".into()],
            },
            personal_synthesis: premium.then(|| "A week of slow returning.".to_string()),
            practice_visualization: premium.then(|| PracticeVisualization {
                daily_counts: vec![0, 1, 0, 1, 0, 0, 0],
                weekly_total: 2,
            }),
        }
    }

    fn premium_reply() -> String {
        serde_json::to_string(&sample_sections(true)).unwrap()
    }

    // ----- parsing -----

    #[test]
    fn parse_accepts_a_contract_conforming_reply() {
        let sections = parse_generated(&premium_reply(), true).unwrap();
        assert_eq!(sections, sample_sections(true));
    }

    #[test]
    fn parse_strips_premium_fields_for_free_tier() {
        let sections = parse_generated(&premium_reply(), false).unwrap();
        assert!(sections.personal_synthesis.is_none());
        assert!(sections.practice_visualization.is_none());
        assert_eq!(sections.scripture_section, sample_sections(true).scripture_section);
    }

    #[test]
    fn parse_tolerates_surrounding_prose() {
        let wrapped = format!("Here is your recap:\n{}\nHope that helps!", premium_reply());
        assert!(parse_generated(&wrapped, true).is_ok());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(matches!(
            parse_generated("not json", false),
            Err(ParseFailure::NoJsonObject)
        ));
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        // An object, but the sections are the wrong types.
        let raw = r#"{"scriptureSection": "oops", "bodySection": {}, "communitySection": {}, "promptingSection": {}}"#;
        assert!(matches!(
            parse_generated(raw, false),
            Err(ParseFailure::BadShape(_))
        ));
    }

    #[test]
    fn safe_default_has_all_sections_and_no_premium_fields() {
        let d = RecapSections::safe_default();
        assert!(d.scripture_section.reflections.is_empty());
        assert!(d.body_section.practices.is_empty());
        assert_eq!(d.community_section.check_in_summary, "");
        assert!(d.prompting_section.suggestions.is_empty());
        assert!(d.personal_synthesis.is_none());
        assert!(d.practice_visualization.is_none());
    }

    // ----- prompt construction -----

    #[test]
    fn data_context_includes_counts_and_excerpts() {
        let activity = ActivityData {
            reflection_texts: vec!["one".into(), "two".into(), "three".into(), "four".into()],
            practices: vec![PracticeSummary {
                title: "Breath Prayer".into(),
                completed_count: 2,
            }],
            check_in_count: 1,
            shared_post_count: 0,
            total_practice_sessions: 2,
        };
        let ctx = build_data_context(date(2025, 6, 1), date(2025, 6, 7), &activity);
        assert!(ctx.contains("2025-06-01"));
        assert!(ctx.contains("Reflections written: 4"));
        assert!(ctx.contains("Breath Prayer (completed 2 times)"));
        assert!(ctx.contains("\"three\""));
        // Only the first three excerpts are sampled.
        assert!(!ctx.contains("\"four\""));
    }

    #[test]
    fn data_context_marks_an_empty_week() {
        let activity = ActivityData {
            reflection_texts: vec![],
            practices: vec![],
            check_in_count: 0,
            shared_post_count: 0,
            total_practice_sessions: 0,
        };
        let ctx = build_data_context(date(2025, 6, 1), date(2025, 6, 7), &activity);
        assert!(ctx.contains("No reflections were written this week."));
        assert!(ctx.contains("Practices: none this week."));
    }

    #[test]
    fn system_prompt_premium_keys_only_when_premium() {
        assert!(!system_prompt(false).contains("personalSynthesis"));
        assert!(system_prompt(true).contains("personalSynthesis"));
        assert!(system_prompt(true).contains("practiceVisualization"));
    }

    // ----- store -----

    fn db_with_user() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_user("u1").unwrap();
        db
    }

    #[test]
    fn insert_then_reread_round_trips() {
        let db = db_with_user();
        let recap = db
            .insert_recap_if_absent("u1", date(2025, 6, 1), date(2025, 6, 7), false, &sample_sections(false))
            .unwrap();
        assert!(!recap.is_premium);
        assert_eq!(recap.sections, sample_sections(false));

        let read = db.recap_for_week("u1", date(2025, 6, 1)).unwrap().unwrap();
        assert_eq!(read.id, recap.id);
        assert_eq!(read.sections, recap.sections);
    }

    #[test]
    fn duplicate_insert_folds_into_the_first_row() {
        let db = db_with_user();
        let first = db
            .insert_recap_if_absent("u1", date(2025, 6, 1), date(2025, 6, 7), false, &sample_sections(false))
            .unwrap();
        // A losing racer inserts different content; the winner's row survives.
        let second = db
            .insert_recap_if_absent("u1", date(2025, 6, 1), date(2025, 6, 7), true, &sample_sections(true))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert!(!second.is_premium);

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM weekly_recaps", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn premium_overwrite_keeps_the_row_id() {
        let db = db_with_user();
        let free = db
            .insert_recap_if_absent("u1", date(2025, 6, 1), date(2025, 6, 7), false, &sample_sections(false))
            .unwrap();

        let upgraded = db
            .overwrite_recap_premium("u1", date(2025, 6, 1), &sample_sections(true))
            .unwrap();
        assert_eq!(upgraded.id, free.id);
        assert!(upgraded.is_premium);
        assert!(upgraded.sections.personal_synthesis.is_some());
        assert!(upgraded.sections.practice_visualization.is_some());
        assert_eq!(upgraded.created_at, free.created_at);
    }

    #[test]
    fn overwrite_without_a_row_is_not_found() {
        let db = db_with_user();
        assert!(matches!(
            db.overwrite_recap_premium("u1", date(2025, 6, 1), &sample_sections(true)),
            Err(SelahError::RecapNotFound(_))
        ));
    }

    #[test]
    fn history_is_newest_week_first() {
        let db = db_with_user();
        for start in [date(2025, 5, 18), date(2025, 6, 1), date(2025, 5, 25)] {
            db.insert_recap_if_absent(
                "u1",
                start,
                start + chrono::Duration::days(6),
                false,
                &sample_sections(false),
            )
            .unwrap();
        }
        let history = db.recap_history("u1").unwrap();
        let weeks: Vec<NaiveDate> = history.iter().map(|r| r.week_start_date).collect();
        assert_eq!(weeks, vec![date(2025, 6, 1), date(2025, 5, 25), date(2025, 5, 18)]);
    }

    #[test]
    fn deleting_a_user_cascades_to_recaps() {
        let db = db_with_user();
        db.insert_recap_if_absent("u1", date(2025, 6, 1), date(2025, 6, 7), false, &sample_sections(false))
            .unwrap();
        db.conn
            .execute("DELETE FROM users WHERE id = 'u1'", [])
            .unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM weekly_recaps", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
