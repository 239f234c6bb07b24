//! Recap delivery preferences: which day a recap should arrive and at what
//! local time. Every user has an effective preference; a row is created with
//! the defaults the first time it is read.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Result, SelahError};

/// When the weekly recap is delivered. `Disabled` keeps the preference row
/// but suppresses delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryDay {
    Sunday,
    Monday,
    Disabled,
}

impl DeliveryDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryDay::Sunday => "sunday",
            DeliveryDay::Monday => "monday",
            DeliveryDay::Disabled => "disabled",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "sunday" => Ok(DeliveryDay::Sunday),
            "monday" => Ok(DeliveryDay::Monday),
            "disabled" => Ok(DeliveryDay::Disabled),
            other => Err(SelahError::InvalidDeliveryDay(other.to_string())),
        }
    }
}

/// Validate a delivery time of the form `HH:MM` on a 24-hour clock.
pub fn validate_delivery_time(s: &str) -> Result<()> {
    let bad = || SelahError::InvalidDeliveryTime(s.to_string());

    let (hh, mm) = s.split_once(':').ok_or_else(bad)?;
    if hh.len() != 2
        || mm.len() != 2
        || !hh.chars().all(|c| c.is_ascii_digit())
        || !mm.chars().all(|c| c.is_ascii_digit())
    {
        return Err(bad());
    }
    let hours: u8 = hh.parse().map_err(|_| bad())?;
    let minutes: u8 = mm.parse().map_err(|_| bad())?;
    if hours > 23 || minutes > 59 {
        return Err(bad());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapPreferences {
    pub user_id: String,
    pub delivery_day: DeliveryDay,
    pub delivery_time: String,
    pub updated_at: DateTime<Utc>,
}

const DEFAULT_DAY: DeliveryDay = DeliveryDay::Sunday;
const DEFAULT_TIME: &str = "08:00";

impl Database {
    /// The user's delivery preferences, creating the default row
    /// (sunday, 08:00) on first read.
    pub fn preferences_for(&self, user_id: &str) -> Result<RecapPreferences> {
        if let Some(prefs) = self.read_preferences(user_id)? {
            return Ok(prefs);
        }

        self.conn
            .execute(
                "INSERT INTO recap_preferences (id, user_id, delivery_day, delivery_time, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    DEFAULT_DAY.as_str(),
                    DEFAULT_TIME,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        self.read_preferences(user_id)?
            .ok_or_else(|| SelahError::UserNotFound(user_id.to_string()))
    }

    /// Replace both preference fields. The inputs are validated before any
    /// write; an invalid update leaves the stored row untouched.
    pub fn update_preferences(
        &self,
        user_id: &str,
        delivery_day: &str,
        delivery_time: &str,
    ) -> Result<RecapPreferences> {
        let day = DeliveryDay::parse(delivery_day)?;
        validate_delivery_time(delivery_time)?;

        self.conn
            .execute(
                "INSERT INTO recap_preferences (id, user_id, delivery_day, delivery_time, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id) DO UPDATE SET
                    delivery_day = excluded.delivery_day,
                    delivery_time = excluded.delivery_time,
                    updated_at = excluded.updated_at",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    day.as_str(),
                    delivery_time,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?;

        self.read_preferences(user_id)?
            .ok_or_else(|| SelahError::UserNotFound(user_id.to_string()))
    }

    fn read_preferences(&self, user_id: &str) -> Result<Option<RecapPreferences>> {
        self.conn
            .query_row(
                "SELECT user_id, delivery_day, delivery_time, updated_at
                 FROM recap_preferences WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| SelahError::QueryFailed(e.to_string()))?
            .map(|(user_id, day, time, updated_at)| {
                Ok(RecapPreferences {
                    user_id,
                    delivery_day: DeliveryDay::parse(&day)
                        .map_err(|_| SelahError::CorruptRow(format!("delivery_day: {day}")))?,
                    delivery_time: time,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| SelahError::CorruptRow(format!("updated_at: {e}")))?,
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_user("u1").unwrap();
        db
    }

    #[test]
    fn first_read_creates_the_default_row() {
        let db = db_with_user();
        let prefs = db.preferences_for("u1").unwrap();
        assert_eq!(prefs.delivery_day, DeliveryDay::Sunday);
        assert_eq!(prefs.delivery_time, "08:00");

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM recap_preferences", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn repeated_reads_reuse_the_same_row() {
        let db = db_with_user();
        let first = db.preferences_for("u1").unwrap();
        let second = db.preferences_for("u1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn update_replaces_both_fields() {
        let db = db_with_user();
        let prefs = db.update_preferences("u1", "monday", "21:30").unwrap();
        assert_eq!(prefs.delivery_day, DeliveryDay::Monday);
        assert_eq!(prefs.delivery_time, "21:30");

        let read = db.preferences_for("u1").unwrap();
        assert_eq!(read.delivery_day, DeliveryDay::Monday);
        assert_eq!(read.delivery_time, "21:30");
    }

    #[test]
    fn update_works_without_a_prior_read() {
        let db = db_with_user();
        let prefs = db.update_preferences("u1", "disabled", "08:00").unwrap();
        assert_eq!(prefs.delivery_day, DeliveryDay::Disabled);
    }

    #[test]
    fn invalid_day_is_rejected_and_nothing_is_stored() {
        let db = db_with_user();
        db.preferences_for("u1").unwrap();
        assert!(matches!(
            db.update_preferences("u1", "saturday", "08:00"),
            Err(SelahError::InvalidDeliveryDay(_))
        ));
        assert_eq!(db.preferences_for("u1").unwrap().delivery_day, DeliveryDay::Sunday);
    }

    #[test]
    fn invalid_time_is_rejected() {
        let db = db_with_user();
        for bad in ["8:00", "08:0", "24:00", "08:60", "0800", "ab:cd", ""] {
            assert!(
                matches!(
                    db.update_preferences("u1", "sunday", bad),
                    Err(SelahError::InvalidDeliveryTime(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn boundary_times_are_accepted() {
        let db = db_with_user();
        assert!(db.update_preferences("u1", "sunday", "00:00").is_ok());
        assert!(db.update_preferences("u1", "sunday", "23:59").is_ok());
    }
}
