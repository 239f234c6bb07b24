//! The recap generation pipeline: aggregate a week of activity, ask the
//! model for sections, validate the reply, persist.
//!
//! Generation never fails outward. A model error, timeout, or malformed
//! reply is logged and replaced with [`RecapSections::safe_default`], so the
//! caller always receives a structurally complete recap.

use chrono::NaiveDate;
use selah_core::clock::{last_completed_week, week_end};
use selah_core::recap::{self, RecapSections, WeeklyRecap};

use crate::error::AppError;
use crate::state::AppState;

const GENERATION_TIMEOUT_SECS: u64 = 60;

/// Return the recap for (user, week) if one exists; otherwise aggregate,
/// generate a free-tier recap, insert, and return it. An existing recap is
/// returned untouched: once generated it is a stable historical record,
/// even if activity rows change afterwards.
pub async fn get_or_create(
    app: &AppState,
    user_id: &str,
    week_start: NaiveDate,
) -> Result<WeeklyRecap, AppError> {
    let week_end = week_end(week_start);
    provision_user(app, user_id).await?;

    let existing = {
        let user_id = user_id.to_string();
        app.with_db(move |db| db.recap_for_week(&user_id, week_start))
            .await?
    };
    if let Some(recap) = existing {
        return Ok(recap);
    }

    let sections = generate_sections(app, user_id, week_start, week_end, false).await?;
    let user_id = user_id.to_string();
    app.with_db(move |db| db.insert_recap_if_absent(&user_id, week_start, week_end, false, &sections))
        .await
}

/// Regenerate the recap for the last completed week.
///
/// Absent row: behaves like create, at the requested tier. Existing row and
/// a free request: no-op that returns the stored recap, whatever its tier
/// (avoids a redundant model call, and downgrade is not a transition).
/// Existing row and a premium request: re-aggregate, re-generate with the
/// premium fields, and overwrite the stored sections in place.
pub async fn regenerate(
    app: &AppState,
    user_id: &str,
    is_premium: bool,
) -> Result<WeeklyRecap, AppError> {
    let (week_start, week_end) = last_completed_week(app.clock.as_ref());
    provision_user(app, user_id).await?;

    let existing = {
        let user_id = user_id.to_string();
        app.with_db(move |db| db.recap_for_week(&user_id, week_start))
            .await?
    };

    match existing {
        None => {
            let sections = generate_sections(app, user_id, week_start, week_end, is_premium).await?;
            let user_id = user_id.to_string();
            app.with_db(move |db| {
                db.insert_recap_if_absent(&user_id, week_start, week_end, is_premium, &sections)
            })
            .await
        }
        Some(recap) if !is_premium => Ok(recap),
        Some(_) => {
            let sections = generate_sections(app, user_id, week_start, week_end, true).await?;
            let user_id = user_id.to_string();
            app.with_db(move |db| db.overwrite_recap_premium(&user_id, week_start, &sections))
                .await
        }
    }
}

/// Aggregate the week, call the model, and validate. All generation-side
/// failures degrade to the safe default.
async fn generate_sections(
    app: &AppState,
    user_id: &str,
    week_start: NaiveDate,
    week_end: NaiveDate,
    is_premium: bool,
) -> Result<RecapSections, AppError> {
    let activity = {
        let user_id = user_id.to_string();
        app.with_db(move |db| db.collect_activity(&user_id, week_start, week_end))
            .await?
    };

    let system = recap::system_prompt(is_premium);
    let context = recap::build_data_context(week_start, week_end, &activity);

    let raw = match tokio::time::timeout(
        std::time::Duration::from_secs(GENERATION_TIMEOUT_SECS),
        app.generator.generate(&system, &context),
    )
    .await
    {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, %week_start, "recap generation failed");
            return Ok(RecapSections::safe_default());
        }
        Err(_) => {
            tracing::warn!(%week_start, "recap generation timed out after {GENERATION_TIMEOUT_SECS}s");
            return Ok(RecapSections::safe_default());
        }
    };

    match recap::parse_generated(&raw, is_premium) {
        Ok(sections) => Ok(sections),
        Err(e) => {
            tracing::warn!(error = %e, %week_start, "model reply rejected, using safe default");
            Ok(RecapSections::safe_default())
        }
    }
}

/// First contact with an unknown user id creates the user row. Identity is
/// established upstream; a forwarded id is a valid guest by definition.
async fn provision_user(app: &AppState, user_id: &str) -> Result<(), AppError> {
    let user_id = user_id.to_string();
    app.with_db(move |db| db.ensure_user(&user_id)).await
}
