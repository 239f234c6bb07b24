use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use selah_core::clock::last_completed_week;
use selah_core::recap::WeeklyRecap;

use crate::auth;
use crate::error::AppError;
use crate::recaps;
use crate::state::AppState;

/// GET /api/recaps/current — the recap for the last completed week,
/// generating and storing a free-tier one on first request. Subsequent
/// requests return the stored row unchanged.
pub async fn get_current(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WeeklyRecap>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let (week_start, _) = last_completed_week(app.clock.as_ref());
    let recap = recaps::get_or_create(&app, &user_id, week_start).await?;
    Ok(Json(recap))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    // accepted as either `isPremium` or the bare `premium`
    #[serde(default, alias = "premium")]
    pub is_premium: bool,
}

/// POST /api/recaps/generate — regenerate the last completed week's recap.
/// A free request against an existing recap is a no-op; a premium request
/// re-aggregates and overwrites the stored sections.
pub async fn generate(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateBody>,
) -> Result<Json<WeeklyRecap>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let recap = recaps::regenerate(&app, &user_id, body.is_premium).await?;
    Ok(Json(recap))
}

/// GET /api/recaps — full recap history, newest week first.
pub async fn history(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WeeklyRecap>>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let recaps = app
        .with_db(move |db| db.recap_history(&user_id))
        .await?;
    Ok(Json(recaps))
}

/// GET /api/recaps/{week_start} — the recap for an explicit past week.
pub async fn get_by_week(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(week_start): Path<String>,
) -> Result<Json<WeeklyRecap>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let week = week_start
        .parse::<NaiveDate>()
        .map_err(|_| AppError::bad_request(format!("invalid week start '{week_start}'")))?;

    let recap = app
        .with_db(move |db| db.recap_for_week(&user_id, week))
        .await?
        .ok_or_else(|| AppError::not_found(format!("no recap for week starting {week}")))?;
    Ok(Json(recap))
}
