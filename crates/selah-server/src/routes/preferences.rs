use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use selah_core::prefs::RecapPreferences;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/recaps/preferences — the user's delivery preferences, created
/// with defaults (sunday, 08:00) on first read.
pub async fn get_preferences(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RecapPreferences>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let prefs = app
        .with_db(move |db| {
            db.ensure_user(&user_id)?;
            db.preferences_for(&user_id)
        })
        .await?;
    Ok(Json(prefs))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesBody {
    // snake spellings accepted as aliases
    #[serde(alias = "delivery_day")]
    pub delivery_day: String,
    #[serde(alias = "delivery_time")]
    pub delivery_time: String,
}

/// PUT /api/recaps/preferences — replace both preference fields. Invalid
/// values are rejected with 400 before anything is written.
pub async fn put_preferences(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdatePreferencesBody>,
) -> Result<Json<RecapPreferences>, AppError> {
    let user_id = auth::user_id(&headers)?;
    let prefs = app
        .with_db(move |db| {
            db.ensure_user(&user_id)?;
            db.update_preferences(&user_id, &body.delivery_day, &body.delivery_time)
        })
        .await?;
    Ok(Json(prefs))
}
