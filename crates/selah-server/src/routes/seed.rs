use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBody {
    // accepted as either `startDate` or `start_date`
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
}

/// POST /api/admin/seed — populate the 52-week rotation, starting from the
/// given Sunday or defaulting to the next one. One-time bootstrap: reports
/// zero themes created if any theme row already exists.
pub async fn seed_rotation(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SeedBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth::require_admin(&app, &headers)?;

    let start = body
        .start_date
        .map(|s| {
            s.parse::<NaiveDate>()
                .map_err(|_| AppError::bad_request(format!("invalid startDate '{s}'")))
        })
        .transpose()?;

    let clock = app.clock.clone();
    let created = app
        .with_db(move |db| db.seed_rotation(clock.as_ref(), start))
        .await?;

    Ok(Json(serde_json::json!({ "themesCreated": created })))
}
