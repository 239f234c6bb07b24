use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use selah_core::theme::PreviewContent;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/content/current — this week's theme and today's scripture for the
/// signed-in user. 404s distinguish "rotation not seeded for this week" from
/// "no content row for today."
pub async fn get_current(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    auth::user_id(&headers)?;

    let clock = app.clock.clone();
    let (theme, daily) = app
        .with_db(move |db| db.current_daily_content(clock.as_ref()))
        .await?;

    Ok(Json(serde_json::json!({
        "theme": theme,
        "dailyContent": daily,
    })))
}

/// GET /api/content/preview — unauthenticated preview of today's content.
/// Never 404s: when the rotation is unseeded or today's row is missing it
/// serves the fixed fallback verse instead.
pub async fn get_preview(
    State(app): State<AppState>,
) -> Result<Json<PreviewContent>, AppError> {
    let clock = app.clock.clone();
    let preview = app.with_db(move |db| db.preview_content(clock.as_ref())).await?;
    Ok(Json(preview))
}
