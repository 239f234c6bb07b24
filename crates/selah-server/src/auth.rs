//! Request identity and admin gating.
//!
//! The session gateway in front of this service terminates authentication
//! and forwards the caller's opaque id in the `x-user-id` header. This
//! module trusts that header; there is no credential handling here. The
//! seed endpoint is additionally gated by a shared admin token carried in
//! `x-admin-token`.

use axum::http::HeaderMap;

use crate::error::AppError;
use crate::state::AppState;

pub const USER_HEADER: &str = "x-user-id";
pub const ADMIN_HEADER: &str = "x-admin-token";

/// Pull the caller's user id out of the forwarded identity header.
pub fn user_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::unauthorized(format!("missing {USER_HEADER} header")))
}

/// Require the shared admin token. A server started without one refuses
/// all admin requests rather than leaving the endpoint open.
pub fn require_admin(app: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = app.admin_token.as_deref() else {
        return Err(AppError::forbidden("admin endpoints are disabled"));
    };
    let presented = headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(AppError::forbidden("admin token required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    use selah_core::clock::FixedClock;
    use selah_core::Database;
    use selah_llm::{Result as LlmResult, TextGenerator};

    struct NoGenerator;

    impl TextGenerator for NoGenerator {
        fn generate<'a>(
            &'a self,
            _system_prompt: &'a str,
            _user_prompt: &'a str,
        ) -> futures::future::BoxFuture<'a, LlmResult<String>> {
            Box::pin(async { Ok(String::new()) })
        }
    }

    fn app_state(admin_token: Option<String>) -> AppState {
        AppState::new(
            Database::open_in_memory().unwrap(),
            Arc::new(FixedClock(
                chrono::NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
            )),
            Arc::new(NoGenerator),
            admin_token,
        )
    }

    #[test]
    fn user_id_reads_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("user-42"));
        assert_eq!(user_id(&headers).unwrap(), "user-42");
    }

    #[test]
    fn missing_header_is_401() {
        let err = user_id(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.into_response().status(), 401);
    }

    #[test]
    fn blank_header_is_401() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("   "));
        let err = user_id(&headers).unwrap_err();
        assert_eq!(err.into_response().status(), 401);
    }

    #[test]
    fn matching_admin_token_passes() {
        let app = app_state(Some("seed-me".into()));
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_HEADER, HeaderValue::from_static("seed-me"));
        assert!(require_admin(&app, &headers).is_ok());
    }

    #[test]
    fn wrong_admin_token_is_403() {
        let app = app_state(Some("seed-me".into()));
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_HEADER, HeaderValue::from_static("wrong"));
        let err = require_admin(&app, &headers).unwrap_err();
        assert_eq!(err.into_response().status(), 403);
    }

    #[test]
    fn no_configured_token_disables_admin() {
        let app = app_state(None);
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_HEADER, HeaderValue::from_static("anything"));
        let err = require_admin(&app, &headers).unwrap_err();
        assert_eq!(err.into_response().status(), 403);
    }
}
