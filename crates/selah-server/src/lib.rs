pub mod auth;
pub mod error;
pub mod recaps;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Content
        .route("/api/content/current", get(routes::content::get_current))
        .route("/api/content/preview", get(routes::content::get_preview))
        // Admin
        .route("/api/admin/seed", post(routes::seed::seed_rotation))
        // Recaps
        .route("/api/recaps", get(routes::recaps::history))
        .route("/api/recaps/current", get(routes::recaps::get_current))
        .route("/api/recaps/generate", post(routes::recaps::generate))
        .route(
            "/api/recaps/preferences",
            get(routes::preferences::get_preferences),
        )
        .route(
            "/api/recaps/preferences",
            put(routes::preferences::put_preferences),
        )
        .route("/api/recaps/{week_start}", get(routes::recaps::get_by_week))
        .layer(cors)
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("selah API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state);

    tracing::info!("selah API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
