//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/`. Uploaded images are served
//! read-only from `/uploads/` straight off the blob store directory.
//! Middleware: CORS, tracing, body size limit.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use lumen_core::storage::MAX_IMAGE_BYTES;

use crate::http::handlers;
use crate::state::AppState;

/// Multipart overhead on top of the image itself (boundaries, text field).
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth (no token required)
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // Sessions
        .route(
            "/sessions",
            post(handlers::session::create_session).get(handlers::session::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        // Messages
        .route(
            "/sessions/{id}/messages",
            get(handlers::message::list_messages).post(handlers::message::send_message),
        );

    let uploads_dir = state.uploads_dir.clone();

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + BODY_LIMIT_SLACK))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
