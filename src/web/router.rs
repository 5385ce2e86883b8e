//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, list_files, me, rename_file, resend_otp, sign_in, sign_out, sign_up,
    update_file_users, upload_file, usage_media, usage_summary, verify_otp, view_file, AppState,
};
use super::middleware::create_cors_layer;

/// Extra headroom on the body limit for multipart framing.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/otp/resend", post(resend_otp))
        .route("/verify", post(verify_otp))
        .route("/me", get(me))
        .route("/sign-out", post(sign_out));

    let file_routes = Router::new()
        .route("/", post(upload_file).get(list_files))
        .route("/:id/rename", patch(rename_file))
        .route("/:id/users", patch(update_file_users))
        .route("/:id", delete(delete_file))
        .route("/:id/view", get(view_file));

    let usage_routes = Router::new()
        .route("/summary", get(usage_summary))
        .route("/media", get(usage_media));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes)
        .nest("/usage", usage_routes);

    let body_limit =
        state.config.storage.max_upload_size_mb as usize * 1024 * 1024 + BODY_LIMIT_OVERHEAD;
    let cors = create_cors_layer(&state.config.server.cors_origins);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
