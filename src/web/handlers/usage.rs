//! Storage usage handlers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::auth::{CurrentUser, Gateway, UserDirectory};
use crate::file::{TypeUsage, UsageService, MEDIA_TYPES};
use crate::web::dto::ApiResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionSecret;

/// Route path under which the dashboard summary is cached; mutations that
/// pass this path invalidate it.
pub const DASHBOARD_PATH: &str = "/dashboard";

fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// GET /api/usage/summary - Aggregate usage over the caller's owned files.
///
/// The rendered body is cached per account under the dashboard path.
pub async fn usage_summary(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
) -> Result<Response, ApiError> {
    let gateway = Gateway::new(&state.db, &state.bucket);
    let directory = UserDirectory::new(&gateway);

    let user = match directory.current_user(secret.as_deref()).await {
        CurrentUser::Found(user) => user,
        _ => return Err(ApiError::unauthorized("Not signed in")),
    };

    if let Some(body) = state.cache.get(&user.account_id, DASHBOARD_PATH) {
        return Ok(json_response(body));
    }

    let report = UsageService::new(&gateway)
        .total_usage(secret.as_deref())
        .await?;

    let body = serde_json::to_string(&ApiResponse::new(report))
        .map_err(|e| ApiError::internal(format!("Failed to render usage report: {e}")))?;

    state.cache.put(&user.account_id, DASHBOARD_PATH, body.clone());

    Ok(json_response(body))
}

/// GET /api/usage/media - Combined audio + video usage.
pub async fn usage_media(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
) -> Result<Json<ApiResponse<TypeUsage>>, ApiError> {
    let gateway = Gateway::new(&state.db, &state.bucket);
    let usage = UsageService::new(&gateway)
        .usage_for_types(secret.as_deref(), &MEDIA_TYPES)
        .await?;

    Ok(Json(ApiResponse::new(usage)))
}
