//! File handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{CurrentUser, Gateway, UserDirectory};
use crate::db::User;
use crate::file::{DeleteOutcome, FileService, ListFilter, UploadRequest};
use crate::web::dto::{
    ApiResponse, DeleteFileRequest, DeleteFileResponse, FileResponse, ListFilesQuery,
    RenameFileRequest, UpdateFileUsersRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionSecret;

fn file_service<'a>(state: &'a AppState, gateway: &'a Gateway<'a>) -> FileService<'a> {
    FileService::new(gateway, &state.cache)
        .with_public_base_url(state.config.storage.public_base_url.clone())
        .with_max_file_size(state.config.storage.max_upload_size_mb * 1024 * 1024)
}

async fn require_user(state: &AppState, gateway: &Gateway<'_>, secret: &SessionSecret) -> Result<User, ApiError> {
    let directory = UserDirectory::new(gateway).with_lifetimes(
        state.config.session.otp_lifetime_mins,
        state.config.session.lifetime_days,
    );
    match directory.current_user(secret.as_deref()).await {
        CurrentUser::Found(user) => Ok(user),
        _ => Err(ApiError::unauthorized("Not signed in")),
    }
}

/// Generate a safe Content-Disposition header value for downloads.
///
/// Control characters are stripped and quotes/backslashes replaced so the
/// filename cannot break out of the header.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!("attachment; filename=\"{sanitized}\"")
}

/// POST /api/files - Upload a file (multipart: `file`, `path`).
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let gateway = Gateway::new(&state.db, &state.bucket);
    let user = require_user(&state, &gateway, &secret).await?;

    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut path = "/".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Bad multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Bad file field: {e}")))?;
                content = Some(bytes.to_vec());
            }
            Some("path") => {
                path = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Bad path field: {e}")))?;
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("Missing file field"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    let service = file_service(&state, &gateway);
    let doc = service
        .upload(&UploadRequest {
            filename,
            content,
            owner_id: user.id,
            account_id: user.account_id,
            path,
        })
        .await?;

    Ok(Json(ApiResponse::new(doc.into())))
}

/// GET /api/files - List the files visible to the caller.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let mut filter = ListFilter::default();

    if let Some(ref types) = query.types {
        for part in types.split(',').filter(|s| !s.trim().is_empty()) {
            let file_type = part.trim().parse().map_err(ApiError::bad_request)?;
            filter.types.push(file_type);
        }
    }

    if let Some(ref search) = query.search {
        if !search.is_empty() {
            filter.search_text = Some(search.clone());
        }
    }

    if let Some(ref sort) = query.sort {
        filter.sort = Some(sort.parse().map_err(ApiError::bad_request)?);
    }

    if let Some(limit) = query.limit {
        if limit <= 0 {
            return Err(ApiError::bad_request("Limit must be positive"));
        }
        filter.limit = Some(limit);
    }

    let gateway = Gateway::new(&state.db, &state.bucket);
    let docs = file_service(&state, &gateway)
        .list(secret.as_deref(), &filter)
        .await?;

    let responses: Vec<FileResponse> = docs.into_iter().map(FileResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// PATCH /api/files/:id/rename - Rename a file.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    Path(file_id): Path<String>,
    Json(req): Json<RenameFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let doc = file_service(&state, &gateway)
        .rename(
            secret.as_deref(),
            &file_id,
            &req.name,
            &req.extension,
            &req.account_id,
            &req.path,
        )
        .await?;

    Ok(Json(ApiResponse::new(doc.into())))
}

/// PATCH /api/files/:id/users - Replace a file's shared-email set.
pub async fn update_file_users(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    Path(file_id): Path<String>,
    Json(req): Json<UpdateFileUsersRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let doc = file_service(&state, &gateway)
        .update_shared_users(
            secret.as_deref(),
            &file_id,
            &req.emails,
            &req.account_id,
            &req.path,
        )
        .await?;

    Ok(Json(ApiResponse::new(doc.into())))
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    Path(file_id): Path<String>,
    Json(req): Json<DeleteFileRequest>,
) -> Result<Json<ApiResponse<DeleteFileResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let outcome = file_service(&state, &gateway)
        .delete(
            secret.as_deref(),
            &file_id,
            &req.bucket_file_id,
            &req.account_id,
            &req.path,
        )
        .await?;

    match outcome {
        DeleteOutcome::Deleted => Ok(Json(ApiResponse::new(DeleteFileResponse {
            status: "success".to_string(),
        }))),
        DeleteOutcome::DocumentMissing => Err(ApiError::not_found("file not found")),
    }
}

/// GET /api/files/:id/view - Download a file's bytes.
///
/// The path parameter is the bucket file id recorded on the document.
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    Path(bucket_file_id): Path<String>,
) -> Result<Response, ApiError> {
    let gateway = Gateway::new(&state.db, &state.bucket);
    let (doc, content) = file_service(&state, &gateway)
        .open(secret.as_deref(), &bucket_file_id)
        .await?;

    let content_type = mime_guess::from_ext(&doc.extension)
        .first_or_octet_stream()
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                content_disposition_header(&doc.name),
            ),
        ],
        content,
    )
        .into_response())
}
