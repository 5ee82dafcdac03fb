// src/handlers/storage.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::storage::{DeleteObjectRequest, UploadUrlRequest, UploadUrlResponse},
};

// POST /api/storage/upload-url
#[utoipa::path(
    post,
    path = "/api/storage/upload-url",
    tag = "Storage",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "URL prefirmada para subir con PUT", body = UploadUrlResponse),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_upload_url(
    State(app_state): State<AppState>,
    Json(payload): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .storage
        .upload_url(&payload, app_state.settings.upload_url_ttl_secs)?;

    tracing::info!("📤 URL de subida generada para {}", response.key);
    Ok(Json(response))
}

// DELETE /api/storage/objects
#[utoipa::path(
    delete,
    path = "/api/storage/objects",
    tag = "Storage",
    request_body = DeleteObjectRequest,
    responses((status = 204, description = "Objeto eliminado")),
    security(("api_jwt" = []))
)]
pub async fn delete_object(
    State(app_state): State<AppState>,
    Json(payload): Json<DeleteObjectRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state.storage.delete_object(&payload.key).await?;
    Ok(StatusCode::NO_CONTENT)
}
