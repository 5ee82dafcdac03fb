// src/handlers/contact.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::contact::ContactPayload};

// POST /api/contact (público)
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactPayload,
    responses(
        (status = 202, description = "Mensaje reenviado al equipo"),
        (status = 400, description = "Datos inválidos"),
        (status = 502, description = "El proveedor de correo falló")
    )
)]
pub async fn send_contact(
    State(app_state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state.appointment_service.contact(&payload).await?;
    Ok(StatusCode::ACCEPTED)
}
