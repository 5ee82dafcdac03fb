// src/handlers/hearings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{LegalEditor, RequireRole},
    models::hearings::{
        AgendaEntry, AgendaFilter, CreateHearingPayload, Hearing, UpdateHearingPayload,
    },
};

// GET /api/hearings?from=&to=&status=
#[utoipa::path(
    get,
    path = "/api/hearings",
    tag = "Hearings",
    params(
        ("from" = Option<String>, Query, description = "Fecha inicial (YYYY-MM-DD), por defecto hoy"),
        ("to" = Option<String>, Query, description = "Fecha final (YYYY-MM-DD)"),
        ("status" = Option<String>, Query, description = "programada | celebrada | diferida | cancelada")
    ),
    responses((status = 200, description = "Agenda de audiencias", body = Vec<AgendaEntry>)),
    security(("api_jwt" = []))
)]
pub async fn agenda(
    State(app_state): State<AppState>,
    Query(filter): Query<AgendaFilter>,
) -> Result<Json<Vec<AgendaEntry>>, AppError> {
    let entries = app_state.hearing_service.agenda(&filter).await?;
    Ok(Json(entries))
}

// GET /api/cases/{id}/hearings
#[utoipa::path(
    get,
    path = "/api/cases/{id}/hearings",
    tag = "Hearings",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses(
        (status = 200, description = "Audiencias del caso", body = Vec<Hearing>),
        (status = 404, description = "El caso no existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_case_hearings(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<Hearing>>, AppError> {
    let hearings = app_state.hearing_service.list_for_case(case_id).await?;
    Ok(Json(hearings))
}

// POST /api/cases/{id}/hearings
#[utoipa::path(
    post,
    path = "/api/cases/{id}/hearings",
    tag = "Hearings",
    request_body = CreateHearingPayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses(
        (status = 201, description = "Audiencia programada con su AUTO", body = Hearing),
        (status = 400, description = "Falta el AUTO o datos inválidos"),
        (status = 404, description = "El caso no existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_hearing(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateHearingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hearing = app_state
        .hearing_service
        .create(case_id, &payload, editor.user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(hearing)))
}

// PUT /api/hearings/{id}
#[utoipa::path(
    put,
    path = "/api/hearings/{id}",
    tag = "Hearings",
    request_body = UpdateHearingPayload,
    params(("id" = Uuid, Path, description = "ID de la audiencia")),
    responses(
        (status = 200, description = "Audiencia actualizada", body = Hearing),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hearing(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHearingPayload>,
) -> Result<Json<Hearing>, AppError> {
    payload.validate()?;

    let hearing = app_state.hearing_service.update(id, &payload, editor.user.id).await?;
    Ok(Json(hearing))
}

// DELETE /api/hearings/{id}
#[utoipa::path(
    delete,
    path = "/api/hearings/{id}",
    tag = "Hearings",
    params(("id" = Uuid, Path, description = "ID de la audiencia")),
    responses(
        (status = 204, description = "Audiencia eliminada"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_hearing(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.hearing_service.delete(id, editor.user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
