// src/handlers/campaigns.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::campaigns::{
        Campaign, CampaignTarget, CreateCampaignPayload, SendSummary, UpdateCampaignPayload,
    },
};

// GET /api/campaigns
#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "Campaigns",
    responses((status = 200, description = "Campañas", body = Vec<Campaign>)),
    security(("api_jwt" = []))
)]
pub async fn list_campaigns(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Campaign>>, AppError> {
    let campaigns = app_state.campaign_service.list().await?;
    Ok(Json(campaigns))
}

// POST /api/campaigns
#[utoipa::path(
    post,
    path = "/api/campaigns",
    tag = "Campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Borrador creado", body = Campaign),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_campaign(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCampaignPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let campaign = app_state.campaign_service.create(&payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

// GET /api/campaigns/{id}
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    tag = "Campaigns",
    params(("id" = Uuid, Path, description = "ID de la campaña")),
    responses(
        (status = 200, description = "Campaña", body = Campaign),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_campaign(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, AppError> {
    let campaign = app_state.campaign_service.get(id).await?;
    Ok(Json(campaign))
}

// PUT /api/campaigns/{id}
#[utoipa::path(
    put,
    path = "/api/campaigns/{id}",
    tag = "Campaigns",
    request_body = UpdateCampaignPayload,
    params(("id" = Uuid, Path, description = "ID de la campaña")),
    responses(
        (status = 200, description = "Borrador actualizado", body = Campaign),
        (status = 404, description = "No existe"),
        (status = 409, description = "Sólo se editan borradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_campaign(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCampaignPayload>,
) -> Result<Json<Campaign>, AppError> {
    payload.validate()?;

    let campaign = app_state.campaign_service.update(id, &payload).await?;
    Ok(Json(campaign))
}

// DELETE /api/campaigns/{id}
#[utoipa::path(
    delete,
    path = "/api/campaigns/{id}",
    tag = "Campaigns",
    params(("id" = Uuid, Path, description = "ID de la campaña")),
    responses(
        (status = 204, description = "Campaña eliminada"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_campaign(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.campaign_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/campaigns/{id}/targets
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/targets",
    tag = "Campaigns",
    params(("id" = Uuid, Path, description = "ID de la campaña")),
    responses((status = 200, description = "Destinatarios y su estado de envío", body = Vec<CampaignTarget>)),
    security(("api_jwt" = []))
)]
pub async fn list_targets(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CampaignTarget>>, AppError> {
    let targets = app_state.campaign_service.targets(id).await?;
    Ok(Json(targets))
}

// POST /api/campaigns/{id}/send
#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/send",
    tag = "Campaigns",
    params(("id" = Uuid, Path, description = "ID de la campaña")),
    responses(
        (status = 200, description = "Resumen del envío", body = SendSummary),
        (status = 400, description = "El segmento no tiene destinatarios"),
        (status = 409, description = "La campaña ya fue enviada o está en curso")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_campaign(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SendSummary>, AppError> {
    let summary = app_state.campaign_service.send(id, user.id).await?;
    Ok(Json(summary))
}
