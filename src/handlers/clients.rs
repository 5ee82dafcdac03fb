// src/handlers/clients.rs

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
    middleware::auth::AuthenticatedUser,
    models::{
        cases::ArchivePayload,
        clients::{
            Client, ClientFilter, ClientHistoryEvent, CreateClientPayload, UpdateClientPayload,
        },
    },
};

// GET /api/clients?status=&archived=
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(
        ("status" = Option<String>, Query, description = "prospecto | activo | inactivo"),
        ("archived" = Option<bool>, Query, description = "Por defecto sólo no archivados")
    ),
    responses((status = 200, description = "Clientes", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = app_state.client_service.list(&filter).await?;
    Ok(Json(clients))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID del cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = app_state.client_service.get(id).await?;
    Ok(Json(client))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente creado", body = Client),
        (status = 400, description = "Datos inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.create(&payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = UpdateClientPayload,
    params(("id" = Uuid, Path, description = "ID del cliente")),
    responses(
        (status = 200, description = "Cliente actualizado", body = Client),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<Client>, AppError> {
    payload.validate()?;

    let client = app_state.client_service.update(id, &payload, user.id).await?;
    Ok(Json(client))
}

// POST /api/clients/{id}/archive
#[utoipa::path(
    post,
    path = "/api/clients/{id}/archive",
    tag = "Clients",
    request_body = ArchivePayload,
    params(("id" = Uuid, Path, description = "ID del cliente")),
    responses((status = 200, description = "Cliente archivado o restaurado", body = Client)),
    security(("api_jwt" = []))
)]
pub async fn archive_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArchivePayload>,
) -> Result<Json<Client>, AppError> {
    let client = app_state
        .client_service
        .set_archived(id, payload.archived, user.id)
        .await?;
    Ok(Json(client))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID del cliente")),
    responses(
        (status = 204, description = "Cliente eliminado"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.client_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/clients/{id}/history
#[utoipa::path(
    get,
    path = "/api/clients/{id}/history",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID del cliente")),
    responses((status = 200, description = "Historial, más reciente primero", body = Vec<ClientHistoryEvent>)),
    security(("api_jwt" = []))
)]
pub async fn client_history(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ClientHistoryEvent>>, AppError> {
    let events = app_state.client_service.history(id).await?;
    Ok(Json(events))
}
