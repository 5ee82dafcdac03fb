// src/handlers/cases.rs

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
    models::cases::{
        AddDocumentPayload, ArchivePayload, Case, CaseDetail, CaseDocument, CaseFilter, CaseNote,
        CreateCasePayload, CreateNotePayload, CreateTimelinePayload, TimelineEntry,
        UpdateCasePayload,
    },
};

// =============================================================================
//  CASOS
// =============================================================================

// GET /api/cases?archived=&status=&caseType=
#[utoipa::path(
    get,
    path = "/api/cases",
    tag = "Cases",
    params(
        ("archived" = Option<bool>, Query, description = "Por defecto sólo activos"),
        ("status" = Option<String>, Query, description = "activo | en_proceso | suspendido | cerrado"),
        ("caseType" = Option<String>, Query, description = "penal | familiar | civil | amparos")
    ),
    responses((status = 200, description = "Lista de casos", body = Vec<Case>)),
    security(("api_jwt" = []))
)]
pub async fn list_cases(
    State(app_state): State<AppState>,
    Query(filter): Query<CaseFilter>,
) -> Result<Json<Vec<Case>>, AppError> {
    let cases = app_state.case_service.list(&filter).await?;
    Ok(Json(cases))
}

// GET /api/cases/{id}
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses(
        (status = 200, description = "Caso con notas, documentos, audiencias y línea de tiempo", body = CaseDetail),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_case(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseDetail>, AppError> {
    let detail = app_state.case_service.get_detail(id).await?;
    Ok(Json(detail))
}

// POST /api/cases
#[utoipa::path(
    post,
    path = "/api/cases",
    tag = "Cases",
    request_body = CreateCasePayload,
    responses(
        (status = 201, description = "Caso creado", body = Case),
        (status = 400, description = "Datos inválidos o sin documento"),
        (status = 403, description = "Rol insuficiente"),
        (status = 409, description = "Número de caso repetido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_case(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Json(payload): Json<CreateCasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let case = app_state.case_service.create(&payload, editor.user.id).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

// PUT /api/cases/{id}
#[utoipa::path(
    put,
    path = "/api/cases/{id}",
    tag = "Cases",
    request_body = UpdateCasePayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses(
        (status = 200, description = "Caso actualizado", body = Case),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_case(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCasePayload>,
) -> Result<Json<Case>, AppError> {
    payload.validate()?;

    let case = app_state.case_service.update(id, &payload, editor.user.id).await?;
    Ok(Json(case))
}

// POST /api/cases/{id}/archive
#[utoipa::path(
    post,
    path = "/api/cases/{id}/archive",
    tag = "Cases",
    request_body = ArchivePayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 200, description = "Caso archivado o restaurado", body = Case)),
    security(("api_jwt" = []))
)]
pub async fn archive_case(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArchivePayload>,
) -> Result<Json<Case>, AppError> {
    let case = app_state
        .case_service
        .set_archived(id, payload.archived, editor.user.id)
        .await?;
    Ok(Json(case))
}

// DELETE /api/cases/{id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses(
        (status = 204, description = "Caso y dependientes eliminados"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_case(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.case_service.delete(id).await?;
    tracing::info!("🗑️ Caso {} eliminado por {} ({:?})", id, editor.user.email, editor.role);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  NOTAS
// =============================================================================

// GET /api/cases/{id}/notes
#[utoipa::path(
    get,
    path = "/api/cases/{id}/notes",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 200, description = "Notas del caso", body = Vec<CaseNote>)),
    security(("api_jwt" = []))
)]
pub async fn list_notes(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<CaseNote>>, AppError> {
    let notes = app_state.case_service.list_notes(case_id).await?;
    Ok(Json(notes))
}

// POST /api/cases/{id}/notes
#[utoipa::path(
    post,
    path = "/api/cases/{id}/notes",
    tag = "Cases",
    request_body = CreateNotePayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 201, description = "Nota agregada", body = CaseNote)),
    security(("api_jwt" = []))
)]
pub async fn add_note(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let note = app_state
        .case_service
        .add_note(case_id, &payload.content, editor.user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

// DELETE /api/cases/{id}/notes/{note_id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/notes/{note_id}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "ID del caso"),
        ("note_id" = Uuid, Path, description = "ID de la nota")
    ),
    responses((status = 204, description = "Nota eliminada")),
    security(("api_jwt" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    _editor: RequireRole<LegalEditor>,
    Path((case_id, note_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.case_service.delete_note(case_id, note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  DOCUMENTOS
// =============================================================================

// GET /api/cases/{id}/documents
#[utoipa::path(
    get,
    path = "/api/cases/{id}/documents",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 200, description = "Documentos del caso", body = Vec<CaseDocument>)),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<CaseDocument>>, AppError> {
    let documents = app_state.case_service.list_documents(case_id).await?;
    Ok(Json(documents))
}

// POST /api/cases/{id}/documents
#[utoipa::path(
    post,
    path = "/api/cases/{id}/documents",
    tag = "Cases",
    request_body = AddDocumentPayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 201, description = "Documento registrado", body = CaseDocument)),
    security(("api_jwt" = []))
)]
pub async fn add_document(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<AddDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let document = app_state
        .case_service
        .add_document(case_id, &payload, editor.user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

// DELETE /api/cases/{id}/documents/{document_id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/documents/{document_id}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "ID del caso"),
        ("document_id" = Uuid, Path, description = "ID del documento")
    ),
    responses((status = 204, description = "Documento y archivo eliminados")),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    _editor: RequireRole<LegalEditor>,
    Path((case_id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.case_service.delete_document(case_id, document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  LÍNEA DE TIEMPO
// =============================================================================

// GET /api/cases/{id}/timeline
#[utoipa::path(
    get,
    path = "/api/cases/{id}/timeline",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 200, description = "Eventos, más recientes primero", body = Vec<TimelineEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_timeline(
    State(app_state): State<AppState>,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEntry>>, AppError> {
    let entries = app_state.case_service.list_timeline(case_id).await?;
    Ok(Json(entries))
}

// POST /api/cases/{id}/timeline
#[utoipa::path(
    post,
    path = "/api/cases/{id}/timeline",
    tag = "Cases",
    request_body = CreateTimelinePayload,
    params(("id" = Uuid, Path, description = "ID del caso")),
    responses((status = 201, description = "Evento agregado", body = TimelineEntry)),
    security(("api_jwt" = []))
)]
pub async fn add_timeline_entry(
    State(app_state): State<AppState>,
    editor: RequireRole<LegalEditor>,
    Path(case_id): Path<Uuid>,
    Json(payload): Json<CreateTimelinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .case_service
        .add_timeline_entry(case_id, &payload, editor.user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// DELETE /api/cases/{id}/timeline/{entry_id}
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/timeline/{entry_id}",
    tag = "Cases",
    params(
        ("id" = Uuid, Path, description = "ID del caso"),
        ("entry_id" = Uuid, Path, description = "ID del evento")
    ),
    responses((status = 204, description = "Evento eliminado")),
    security(("api_jwt" = []))
)]
pub async fn delete_timeline_entry(
    State(app_state): State<AppState>,
    _editor: RequireRole<LegalEditor>,
    Path((case_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    app_state.case_service.delete_timeline_entry(case_id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
