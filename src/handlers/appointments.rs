// src/handlers/appointments.rs

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
    middleware::roles::{AdminOnly, RequireRole},
    models::appointments::{
        ApproveAppointmentPayload, Appointment, AppointmentFilter, CreateAppointmentPayload,
        RejectAppointmentPayload,
    },
};

// POST /api/appointments (público)
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Solicitud registrada", body = Appointment),
        (status = 400, description = "Datos inválidos")
    )
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let appointment = app_state.appointment_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /api/appointments?status=
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    params(("status" = Option<String>, Query, description = "pending | approved | rejected")),
    responses((status = 200, description = "Citas, más recientes primero", body = Vec<Appointment>)),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = app_state.appointment_service.list(filter.status).await?;
    Ok(Json(appointments))
}

// GET /api/appointments/{id}
#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "ID de la cita")),
    responses(
        (status = 200, description = "Cita", body = Appointment),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = app_state.appointment_service.get(id).await?;
    Ok(Json(appointment))
}

// POST /api/appointments/{id}/approve
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/approve",
    tag = "Appointments",
    request_body = ApproveAppointmentPayload,
    params(("id" = Uuid, Path, description = "ID de la cita")),
    responses(
        (status = 200, description = "Cita aprobada", body = Appointment),
        (status = 400, description = "Falta fecha u hora"),
        (status = 404, description = "No existe"),
        (status = 409, description = "Horario ocupado o cita no pendiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_appointment(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveAppointmentPayload>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = app_state.appointment_service.approve(id, &payload).await?;
    Ok(Json(appointment))
}

// POST /api/appointments/{id}/reject
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/reject",
    tag = "Appointments",
    request_body = RejectAppointmentPayload,
    params(("id" = Uuid, Path, description = "ID de la cita")),
    responses(
        (status = 200, description = "Cita rechazada", body = Appointment),
        (status = 409, description = "La cita no está pendiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_appointment(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectAppointmentPayload>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = app_state.appointment_service.reject(id, &payload).await?;
    Ok(Json(appointment))
}

// DELETE /api/appointments/{id}
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "ID de la cita")),
    responses(
        (status = 204, description = "Eliminada"),
        (status = 404, description = "No existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_appointment(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.appointment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
