// src/handlers/auth.rs

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
    middleware::{
        auth::AuthenticatedUser,
        roles::{AdminOnly, RequireRole},
    },
    models::auth::{
        AcceptInvitePayload, AuthResponse, Invitation, InvitePayload, LoginPayload,
        OtpRequestPayload, OtpVerifyPayload, SetRolePayload, SignupPayload, UserProfile,
    },
};

// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Usuario creado", body = AuthResponse),
        (status = 400, description = "Datos inválidos"),
        (status = 409, description = "Correo ya registrado")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .signup(&payload.email, &payload.password, payload.full_name.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sesión iniciada", body = AuthResponse),
        (status = 401, description = "Credenciales inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state.auth_service.login(&payload.email, &payload.password).await?;
    Ok(Json(AuthResponse { token }))
}

// POST /api/auth/otp
#[utoipa::path(
    post,
    path = "/api/auth/otp",
    tag = "Auth",
    request_body = OtpRequestPayload,
    responses((status = 202, description = "Si el correo existe, se envió un código"))
)]
pub async fn request_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<OtpRequestPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state.auth_service.request_otp(&payload.email).await?;
    Ok(StatusCode::ACCEPTED)
}

// POST /api/auth/otp/verify
#[utoipa::path(
    post,
    path = "/api/auth/otp/verify",
    tag = "Auth",
    request_body = OtpVerifyPayload,
    responses(
        (status = 200, description = "Código válido", body = AuthResponse),
        (status = 401, description = "Código inválido o expirado")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<OtpVerifyPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state.auth_service.verify_otp(&payload.email, &payload.code).await?;
    Ok(Json(AuthResponse { token }))
}

// POST /api/auth/invite
#[utoipa::path(
    post,
    path = "/api/auth/invite",
    tag = "Auth",
    request_body = InvitePayload,
    responses(
        (status = 201, description = "Invitación enviada", body = Invitation),
        (status = 403, description = "Sólo administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite(
    State(app_state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Json(payload): Json<InvitePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invitation = app_state
        .auth_service
        .invite(&payload.email, payload.role, admin.user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

// POST /api/auth/invite/accept
#[utoipa::path(
    post,
    path = "/api/auth/invite/accept",
    tag = "Auth",
    request_body = AcceptInvitePayload,
    responses(
        (status = 200, description = "Invitación aceptada", body = AuthResponse),
        (status = 400, description = "Invitación inválida o expirada")
    )
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    Json(payload): Json<AcceptInvitePayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .accept_invite(&payload.token, &payload.password, payload.full_name.as_deref())
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuario actual con su rol", body = UserProfile),
        (status = 401, description = "Token inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = app_state.auth_service.profile(user.id).await?;
    Ok(Json(profile))
}

// PUT /api/users/{id}/role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    request_body = SetRolePayload,
    params(("id" = Uuid, Path, description = "ID del usuario")),
    responses(
        (status = 200, description = "Rol actualizado", body = UserProfile),
        (status = 403, description = "Sólo administradores"),
        (status = 404, description = "Usuario no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_user_role(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetRolePayload>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = app_state.auth_service.set_role(user_id, payload.role).await?;
    Ok(Json(profile))
}
