// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapea el CREATE TYPE staff_role de la base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "staff_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Lawyer,
    Assistant,
    #[default]
    Viewer,
}

impl StaffRole {
    /// Roles autorizados a crear o editar casos y audiencias.
    pub fn can_edit_legal(self) -> bool {
        matches!(self, StaffRole::Admin | StaffRole::Lawyer | StaffRole::Assistant)
    }

    pub fn is_admin(self) -> bool {
        self == StaffRole::Admin
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "abogada@asme.mx")]
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    #[schema(example = "Mariana López")]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Respuesta de /me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub role: StaffRole,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmailOtp {
    pub id: Uuid,
    pub email: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: StaffRole,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token_hash: String,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[validate(email(message = "El correo no es válido."))]
    #[schema(example = "abogada@asme.mx")]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "El correo no es válido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpRequestPayload {
    #[validate(email(message = "El correo no es válido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OtpVerifyPayload {
    #[validate(email(message = "El correo no es válido."))]
    pub email: String,
    #[validate(length(equal = 6, message = "El código tiene 6 dígitos."))]
    #[schema(example = "482913")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InvitePayload {
    #[validate(email(message = "El correo no es válido."))]
    pub email: String,
    pub role: StaffRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitePayload {
    #[validate(length(min = 1, message = "El token es requerido."))]
    pub token: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRolePayload {
    pub role: StaffRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Claims dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_legal_staff_can_edit_cases() {
        assert!(StaffRole::Admin.can_edit_legal());
        assert!(StaffRole::Lawyer.can_edit_legal());
        assert!(StaffRole::Assistant.can_edit_legal());
        assert!(!StaffRole::Viewer.can_edit_legal());
    }

    #[test]
    fn missing_role_defaults_to_viewer() {
        assert_eq!(StaffRole::default(), StaffRole::Viewer);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StaffRole::Lawyer).unwrap(), "\"lawyer\"");
        let role: StaffRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, StaffRole::Assistant);
    }

    #[test]
    fn signup_rejects_short_password() {
        let payload = SignupPayload {
            email: "persona@asme.mx".into(),
            password: "123".into(),
            full_name: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
