// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de error único de la aplicación. Cada variante sabe su status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("El correo ya está registrado")]
    EmailAlreadyExists,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Código de verificación inválido o expirado")]
    InvalidOtp,

    #[error("Invitación inválida o expirada")]
    InvalidInvite,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} no existe.")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Error de base de datos: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error HTTP externo: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Error de almacenamiento: {0}")]
    StorageError(String),

    #[error("Error al enviar correo: {0}")]
    EmailError(String),

    #[error("Error al generar PDF: {0}")]
    PdfError(String),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Error interno del servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::InvalidInvite => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::InvalidOtp => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageError(_) | AppError::EmailError(_) | AppError::HttpError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            // Devuelve el detalle de cada campo inválido
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }

            // Fallas del proveedor externo: se registran, el mensaje se generaliza
            ref e @ (AppError::StorageError(_) | AppError::EmailError(_) | AppError::HttpError(_)) => {
                tracing::error!("Servicio externo falló: {}", e);
                "El servicio externo no respondió correctamente.".to_string()
            }

            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Error interno del servidor: {}", e);
                "Ocurrió un error inesperado.".to_string()
            }

            e => e.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_keeps_its_message() {
        let (status, body) = body_json(AppError::Conflict("Horario ocupado".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Horario ocupado");
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (status, body) = body_json(AppError::NotFound("El caso")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "El caso no existe.");
    }

    #[tokio::test]
    async fn internal_errors_are_not_leaked() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exhausted at 10.0.0.3"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Ocurrió un error inesperado.");
    }

    #[tokio::test]
    async fn storage_errors_map_to_bad_gateway() {
        let (status, _) = body_json(AppError::StorageError("403".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
