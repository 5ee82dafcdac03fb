// src/models/clients.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Prospecto,
    Activo,
    Inactivo,
}

// Tipos de evento del historial
pub mod history_event {
    pub const CREATED: &str = "creado";
    pub const STATUS_CHANGED: &str = "estado_cambiado";
    pub const ARCHIVED: &str = "archivado";
    pub const RESTORED: &str = "restaurado";
    pub const CAMPAIGN_SENT: &str = "campana_enviada";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Logística del Bajío S.A. de C.V.")]
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Manufactura")]
    pub industry: Option<String>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientHistoryEvent {
    pub id: Uuid,
    pub client_id: Uuid,
    pub event_type: String,
    pub description: String,
    pub metadata: Value,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "La razón social es requerida."))]
    pub company_name: String,
    pub contact_name: Option<String>,
    #[validate(email(message = "El correo no es válido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "La razón social no puede quedar vacía."))]
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email(message = "El correo no es válido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
    pub archived: Option<bool>,
}
