// src/models/cases.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "case_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Penal,
    Familiar,
    Civil,
    Amparos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "case_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Activo,
    EnProceso,
    Suspendido,
    Cerrado,
}

impl CaseStatus {
    pub fn label(self) -> &'static str {
        match self {
            CaseStatus::Activo => "Activo",
            CaseStatus::EnProceso => "En proceso",
            CaseStatus::Suspendido => "Suspendido",
            CaseStatus::Cerrado => "Cerrado",
        }
    }
}

// Tipos de evento de la línea de tiempo
pub mod timeline_event {
    pub const CREATED: &str = "creado";
    pub const STATUS_CHANGED: &str = "estado_cambiado";
    pub const ARCHIVED: &str = "archivado";
    pub const RESTORED: &str = "restaurado";
    pub const DOCUMENT_ADDED: &str = "documento_agregado";
    pub const HEARING_SCHEDULED: &str = "audiencia_programada";
    pub const HEARING_UPDATED: &str = "audiencia_actualizada";
    pub const HEARING_DELETED: &str = "audiencia_eliminada";
}

// --- FILAS ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    #[schema(example = "PEN-2025-014")]
    pub case_number: String,
    #[schema(example = "Laura Hernández")]
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub assigned_to: Option<Uuid>,
    pub summary: Option<String>,
    pub next_hearing_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseNote {
    pub id: Uuid,
    pub case_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseDocument {
    pub id: Uuid,
    pub case_id: Uuid,
    pub hearing_id: Option<Uuid>,
    #[schema(example = "AUTO")]
    pub kind: String,
    pub file_name: String,
    pub file_url: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub case_id: Uuid,
    #[schema(example = "estado_cambiado")]
    pub event_type: String,
    pub description: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Caso con sus hijos, para la vista de detalle
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: Case,
    pub notes: Vec<CaseNote>,
    pub documents: Vec<CaseDocument>,
    pub hearings: Vec<crate::models::hearings::Hearing>,
    pub timeline: Vec<TimelineEntry>,
}

// --- PAYLOADS ---

// Archivo ya subido al bucket con la URL prefirmada
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    #[validate(length(min = 1, message = "El nombre del archivo es requerido."))]
    #[schema(example = "demanda_inicial.pdf")]
    pub file_name: String,

    #[validate(url(message = "La URL del archivo no es válida."))]
    #[schema(example = "https://media.asme.mx/casos/0b6f...-demanda_inicial.pdf")]
    pub file_url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCasePayload {
    #[validate(length(min = 1, message = "El número de caso es requerido."))]
    pub case_number: String,

    #[validate(length(min = 1, message = "El nombre del cliente es requerido."))]
    pub client_name: String,

    #[validate(email(message = "El correo no es válido."))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,

    pub case_type: CaseType,
    pub status: Option<CaseStatus>,
    pub assigned_to: Option<Uuid>,
    pub summary: Option<String>,

    // Todo caso nace con un documento
    #[validate(required(message = "Debe adjuntar un documento para crear el caso."), nested)]
    pub document: Option<DocumentUpload>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCasePayload {
    #[validate(length(min = 1, message = "El nombre del cliente no puede quedar vacío."))]
    pub client_name: Option<String>,
    #[validate(email(message = "El correo no es válido."))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub case_type: Option<CaseType>,
    pub status: Option<CaseStatus>,
    pub assigned_to: Option<Uuid>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArchivePayload {
    pub archived: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotePayload {
    #[validate(length(min = 1, message = "La nota no puede estar vacía."))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentPayload {
    #[validate(nested)]
    #[serde(flatten)]
    pub document: DocumentUpload,
    #[schema(example = "GENERAL")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimelinePayload {
    #[validate(length(min = 1, message = "El tipo de evento es requerido."))]
    pub event_type: String,
    #[validate(length(min = 1, message = "La descripción es requerida."))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    pub archived: Option<bool>,
    pub status: Option<CaseStatus>,
    pub case_type: Option<CaseType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_case() -> serde_json::Value {
        json!({
            "caseNumber": "FAM-2025-003",
            "clientName": "Laura Hernández",
            "caseType": "familiar"
        })
    }

    #[test]
    fn case_without_document_is_rejected() {
        let payload: CreateCasePayload = serde_json::from_value(base_case()).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("document"));
    }

    #[test]
    fn case_with_document_is_accepted() {
        let mut body = base_case();
        body["document"] = json!({
            "fileName": "demanda.pdf",
            "fileUrl": "https://media.asme.mx/casos/demanda.pdf"
        });
        let payload: CreateCasePayload = serde_json::from_value(body).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let status: CaseStatus = serde_json::from_value(json!("en_proceso")).unwrap();
        assert_eq!(status, CaseStatus::EnProceso);
        assert_eq!(status.label(), "En proceso");
    }
}
