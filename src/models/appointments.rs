// src/models/appointments.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    #[schema(example = "Carlos Méndez")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[schema(example = "Curso de primeros auxilios")]
    pub service: String,
    #[schema(example = 12)]
    pub participants: i32,
    pub message: Option<String>,

    // Lo que pidió el cliente en el formulario
    pub preferred_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:30:00")]
    pub preferred_time: Option<NaiveTime>,

    pub status: AppointmentStatus,

    // Lo que asignó el administrador al aprobar
    pub appointment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:30:00")]
    pub appointment_time: Option<NaiveTime>,
    pub admin_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Formulario público de reservación
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    #[validate(length(min = 1, message = "El nombre es requerido."))]
    pub full_name: String,

    #[validate(email(message = "El correo no es válido."))]
    pub email: String,

    #[validate(length(min = 1, message = "El teléfono es requerido."))]
    pub phone: String,

    #[validate(length(min = 1, message = "El servicio es requerido."))]
    pub service: String,

    #[validate(range(min = 1, message = "Debe haber al menos un participante."))]
    #[serde(default = "one")]
    pub participants: i32,

    pub message: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:30")]
    pub preferred_time: Option<NaiveTime>,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAppointmentPayload {
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "10:30")]
    pub time: Option<NaiveTime>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectAppointmentPayload {
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_defaults_to_one_participant() {
        let payload: CreateAppointmentPayload = serde_json::from_value(serde_json::json!({
            "fullName": "Carlos Méndez",
            "email": "carlos@empresa.mx",
            "phone": "5512345678",
            "service": "Consultoría en seguridad"
        }))
        .unwrap();

        assert_eq!(payload.participants, 1);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn booking_requires_contact_fields() {
        let payload: CreateAppointmentPayload = serde_json::from_value(serde_json::json!({
            "fullName": "",
            "email": "no-es-correo",
            "phone": "",
            "service": "Curso",
            "participants": 0
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("full_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("participants"));
    }

    #[test]
    fn approval_parses_date_and_time() {
        let payload: ApproveAppointmentPayload =
            serde_json::from_str(r#"{"date":"2025-03-14","time":"10:30:00"}"#).unwrap();
        assert_eq!(payload.time, NaiveTime::from_hms_opt(10, 30, 0));
    }
}
