// src/models/hearings.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::cases::DocumentUpload;

// Tipo de documento obligatorio al programar una audiencia
pub const AUTO_DOCUMENT_KIND: &str = "AUTO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "hearing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HearingStatus {
    Programada,
    Celebrada,
    Diferida,
    Cancelada,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
    pub id: Uuid,
    pub case_id: Uuid,
    pub hearing_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub hearing_time: NaiveTime,
    #[schema(example = "Audiencia inicial")]
    pub hearing_type: String,
    #[schema(example = "Sala 4")]
    pub room: Option<String>,
    pub status: HearingStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hearing {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.hearing_date.and_time(self.hearing_time)
    }
}

// Audiencia con datos del caso, para la agenda
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub hearing: Hearing,
    pub case_number: String,
    pub client_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHearingPayload {
    pub hearing_date: NaiveDate,
    #[schema(value_type = String, example = "09:00")]
    pub hearing_time: NaiveTime,

    #[validate(length(min = 1, message = "El tipo de audiencia es requerido."))]
    pub hearing_type: String,
    pub room: Option<String>,
    pub status: Option<HearingStatus>,
    pub notes: Option<String>,

    #[validate(required(message = "Debe adjuntar el AUTO de la audiencia."), nested)]
    pub auto_document: Option<DocumentUpload>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHearingPayload {
    pub hearing_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "09:00")]
    pub hearing_time: Option<NaiveTime>,
    #[validate(length(min = 1, message = "El tipo de audiencia no puede quedar vacío."))]
    pub hearing_type: Option<String>,
    pub room: Option<String>,
    pub status: Option<HearingStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgendaFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<HearingStatus>,
}

/// Próxima audiencia programada a partir de `now`, entre las de un caso.
pub fn next_scheduled(hearings: &[Hearing], now: NaiveDateTime) -> Option<NaiveDateTime> {
    hearings
        .iter()
        .filter(|h| h.status == HearingStatus::Programada)
        .map(Hearing::starts_at)
        .filter(|at| *at >= now)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hearing(date: (i32, u32, u32), hour: u32, status: HearingStatus) -> Hearing {
        Hearing {
            id: Uuid::new_v4(),
            case_id: Uuid::nil(),
            hearing_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            hearing_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            hearing_type: "Intermedia".into(),
            room: None,
            status,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn next_hearing_skips_past_and_cancelled() {
        let hearings = vec![
            hearing((2025, 1, 10), 9, HearingStatus::Programada),
            hearing((2025, 3, 2), 11, HearingStatus::Cancelada),
            hearing((2025, 4, 20), 10, HearingStatus::Programada),
            hearing((2025, 3, 15), 13, HearingStatus::Diferida),
        ];

        let next = next_scheduled(&hearings, at(2025, 2, 1, 0));
        assert_eq!(next, Some(at(2025, 4, 20, 10)));
    }

    #[test]
    fn no_future_hearing_clears_the_date() {
        let hearings = vec![hearing((2024, 12, 1), 9, HearingStatus::Programada)];
        assert_eq!(next_scheduled(&hearings, at(2025, 1, 1, 0)), None);
    }

    #[test]
    fn hearing_without_auto_is_rejected() {
        let payload: CreateHearingPayload = serde_json::from_value(serde_json::json!({
            "hearingDate": "2025-05-02",
            "hearingTime": "09:30:00",
            "hearingType": "Audiencia inicial"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("auto_document"));
    }
}
