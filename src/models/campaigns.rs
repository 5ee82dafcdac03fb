// src/models/campaigns.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::clients::ClientStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Sent,
    Failed,
}

impl CampaignStatus {
    /// Sólo borradores o envíos fallidos pueden (re)enviarse.
    pub fn can_send(self) -> bool {
        matches!(self, CampaignStatus::Draft | CampaignStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "target_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Pending,
    Sent,
    Failed,
}

/// Segmento de clientes al que se dirige una campaña.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    All,
    Prospectos,
    Activos,
    Inactivos,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::All => "all",
            Segment::Prospectos => "prospectos",
            Segment::Activos => "activos",
            Segment::Inactivos => "inactivos",
        }
    }

    /// Estado de cliente que filtra el segmento; `None` = todos.
    pub fn client_status(self) -> Option<ClientStatus> {
        match self {
            Segment::All => None,
            Segment::Prospectos => Some(ClientStatus::Prospecto),
            Segment::Activos => Some(ClientStatus::Activo),
            Segment::Inactivos => Some(ClientStatus::Inactivo),
        }
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Segment::All),
            "prospectos" => Ok(Segment::Prospectos),
            "activos" => Ok(Segment::Activos),
            "inactivos" => Ok(Segment::Inactivos),
            other => Err(format!("Segmento desconocido: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    #[schema(example = "Boletín Protección Civil marzo")]
    pub name: String,
    pub subject: String,
    pub body_html: String,
    #[schema(example = "activos")]
    pub segment: String,
    pub status: CampaignStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTarget {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub client_id: Option<Uuid>,
    pub email: String,
    pub status: TargetStatus,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

// Destinatario resuelto a partir del segmento
#[derive(Debug, Clone, FromRow)]
pub struct Recipient {
    pub client_id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, message = "El nombre es requerido."))]
    pub name: String,
    #[validate(length(min = 1, message = "El asunto es requerido."))]
    pub subject: String,
    #[validate(length(min = 1, message = "El contenido es requerido."))]
    pub body_html: String,
    #[serde(default = "all_clients")]
    pub segment: Segment,
}

fn all_clients() -> Segment {
    Segment::All
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignPayload {
    #[validate(length(min = 1, message = "El nombre no puede quedar vacío."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "El asunto no puede quedar vacío."))]
    pub subject: Option<String>,
    pub body_html: Option<String>,
    pub segment: Option<Segment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_round_trips_through_its_column_value() {
        for segment in [Segment::All, Segment::Prospectos, Segment::Activos, Segment::Inactivos] {
            assert_eq!(segment.as_str().parse::<Segment>().unwrap(), segment);
        }
        assert!("vip".parse::<Segment>().is_err());
    }

    #[test]
    fn segment_maps_to_client_status() {
        assert_eq!(Segment::All.client_status(), None);
        assert_eq!(Segment::Activos.client_status(), Some(ClientStatus::Activo));
    }

    #[test]
    fn sent_campaigns_cannot_be_resent() {
        assert!(CampaignStatus::Draft.can_send());
        assert!(CampaignStatus::Failed.can_send());
        assert!(!CampaignStatus::Sent.can_send());
        assert!(!CampaignStatus::Sending.can_send());
    }
}
