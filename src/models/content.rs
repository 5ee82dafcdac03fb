// src/models/content.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Tarjetas de servicio que alimentan las páginas de marketing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCard {
    pub id: Uuid,
    #[schema(example = "capacitacion")]
    pub page: String,
    #[schema(example = "Brigadas de evacuación")]
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: Uuid,
    #[schema(example = "simulacros")]
    pub gallery: String,
    pub title: Option<String>,
    pub image_url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceCardPayload {
    #[validate(length(min = 1, message = "La página es requerida."))]
    pub page: String,
    #[validate(length(min = 1, message = "El título es requerido."))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "La URL de la imagen no es válida."))]
    pub image_url: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryImagePayload {
    pub title: Option<String>,
    #[validate(url(message = "La URL de la imagen no es válida."))]
    pub image_url: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceCardFilter {
    pub page: Option<String>,
}
