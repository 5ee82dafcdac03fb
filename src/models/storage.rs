// src/models/storage.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    #[validate(length(min = 1, max = 200, message = "El nombre del archivo es requerido."))]
    #[schema(example = "simulacro 2025.jpg")]
    pub file_name: String,

    #[validate(length(min = 1, message = "El tipo de contenido es requerido."))]
    #[schema(example = "image/jpeg")]
    pub content_type: String,

    #[schema(example = "galerias")]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub public_url: String,
    pub key: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteObjectRequest {
    #[validate(length(min = 1, message = "La llave del objeto es requerida."))]
    pub key: String,
}
