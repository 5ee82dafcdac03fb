// src/models/contact.rs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContactPayload {
    #[validate(length(min = 1, message = "El nombre es requerido."))]
    pub name: String,
    #[validate(email(message = "El correo no es válido."))]
    pub email: String,
    pub phone: Option<String>,
    #[schema(example = "Cotización de capacitación")]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "El mensaje es requerido."))]
    pub message: String,
}
