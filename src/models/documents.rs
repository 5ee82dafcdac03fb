// src/models/documents.rs

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[validate(length(min = 1, message = "El nombre del contacto es requerido."))]
    #[schema(example = "Bomberos municipales")]
    pub name: String,
    #[validate(length(min = 1, message = "El teléfono del contacto es requerido."))]
    #[schema(example = "911")]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brigade {
    #[validate(length(min = 1, message = "El nombre de la brigada es requerido."))]
    #[schema(example = "Evacuación")]
    pub name: String,
    #[schema(example = "Jorge Ramírez")]
    pub leader: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Campos del formulario PIPC (Programa Interno de Protección Civil).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipcForm {
    #[validate(length(min = 1, message = "La razón social es requerida."))]
    #[schema(example = "Logística del Bajío S.A. de C.V.")]
    pub company_name: String,

    #[validate(length(min = 1, message = "El domicilio es requerido."))]
    pub address: String,

    #[validate(length(min = 1, message = "El responsable del inmueble es requerido."))]
    pub responsible_person: String,

    #[validate(length(min = 1, message = "El giro o actividad es requerido."))]
    #[schema(example = "Almacenamiento y distribución")]
    pub activity: String,

    #[validate(range(min = 1, message = "Debe haber al menos un trabajador."))]
    pub employees: u32,

    #[serde(default = "ground_floor")]
    pub floors: u32,

    pub built_area_m2: Option<f64>,

    #[serde(default)]
    #[schema(example = json!(["Incendio", "Sismo", "Inundación"]))]
    pub risks: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub emergency_contacts: Vec<EmergencyContact>,

    #[serde(default)]
    #[validate(nested)]
    pub brigades: Vec<Brigade>,

    pub issued_on: Option<NaiveDate>,
}

fn ground_floor() -> u32 {
    1
}
