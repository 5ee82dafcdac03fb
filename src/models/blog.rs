// src/models/blog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Los dos blogs del sitio: seguridad (ASME) y jurídico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlogKind {
    Security,
    Legal,
}

impl BlogKind {
    pub fn table(self) -> &'static str {
        match self {
            BlogKind::Security => "blog_posts",
            BlogKind::Legal => "legal_blog_posts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    None,
    Image,
    Video,
    Gallery,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    #[schema(example = "Cinco claves del Programa Interno de Protección Civil")]
    pub title: String,
    #[schema(example = "cinco-claves-del-programa-interno-de-proteccion-civil")]
    pub slug: String,
    pub content: String,
    #[schema(example = "Protección Civil")]
    pub category: String,
    pub media_type: MediaType,
    pub media_urls: Vec<String>,
    pub archived: bool,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    #[validate(length(min = 1, message = "El título es requerido."))]
    pub title: String,
    #[validate(length(min = 1, message = "El contenido es requerido."))]
    pub content: String,
    #[validate(length(min = 1, message = "La categoría es requerida."))]
    pub category: String,
    #[serde(default = "no_media")]
    pub media_type: MediaType,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

fn no_media() -> MediaType {
    MediaType::None
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    #[validate(length(min = 1, message = "El título no puede quedar vacío."))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub media_type: Option<MediaType>,
    pub media_urls: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub category: Option<String>,
}

/// Genera el slug de un título: minúsculas ASCII, sin acentos, separado por guiones.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            c => c,
        };

        if mapped.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(mapped);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "entrada".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_accents_and_punctuation() {
        assert_eq!(
            slugify("¿Qué hacer ante un Sismo? Guía rápida"),
            "que-hacer-ante-un-sismo-guia-rapida"
        );
        assert_eq!(slugify("  Amparo   indirecto: 2025  "), "amparo-indirecto-2025");
        assert_eq!(slugify("Niñez y custodia"), "ninez-y-custodia");
    }

    #[test]
    fn empty_title_gets_fallback_slug() {
        assert_eq!(slugify("¡¿!?"), "entrada");
    }

    #[test]
    fn post_defaults_to_no_media() {
        let payload: CreatePostPayload = serde_json::from_value(serde_json::json!({
            "title": "Nueva NOM",
            "content": "...",
            "category": "Normatividad"
        }))
        .unwrap();
        assert_eq!(payload.media_type, MediaType::None);
        assert!(payload.media_urls.is_empty());
    }
}
