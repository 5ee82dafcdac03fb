// src/db/content_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::content::{CreateGalleryImagePayload, CreateServiceCardPayload, GalleryImage, ServiceCard},
};

// Tarjetas de servicio y galerías del sitio público
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_service_cards(&self, page: Option<&str>) -> Result<Vec<ServiceCard>, AppError> {
        let cards = sqlx::query_as::<_, ServiceCard>(
            r#"
            SELECT id, page, title, description, image_url, position, created_at
            FROM service_cards
            WHERE ($1::text IS NULL OR page = $1)
            ORDER BY page, position, created_at
            "#,
        )
        .bind(page)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    pub async fn create_service_card(&self, payload: &CreateServiceCardPayload) -> Result<ServiceCard, AppError> {
        let card = sqlx::query_as::<_, ServiceCard>(
            r#"
            INSERT INTO service_cards (page, title, description, image_url, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, page, title, description, image_url, position, created_at
            "#,
        )
        .bind(payload.page.trim())
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(&payload.image_url)
        .bind(payload.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(card)
    }

    /// Devuelve la URL de la imagen de la tarjeta borrada.
    pub async fn delete_service_card(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let url = sqlx::query_scalar::<_, String>(
            "DELETE FROM service_cards WHERE id = $1 RETURNING image_url",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(url)
    }

    pub async fn list_gallery(&self, gallery: &str) -> Result<Vec<GalleryImage>, AppError> {
        let images = sqlx::query_as::<_, GalleryImage>(
            r#"
            SELECT id, gallery, title, image_url, position, created_at
            FROM gallery_images
            WHERE gallery = $1
            ORDER BY position, created_at
            "#,
        )
        .bind(gallery)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    pub async fn add_gallery_image(
        &self,
        gallery: &str,
        payload: &CreateGalleryImagePayload,
    ) -> Result<GalleryImage, AppError> {
        let image = sqlx::query_as::<_, GalleryImage>(
            r#"
            INSERT INTO gallery_images (gallery, title, image_url, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, gallery, title, image_url, position, created_at
            "#,
        )
        .bind(gallery)
        .bind(payload.title.as_deref())
        .bind(&payload.image_url)
        .bind(payload.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    pub async fn delete_gallery_image(&self, gallery: &str, id: Uuid) -> Result<Option<String>, AppError> {
        let url = sqlx::query_scalar::<_, String>(
            "DELETE FROM gallery_images WHERE id = $1 AND gallery = $2 RETURNING image_url",
        )
        .bind(id)
        .bind(gallery)
        .fetch_optional(&self.pool)
        .await?;

        Ok(url)
    }

    // --- Migración de medios ---

    pub async fn service_card_urls_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, image_url FROM service_cards WHERE starts_with(image_url, $1)",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn gallery_urls_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, image_url FROM gallery_images WHERE starts_with(image_url, $1)",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_service_card_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE service_cards SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_gallery_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE gallery_images SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
