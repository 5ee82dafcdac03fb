// src/services/content_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ContentRepository,
    models::content::{CreateGalleryImagePayload, CreateServiceCardPayload, GalleryImage, ServiceCard},
    services::storage::StorageClient,
};

#[derive(Clone)]
pub struct ContentService {
    repo: ContentRepository,
    storage: StorageClient,
}

impl ContentService {
    pub fn new(repo: ContentRepository, storage: StorageClient) -> Self {
        Self { repo, storage }
    }

    pub async fn service_cards(&self, page: Option<&str>) -> Result<Vec<ServiceCard>, AppError> {
        self.repo.list_service_cards(page).await
    }

    pub async fn create_service_card(&self, payload: &CreateServiceCardPayload) -> Result<ServiceCard, AppError> {
        self.repo.create_service_card(payload).await
    }

    pub async fn delete_service_card(&self, id: Uuid) -> Result<(), AppError> {
        let url = self
            .repo
            .delete_service_card(id)
            .await?
            .ok_or(AppError::NotFound("La tarjeta"))?;

        self.storage.remove_by_url(&url).await;
        Ok(())
    }

    pub async fn gallery(&self, gallery: &str) -> Result<Vec<GalleryImage>, AppError> {
        self.repo.list_gallery(gallery).await
    }

    pub async fn add_gallery_image(
        &self,
        gallery: &str,
        payload: &CreateGalleryImagePayload,
    ) -> Result<GalleryImage, AppError> {
        self.repo.add_gallery_image(gallery, payload).await
    }

    pub async fn delete_gallery_image(&self, gallery: &str, id: Uuid) -> Result<(), AppError> {
        let url = self
            .repo
            .delete_gallery_image(gallery, id)
            .await?
            .ok_or(AppError::NotFound("La imagen"))?;

        self.storage.remove_by_url(&url).await;
        Ok(())
    }
}
