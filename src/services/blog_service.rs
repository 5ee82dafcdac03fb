// src/services/blog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BlogRepository,
    models::blog::{slugify, BlogKind, BlogPost, CreatePostPayload, UpdatePostPayload},
};

#[derive(Clone)]
pub struct BlogService {
    repo: BlogRepository,
}

/// Primer slug libre: `base`, `base-2`, `base-3`...
pub fn unique_slug(base: &str, existing: &[String]) -> String {
    if !existing.iter().any(|s| s == base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

impl BlogService {
    pub fn new(repo: BlogRepository) -> Self {
        Self { repo }
    }

    pub async fn list_published(&self, kind: BlogKind, category: Option<&str>) -> Result<Vec<BlogPost>, AppError> {
        self.repo.list(kind, false, category).await
    }

    pub async fn list_all(&self, kind: BlogKind) -> Result<Vec<BlogPost>, AppError> {
        self.repo.list(kind, true, None).await
    }

    pub async fn get_by_slug(&self, kind: BlogKind, slug: &str) -> Result<BlogPost, AppError> {
        self.repo
            .find_published_by_slug(kind, slug)
            .await?
            .ok_or(AppError::NotFound("La entrada"))
    }

    pub async fn create(
        &self,
        kind: BlogKind,
        payload: &CreatePostPayload,
        author_id: Uuid,
    ) -> Result<BlogPost, AppError> {
        let base = slugify(&payload.title);
        let existing = self.repo.slugs_like(kind, &base).await?;
        let slug = unique_slug(&base, &existing);

        let post = self.repo.create(kind, payload, &slug, author_id).await?;
        tracing::info!("📝 Entrada publicada en {:?}: {}", kind, post.slug);
        Ok(post)
    }

    pub async fn update(&self, kind: BlogKind, id: Uuid, payload: &UpdatePostPayload) -> Result<BlogPost, AppError> {
        self.repo.update(kind, id, payload).await
    }

    pub async fn set_archived(&self, kind: BlogKind, id: Uuid, archived: bool) -> Result<BlogPost, AppError> {
        self.repo.set_archived(kind, id, archived).await
    }

    pub async fn delete(&self, kind: BlogKind, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(kind, id).await? {
            return Err(AppError::NotFound("La entrada"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_slug_is_kept() {
        assert_eq!(unique_slug("simulacro-2025", &[]), "simulacro-2025");
        assert_eq!(
            unique_slug("simulacro", &["simulacro-nacional".to_string()]),
            "simulacro"
        );
    }

    #[test]
    fn taken_slug_gets_the_next_suffix() {
        let existing = vec![
            "guia-sismos".to_string(),
            "guia-sismos-2".to_string(),
            "guia-sismos-4".to_string(),
        ];
        assert_eq!(unique_slug("guia-sismos", &existing), "guia-sismos-3");
    }
}
