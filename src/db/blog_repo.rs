// src/db/blog_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::blog::{BlogKind, BlogPost, CreatePostPayload, UpdatePostPayload},
};

const POST_COLUMNS: &str = r#"
    id, title, slug, content, category, media_type, media_urls,
    archived, author_id, created_at, updated_at
"#;

// Un solo repositorio para los dos blogs; la tabla sale de BlogKind
#[derive(Clone)]
pub struct BlogRepository {
    pool: PgPool,
}

impl BlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        kind: BlogKind,
        include_archived: bool,
        category: Option<&str>,
    ) -> Result<Vec<BlogPost>, AppError> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM {table}
            WHERE ($1 OR archived = FALSE)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY created_at DESC
            "#,
            table = kind.table()
        ))
        .bind(include_archived)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn find_published_by_slug(&self, kind: BlogKind, slug: &str) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM {table} WHERE slug = $1 AND archived = FALSE",
            table = kind.table()
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Slugs existentes que empiezan con `base`, para resolver colisiones.
    pub async fn slugs_like(&self, kind: BlogKind, base: &str) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(&format!(
            "SELECT slug FROM {table} WHERE slug = $1 OR starts_with(slug, $1 || '-')",
            table = kind.table()
        ))
        .bind(base)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    pub async fn create(
        &self,
        kind: BlogKind,
        payload: &CreatePostPayload,
        slug: &str,
        author_id: Uuid,
    ) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            INSERT INTO {table} (title, slug, content, category, media_type, media_urls, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {POST_COLUMNS}
            "#,
            table = kind.table()
        ))
        .bind(payload.title.trim())
        .bind(slug)
        .bind(&payload.content)
        .bind(payload.category.trim())
        .bind(payload.media_type)
        .bind(&payload.media_urls)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("El slug '{slug}' ya está en uso."));
                }
            }
            e.into()
        })
    }

    pub async fn update(
        &self,
        kind: BlogKind,
        id: Uuid,
        payload: &UpdatePostPayload,
    ) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            UPDATE {table}
            SET title      = COALESCE($2, title),
                content    = COALESCE($3, content),
                category   = COALESCE($4, category),
                media_type = COALESCE($5, media_type),
                media_urls = COALESCE($6, media_urls),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
            table = kind.table()
        ))
        .bind(id)
        .bind(payload.title.as_deref())
        .bind(payload.content.as_deref())
        .bind(payload.category.as_deref())
        .bind(payload.media_type)
        .bind(payload.media_urls.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("La entrada"))
    }

    pub async fn set_archived(&self, kind: BlogKind, id: Uuid, archived: bool) -> Result<BlogPost, AppError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            UPDATE {table} SET archived = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
            table = kind.table()
        ))
        .bind(id)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("La entrada"))
    }

    pub async fn delete(&self, kind: BlogKind, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Migración de medios ---

    pub async fn list_media(&self, kind: BlogKind) -> Result<Vec<(Uuid, Vec<String>)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, Vec<String>)>(&format!(
            "SELECT id, media_urls FROM {} WHERE cardinality(media_urls) > 0",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_media_urls(&self, kind: BlogKind, id: Uuid, urls: &[String]) -> Result<(), AppError> {
        sqlx::query(&format!("UPDATE {} SET media_urls = $2 WHERE id = $1", kind.table()))
            .bind(id)
            .bind(urls)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
