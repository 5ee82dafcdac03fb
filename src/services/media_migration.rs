// src/services/media_migration.rs

use percent_encoding::percent_decode_str;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BlogRepository, CaseRepository, ContentRepository},
    models::blog::BlogKind,
    services::storage::StorageClient,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub scanned: usize,
    pub copied: usize,
    pub failed: usize,
}

/// Copia única de medios desde un almacenamiento viejo al bucket actual,
/// reescribiendo las URLs guardadas. Secuencial; cada fallo se registra y se sigue.
pub struct MediaMigration {
    blog_repo: BlogRepository,
    content_repo: ContentRepository,
    case_repo: CaseRepository,
    storage: StorageClient,
    http: reqwest::Client,
    from: String,
    dry_run: bool,
}

/// Llave destino: la ruta relativa a la base vieja, sin query string y ya decodificada
/// (el cliente de storage vuelve a codificarla al firmar).
pub fn migrated_key(from: &str, url: &str) -> Option<String> {
    let base = from.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    let raw = rest.split(['?', '#']).next().unwrap_or_default();
    let path = percent_decode_str(raw).decode_utf8().ok()?;

    if path.is_empty() || path.split('/').any(|s| s == "..") {
        None
    } else {
        Some(path.into_owned())
    }
}

impl MediaMigration {
    pub fn new(pool: PgPool, storage: StorageClient, from: String, dry_run: bool) -> Self {
        Self {
            blog_repo: BlogRepository::new(pool.clone()),
            content_repo: ContentRepository::new(pool.clone()),
            case_repo: CaseRepository::new(pool),
            storage,
            http: reqwest::Client::new(),
            from: from.trim_end_matches('/').to_string(),
            dry_run,
        }
    }

    async fn copy_object(&self, url: &str, key: &str) -> Result<String, AppError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::StorageError(format!("GET {url} respondió {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?;

        self.storage.put_object(key, &content_type, bytes.to_vec()).await
    }

    /// Devuelve la URL nueva, o `None` si no se migró (dry-run, URL ajena o fallo).
    async fn migrate_url(&self, url: &str, report: &mut MigrationReport) -> Option<String> {
        let key = migrated_key(&self.from, url)?;
        report.scanned += 1;

        if self.dry_run {
            tracing::info!("[dry-run] {} -> {}", url, self.storage.public_url(&key));
            return None;
        }

        match self.copy_object(url, &key).await {
            Ok(new_url) => {
                report.copied += 1;
                tracing::info!("✅ {} -> {}", url, new_url);
                Some(new_url)
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!("⚠️ No se pudo copiar {}: {}", url, e);
                None
            }
        }
    }

    async fn migrate_rows(
        &self,
        label: &str,
        rows: Vec<(Uuid, String)>,
        report: &mut MigrationReport,
    ) -> Vec<(Uuid, String)> {
        tracing::info!("{}: {} archivos por revisar", label, rows.len());
        let mut updated = Vec::new();
        for (id, url) in rows {
            if let Some(new_url) = self.migrate_url(&url, report).await {
                updated.push((id, new_url));
            }
        }
        updated
    }

    pub async fn run(&self) -> Result<MigrationReport, AppError> {
        let mut report = MigrationReport::default();
        let prefix = format!("{}/", self.from);

        // Blogs: arreglo de URLs por entrada
        for kind in [BlogKind::Security, BlogKind::Legal] {
            for (id, urls) in self.blog_repo.list_media(kind).await? {
                let mut changed = false;
                let mut rewritten = Vec::with_capacity(urls.len());
                for url in urls {
                    match self.migrate_url(&url, &mut report).await {
                        Some(new_url) => {
                            changed = true;
                            rewritten.push(new_url);
                        }
                        None => rewritten.push(url),
                    }
                }
                if changed {
                    self.blog_repo.set_media_urls(kind, id, &rewritten).await?;
                }
            }
        }

        let cards = self.content_repo.service_card_urls_with_prefix(&prefix).await?;
        for (id, url) in self.migrate_rows("Tarjetas de servicio", cards, &mut report).await {
            self.content_repo.set_service_card_url(id, &url).await?;
        }

        let images = self.content_repo.gallery_urls_with_prefix(&prefix).await?;
        for (id, url) in self.migrate_rows("Galerías", images, &mut report).await {
            self.content_repo.set_gallery_url(id, &url).await?;
        }

        let documents = self.case_repo.list_document_urls_with_prefix(&prefix).await?;
        for (id, url) in self.migrate_rows("Documentos de casos", documents, &mut report).await {
            self.case_repo.set_document_url(id, &url).await?;
        }

        tracing::info!(
            "🏁 Migración terminada: {} revisados, {} copiados, {} con error{}",
            report.scanned,
            report.copied,
            report.failed,
            if self.dry_run { " (dry-run)" } else { "" }
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_the_path_under_the_old_base() {
        let from = "https://old.supabase.co/storage/v1/object/public/media/";
        assert_eq!(
            migrated_key(from, "https://old.supabase.co/storage/v1/object/public/media/blog/foto.jpg?t=1"),
            Some("blog/foto.jpg".to_string())
        );
    }

    #[test]
    fn foreign_or_unsafe_urls_are_skipped() {
        let from = "https://old.example.com/media";
        assert_eq!(migrated_key(from, "https://cdn.other.com/media/a.jpg"), None);
        assert_eq!(migrated_key(from, "https://old.example.com/media"), None);
        assert_eq!(migrated_key(from, "https://old.example.com/mediaX/a.jpg"), None);
        assert_eq!(migrated_key(from, "https://old.example.com/media/../secret"), None);
        assert_eq!(migrated_key(from, "https://old.example.com/media/%2E%2E/secret"), None);
    }

    #[test]
    fn encoded_names_are_decoded_once() {
        let from = "https://old.example.com/media";
        assert_eq!(
            migrated_key(from, "https://old.example.com/media/galeria/a%20b.jpg"),
            Some("galeria/a b.jpg".to_string())
        );
        assert_eq!(
            migrated_key(from, "https://old.example.com/media/blog/se%C3%B1al.png?v=2"),
            Some("blog/señal.png".to_string())
        );
    }
}
