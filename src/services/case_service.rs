// src/services/case_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CaseRepository, HearingRepository},
    models::cases::{
        timeline_event, AddDocumentPayload, Case, CaseDetail, CaseDocument, CaseFilter, CaseNote,
        CaseStatus, CreateCasePayload, CreateTimelinePayload, TimelineEntry, UpdateCasePayload,
    },
    services::storage::StorageClient,
};

const GENERAL_DOCUMENT_KIND: &str = "GENERAL";

#[derive(Clone)]
pub struct CaseService {
    case_repo: CaseRepository,
    hearing_repo: HearingRepository,
    storage: StorageClient,
    pool: PgPool,
}

/// Descripción del evento de cambio de estado; `None` si el estado no cambió.
pub fn status_change_description(old: CaseStatus, new: Option<CaseStatus>) -> Option<String> {
    match new {
        Some(new) if new != old => Some(format!("Estado: {} → {}", old.label(), new.label())),
        _ => None,
    }
}

fn document_kind(kind: Option<&str>) -> String {
    kind.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| GENERAL_DOCUMENT_KIND.to_string())
}

impl CaseService {
    pub fn new(
        case_repo: CaseRepository,
        hearing_repo: HearingRepository,
        storage: StorageClient,
        pool: PgPool,
    ) -> Self {
        Self { case_repo, hearing_repo, storage, pool }
    }

    async fn ensure_exists(&self, id: Uuid) -> Result<Case, AppError> {
        self.case_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("El caso"))
    }

    pub async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, AppError> {
        self.case_repo.list(filter).await
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<CaseDetail, AppError> {
        let case = self.ensure_exists(id).await?;

        let notes = self.case_repo.list_notes(id).await?;
        let documents = self.case_repo.list_documents(id).await?;
        let hearings = self.hearing_repo.list_for_case(&self.pool, id).await?;
        let timeline = self.case_repo.list_timeline(id).await?;

        Ok(CaseDetail { case, notes, documents, hearings, timeline })
    }

    /// Crea el caso con su primer documento y el evento `creado`, en una sola transacción.
    pub async fn create(&self, payload: &CreateCasePayload, actor_id: Uuid) -> Result<Case, AppError> {
        let document = payload.document.as_ref().ok_or_else(|| {
            AppError::BadRequest("Debe adjuntar un documento para crear el caso.".to_string())
        })?;

        let mut tx = self.pool.begin().await?;

        let case = self.case_repo.create_case(&mut *tx, payload, actor_id).await?;

        self.case_repo
            .add_document(
                &mut *tx,
                case.id,
                None,
                GENERAL_DOCUMENT_KIND,
                document.file_name.trim(),
                &document.file_url,
                actor_id,
            )
            .await?;

        self.case_repo
            .add_timeline_entry(
                &mut *tx,
                case.id,
                timeline_event::CREATED,
                &format!("Caso {} creado", case.case_number),
                Some(actor_id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("⚖️ Caso {} creado ({:?})", case.case_number, case.case_type);
        Ok(case)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateCasePayload, actor_id: Uuid) -> Result<Case, AppError> {
        let mut tx = self.pool.begin().await?;

        let old_status = self
            .case_repo
            .current_status(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("El caso"))?;

        let case = self.case_repo.update_case(&mut *tx, id, payload).await?;

        if let Some(description) = status_change_description(old_status, payload.status) {
            self.case_repo
                .add_timeline_entry(
                    &mut *tx,
                    id,
                    timeline_event::STATUS_CHANGED,
                    &description,
                    Some(actor_id),
                )
                .await?;
        }

        tx.commit().await?;
        Ok(case)
    }

    pub async fn set_archived(&self, id: Uuid, archived: bool, actor_id: Uuid) -> Result<Case, AppError> {
        let case = self.case_repo.set_archived(id, archived).await?;

        let (event, description) = if archived {
            (timeline_event::ARCHIVED, "Caso archivado")
        } else {
            (timeline_event::RESTORED, "Caso restaurado")
        };
        self.case_repo
            .add_timeline_entry(&self.pool, id, event, description, Some(actor_id))
            .await?;

        Ok(case)
    }

    /// Borra el caso y todos sus hijos; después limpia los archivos del bucket.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let case = self
            .case_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("El caso"))?;

        let notes = self.case_repo.delete_notes_for_case(&mut *tx, id).await?;
        let hearings = self.hearing_repo.delete_for_case(&mut *tx, id).await?;
        let document_urls = self.case_repo.delete_documents_for_case(&mut *tx, id).await?;
        let timeline = self.case_repo.delete_timeline_for_case(&mut *tx, id).await?;
        self.case_repo.delete_case(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(
            "🗑️ Caso {} eliminado: {} notas, {} audiencias, {} documentos, {} eventos",
            case.case_number,
            notes,
            hearings,
            document_urls.len(),
            timeline
        );

        // Fuera de la transacción: un fallo del bucket no revierte el borrado
        for url in &document_urls {
            self.storage.remove_by_url(url).await;
        }

        Ok(())
    }

    // =========================================================================
    //  NOTAS
    // =========================================================================

    pub async fn list_notes(&self, case_id: Uuid) -> Result<Vec<CaseNote>, AppError> {
        self.ensure_exists(case_id).await?;
        self.case_repo.list_notes(case_id).await
    }

    pub async fn add_note(&self, case_id: Uuid, content: &str, actor_id: Uuid) -> Result<CaseNote, AppError> {
        self.ensure_exists(case_id).await?;
        self.case_repo.add_note(case_id, actor_id, content.trim()).await
    }

    pub async fn delete_note(&self, case_id: Uuid, note_id: Uuid) -> Result<(), AppError> {
        if !self.case_repo.delete_note(case_id, note_id).await? {
            return Err(AppError::NotFound("La nota"));
        }
        Ok(())
    }

    // =========================================================================
    //  DOCUMENTOS
    // =========================================================================

    pub async fn list_documents(&self, case_id: Uuid) -> Result<Vec<CaseDocument>, AppError> {
        self.ensure_exists(case_id).await?;
        self.case_repo.list_documents(case_id).await
    }

    pub async fn add_document(
        &self,
        case_id: Uuid,
        payload: &AddDocumentPayload,
        actor_id: Uuid,
    ) -> Result<CaseDocument, AppError> {
        let kind = document_kind(payload.kind.as_deref());

        let mut tx = self.pool.begin().await?;

        self.case_repo
            .find_by_id(&mut *tx, case_id)
            .await?
            .ok_or(AppError::NotFound("El caso"))?;

        let document = self
            .case_repo
            .add_document(
                &mut *tx,
                case_id,
                None,
                &kind,
                payload.document.file_name.trim(),
                &payload.document.file_url,
                actor_id,
            )
            .await?;

        self.case_repo
            .add_timeline_entry(
                &mut *tx,
                case_id,
                timeline_event::DOCUMENT_ADDED,
                &format!("Documento {} agregado ({})", document.file_name, kind),
                Some(actor_id),
            )
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    pub async fn delete_document(&self, case_id: Uuid, document_id: Uuid) -> Result<(), AppError> {
        let url = self
            .case_repo
            .delete_document(case_id, document_id)
            .await?
            .ok_or(AppError::NotFound("El documento"))?;

        self.storage.remove_by_url(&url).await;
        Ok(())
    }

    // =========================================================================
    //  LÍNEA DE TIEMPO
    // =========================================================================

    pub async fn list_timeline(&self, case_id: Uuid) -> Result<Vec<TimelineEntry>, AppError> {
        self.ensure_exists(case_id).await?;
        self.case_repo.list_timeline(case_id).await
    }

    pub async fn add_timeline_entry(
        &self,
        case_id: Uuid,
        payload: &CreateTimelinePayload,
        actor_id: Uuid,
    ) -> Result<TimelineEntry, AppError> {
        self.ensure_exists(case_id).await?;
        self.case_repo
            .add_timeline_entry(
                &self.pool,
                case_id,
                payload.event_type.trim(),
                payload.description.trim(),
                Some(actor_id),
            )
            .await
    }

    pub async fn delete_timeline_entry(&self, case_id: Uuid, entry_id: Uuid) -> Result<(), AppError> {
        if !self.case_repo.delete_timeline_entry(case_id, entry_id).await? {
            return Err(AppError::NotFound("El evento"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::test_support, models::auth::StaffRole};

    async fn count(pool: &PgPool, table: &str, case_id: Uuid) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE case_id = $1"))
            .bind(case_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn deleting_a_case_removes_every_child_row(pool: PgPool) {
        let state = test_support::state_with_pool(pool.clone());
        let (lawyer, _) = test_support::staff_user(&state, "abogada@asme.mx", StaffRole::Lawyer).await;

        let payload: CreateCasePayload = serde_json::from_value(serde_json::json!({
            "caseNumber": "45/2026",
            "clientName": "Inmobiliaria del Bajío",
            "caseType": "familiar",
            "document": { "fileName": "demanda.pdf", "fileUrl": "https://archivo.externo.mx/demanda.pdf" }
        }))
        .unwrap();
        let case = state.case_service.create(&payload, lawyer).await.unwrap();

        let hearing = serde_json::from_value(serde_json::json!({
            "hearingDate": "2026-12-01",
            "hearingTime": "11:00",
            "hearingType": "Audiencia de pruebas",
            "autoDocument": { "fileName": "auto.pdf", "fileUrl": "https://archivo.externo.mx/auto.pdf" }
        }))
        .unwrap();
        state.hearing_service.create(case.id, &hearing, lawyer).await.unwrap();
        state.case_service.add_note(case.id, "Cliente entregó pruebas", lawyer).await.unwrap();

        assert_eq!(count(&pool, "case_documents", case.id).await, 2);
        assert!(count(&pool, "case_timeline", case.id).await >= 2);

        state.case_service.delete(case.id).await.unwrap();

        for table in ["case_notes", "hearings", "case_documents", "case_timeline"] {
            assert_eq!(count(&pool, table, case.id).await, 0, "{table}");
        }
        assert!(matches!(
            state.case_service.get_detail(case.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn status_change_is_recorded_only_when_it_changes() {
        assert_eq!(
            status_change_description(CaseStatus::Activo, Some(CaseStatus::EnProceso)).as_deref(),
            Some("Estado: Activo → En proceso")
        );
        assert_eq!(status_change_description(CaseStatus::Activo, Some(CaseStatus::Activo)), None);
        assert_eq!(status_change_description(CaseStatus::Cerrado, None), None);
    }

    #[test]
    fn document_kind_defaults_to_general() {
        assert_eq!(document_kind(None), "GENERAL");
        assert_eq!(document_kind(Some("  ")), "GENERAL");
        assert_eq!(document_kind(Some("sentencia")), "SENTENCIA");
    }

    #[tokio::test]
    async fn case_document_urls_map_to_bucket_keys() {
        let state = crate::config::test_support::state();
        let urls = [
            "https://media.asme.mx/casos/0001-demanda.pdf",
            "https://drive.google.com/file/d/abc",
        ];
        let keys: Vec<_> = urls
            .iter()
            .filter_map(|u| state.storage.object_key_from_url(u))
            .collect();
        assert_eq!(keys, vec!["casos/0001-demanda.pdf".to_string()]);
    }
}
