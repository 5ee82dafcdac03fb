// src/db/case_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::cases::{
        Case, CaseDocument, CaseFilter, CaseNote, CaseStatus, CreateCasePayload, TimelineEntry,
        UpdateCasePayload,
    },
};

const CASE_COLUMNS: &str = r#"
    id, case_number, client_name, client_email, client_phone,
    case_type, status, assigned_to, summary, next_hearing_at,
    archived, created_by, created_at, updated_at
"#;

const DOCUMENT_COLUMNS: &str =
    "id, case_id, hearing_id, kind, file_name, file_url, uploaded_by, created_at";

#[derive(Clone)]
pub struct CaseRepository {
    pool: PgPool,
}

impl CaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CASOS
    // =========================================================================

    pub async fn create_case<'e, E>(
        &self,
        executor: E,
        payload: &CreateCasePayload,
        created_by: Uuid,
    ) -> Result<Case, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            INSERT INTO cases (
                case_number, client_name, client_email, client_phone,
                case_type, status, assigned_to, summary, created_by
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'activo'::case_status), $7, $8, $9)
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(payload.case_number.trim())
        .bind(payload.client_name.trim())
        .bind(payload.client_email.as_deref())
        .bind(payload.client_phone.as_deref())
        .bind(payload.case_type)
        .bind(payload.status)
        .bind(payload.assigned_to)
        .bind(payload.summary.as_deref())
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Ya existe un caso con el número {}.",
                        payload.case_number.trim()
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Case>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(case)
    }

    pub async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, AppError> {
        let cases = sqlx::query_as::<_, Case>(&format!(
            r#"
            SELECT {CASE_COLUMNS}
            FROM cases
            WHERE archived = COALESCE($1, FALSE)
              AND ($2::case_status IS NULL OR status = $2)
              AND ($3::case_type IS NULL OR case_type = $3)
            ORDER BY updated_at DESC
            "#
        ))
        .bind(filter.archived)
        .bind(filter.status)
        .bind(filter.case_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(cases)
    }

    pub async fn update_case<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateCasePayload,
    ) -> Result<Case, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET client_name  = COALESCE($2, client_name),
                client_email = COALESCE($3, client_email),
                client_phone = COALESCE($4, client_phone),
                case_type    = COALESCE($5, case_type),
                status       = COALESCE($6, status),
                assigned_to  = COALESCE($7, assigned_to),
                summary      = COALESCE($8, summary),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.client_name.as_deref())
        .bind(payload.client_email.as_deref())
        .bind(payload.client_phone.as_deref())
        .bind(payload.case_type)
        .bind(payload.status)
        .bind(payload.assigned_to)
        .bind(payload.summary.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("El caso"))?;

        Ok(case)
    }

    pub async fn set_archived(&self, id: Uuid, archived: bool) -> Result<Case, AppError> {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases SET archived = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(archived)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("El caso"))
    }

    pub async fn set_next_hearing<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        next_hearing_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE cases SET next_hearing_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(next_hearing_at)
            .execute(executor)
            .await?;

        Ok(())
    }

    // Estado actual, para detectar cambios antes de actualizar
    pub async fn current_status<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<CaseStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_scalar::<_, CaseStatus>("SELECT status FROM cases WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(status)
    }

    // =========================================================================
    //  BORRADO EN CASCADA
    // =========================================================================

    pub async fn delete_notes_for_case<'e, E>(&self, executor: E, case_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM case_notes WHERE case_id = $1")
            .bind(case_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Borra los documentos del caso y devuelve sus URLs para limpiar el bucket.
    pub async fn delete_documents_for_case<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let urls = sqlx::query_scalar::<_, String>(
            "DELETE FROM case_documents WHERE case_id = $1 RETURNING file_url",
        )
        .bind(case_id)
        .fetch_all(executor)
        .await?;
        Ok(urls)
    }

    pub async fn delete_timeline_for_case<'e, E>(&self, executor: E, case_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM case_timeline WHERE case_id = $1")
            .bind(case_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_case<'e, E>(&self, executor: E, case_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(case_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  NOTAS
    // =========================================================================

    pub async fn add_note(&self, case_id: Uuid, author_id: Uuid, content: &str) -> Result<CaseNote, AppError> {
        let note = sqlx::query_as::<_, CaseNote>(
            r#"
            INSERT INTO case_notes (case_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, case_id, author_id, content, created_at
            "#,
        )
        .bind(case_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn list_notes(&self, case_id: Uuid) -> Result<Vec<CaseNote>, AppError> {
        let notes = sqlx::query_as::<_, CaseNote>(
            r#"
            SELECT id, case_id, author_id, content, created_at
            FROM case_notes WHERE case_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn delete_note(&self, case_id: Uuid, note_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM case_notes WHERE id = $1 AND case_id = $2")
            .bind(note_id)
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  DOCUMENTOS
    // =========================================================================

    pub async fn add_document<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
        hearing_id: Option<Uuid>,
        kind: &str,
        file_name: &str,
        file_url: &str,
        uploaded_by: Uuid,
    ) -> Result<CaseDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, CaseDocument>(&format!(
            r#"
            INSERT INTO case_documents (case_id, hearing_id, kind, file_name, file_url, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(hearing_id)
        .bind(kind)
        .bind(file_name)
        .bind(file_url)
        .bind(uploaded_by)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn list_documents(&self, case_id: Uuid) -> Result<Vec<CaseDocument>, AppError> {
        let documents = sqlx::query_as::<_, CaseDocument>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM case_documents WHERE case_id = $1 ORDER BY created_at DESC"
        ))
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    /// Devuelve la URL del documento borrado, si existía.
    pub async fn delete_document(&self, case_id: Uuid, document_id: Uuid) -> Result<Option<String>, AppError> {
        let url = sqlx::query_scalar::<_, String>(
            "DELETE FROM case_documents WHERE id = $1 AND case_id = $2 RETURNING file_url",
        )
        .bind(document_id)
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(url)
    }

    // =========================================================================
    //  LÍNEA DE TIEMPO
    // =========================================================================

    pub async fn add_timeline_entry<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
        event_type: &str,
        description: &str,
        actor_id: Option<Uuid>,
    ) -> Result<TimelineEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, TimelineEntry>(
            r#"
            INSERT INTO case_timeline (case_id, event_type, description, actor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, case_id, event_type, description, actor_id, created_at
            "#,
        )
        .bind(case_id)
        .bind(event_type)
        .bind(description)
        .bind(actor_id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_timeline(&self, case_id: Uuid) -> Result<Vec<TimelineEntry>, AppError> {
        let entries = sqlx::query_as::<_, TimelineEntry>(
            r#"
            SELECT id, case_id, event_type, description, actor_id, created_at
            FROM case_timeline WHERE case_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn delete_timeline_entry(&self, case_id: Uuid, entry_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM case_timeline WHERE id = $1 AND case_id = $2")
            .bind(entry_id)
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Usado por la migración de medios
    pub async fn list_document_urls_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, file_url FROM case_documents WHERE starts_with(file_url, $1)",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_document_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE case_documents SET file_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
