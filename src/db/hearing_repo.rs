// src/db/hearing_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::hearings::{AgendaEntry, AgendaFilter, CreateHearingPayload, Hearing, UpdateHearingPayload},
};

const HEARING_COLUMNS: &str = r#"
    id, case_id, hearing_date, hearing_time, hearing_type, room,
    status, notes, created_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct HearingRepository {
    pool: PgPool,
}

impl HearingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        case_id: Uuid,
        payload: &CreateHearingPayload,
        created_by: Uuid,
    ) -> Result<Hearing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hearing = sqlx::query_as::<_, Hearing>(&format!(
            r#"
            INSERT INTO hearings (
                case_id, hearing_date, hearing_time, hearing_type, room, status, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'programada'::hearing_status), $7, $8)
            RETURNING {HEARING_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(payload.hearing_date)
        .bind(payload.hearing_time)
        .bind(payload.hearing_type.trim())
        .bind(payload.room.as_deref())
        .bind(payload.status)
        .bind(payload.notes.as_deref())
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(hearing)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Hearing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hearing = sqlx::query_as::<_, Hearing>(&format!(
            "SELECT {HEARING_COLUMNS} FROM hearings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(hearing)
    }

    pub async fn list_for_case<'e, E>(&self, executor: E, case_id: Uuid) -> Result<Vec<Hearing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hearings = sqlx::query_as::<_, Hearing>(&format!(
            r#"
            SELECT {HEARING_COLUMNS}
            FROM hearings WHERE case_id = $1
            ORDER BY hearing_date, hearing_time
            "#
        ))
        .bind(case_id)
        .fetch_all(executor)
        .await?;

        Ok(hearings)
    }

    // Agenda general con datos del caso; sólo casos no archivados
    pub async fn agenda(&self, filter: &AgendaFilter) -> Result<Vec<AgendaEntry>, AppError> {
        let entries = sqlx::query_as::<_, AgendaEntry>(
            r#"
            SELECT
                h.id, h.case_id, h.hearing_date, h.hearing_time, h.hearing_type, h.room,
                h.status, h.notes, h.created_by, h.created_at, h.updated_at,
                c.case_number, c.client_name
            FROM hearings h
            JOIN cases c ON c.id = h.case_id
            WHERE c.archived = FALSE
              AND ($1::date IS NULL OR h.hearing_date >= $1)
              AND ($2::date IS NULL OR h.hearing_date <= $2)
              AND ($3::hearing_status IS NULL OR h.status = $3)
            ORDER BY h.hearing_date, h.hearing_time
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateHearingPayload,
    ) -> Result<Hearing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Hearing>(&format!(
            r#"
            UPDATE hearings
            SET hearing_date = COALESCE($2, hearing_date),
                hearing_time = COALESCE($3, hearing_time),
                hearing_type = COALESCE($4, hearing_type),
                room         = COALESCE($5, room),
                status       = COALESCE($6, status),
                notes        = COALESCE($7, notes),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {HEARING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.hearing_date)
        .bind(payload.hearing_time)
        .bind(payload.hearing_type.as_deref())
        .bind(payload.room.as_deref())
        .bind(payload.status)
        .bind(payload.notes.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("La audiencia"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM hearings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_for_case<'e, E>(&self, executor: E, case_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM hearings WHERE case_id = $1")
            .bind(case_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
