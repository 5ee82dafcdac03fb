// src/db/client_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        campaigns::Recipient,
        clients::{
            Client, ClientFilter, ClientHistoryEvent, ClientStatus, CreateClientPayload,
            UpdateClientPayload,
        },
    },
};

const CLIENT_COLUMNS: &str = r#"
    id, company_name, contact_name, email, phone, industry,
    status, notes, archived, created_at, updated_at
"#;

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (company_name, contact_name, email, phone, industry, status, notes)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'prospecto'::client_status), $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(payload.company_name.trim())
        .bind(payload.contact_name.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.industry.as_deref())
        .bind(payload.status)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(client)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn list(&self, filter: &ClientFilter) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE archived = COALESCE($1, FALSE)
              AND ($2::client_status IS NULL OR status = $2)
            ORDER BY company_name
            "#
        ))
        .bind(filter.archived)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET company_name = COALESCE($2, company_name),
                contact_name = COALESCE($3, contact_name),
                email        = COALESCE($4, email),
                phone        = COALESCE($5, phone),
                industry     = COALESCE($6, industry),
                status       = COALESCE($7, status),
                notes        = COALESCE($8, notes),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.company_name.as_deref())
        .bind(payload.contact_name.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.industry.as_deref())
        .bind(payload.status)
        .bind(payload.notes.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("El cliente"))
    }

    pub async fn set_archived<'e, E>(&self, executor: E, id: Uuid, archived: bool) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients SET archived = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(archived)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("El cliente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clientes no archivados con correo, filtrados por estado.
    pub async fn recipients<'e, E>(
        &self,
        executor: E,
        status: Option<ClientStatus>,
    ) -> Result<Vec<Recipient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recipients = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT id AS client_id, email
            FROM clients
            WHERE archived = FALSE
              AND email IS NOT NULL AND email <> ''
              AND ($1::client_status IS NULL OR status = $1)
            ORDER BY company_name
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(recipients)
    }

    // =========================================================================
    //  HISTORIAL (sólo inserción)
    // =========================================================================

    pub async fn append_history<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        event_type: &str,
        description: &str,
        metadata: Value,
        actor_id: Option<Uuid>,
    ) -> Result<ClientHistoryEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, ClientHistoryEvent>(
            r#"
            INSERT INTO client_history (client_id, event_type, description, metadata, actor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, event_type, description, metadata, actor_id, created_at
            "#,
        )
        .bind(client_id)
        .bind(event_type)
        .bind(description)
        .bind(metadata)
        .bind(actor_id)
        .fetch_one(executor)
        .await?;

        Ok(event)
    }

    pub async fn list_history(&self, client_id: Uuid) -> Result<Vec<ClientHistoryEvent>, AppError> {
        let events = sqlx::query_as::<_, ClientHistoryEvent>(
            r#"
            SELECT id, client_id, event_type, description, metadata, actor_id, created_at
            FROM client_history
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
