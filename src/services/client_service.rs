// src/services/client_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::clients::{
        history_event, Client, ClientFilter, ClientHistoryEvent, CreateClientPayload,
        UpdateClientPayload,
    },
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    pool: PgPool,
}

impl ClientService {
    pub fn new(repo: ClientRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, filter: &ClientFilter) -> Result<Vec<Client>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("El cliente"))
    }

    pub async fn create(&self, payload: &CreateClientPayload, actor_id: Uuid) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.repo.create(&mut *tx, payload).await?;
        self.repo
            .append_history(
                &mut *tx,
                client.id,
                history_event::CREATED,
                &format!("Cliente {} registrado", client.company_name),
                json!({ "status": client.status }),
                Some(actor_id),
            )
            .await?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateClientPayload,
        actor_id: Uuid,
    ) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let before = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("El cliente"))?;

        let client = self.repo.update(&mut *tx, id, payload).await?;

        if before.status != client.status {
            self.repo
                .append_history(
                    &mut *tx,
                    id,
                    history_event::STATUS_CHANGED,
                    "Cambio de estado",
                    json!({ "from": before.status, "to": client.status }),
                    Some(actor_id),
                )
                .await?;
        }

        tx.commit().await?;
        Ok(client)
    }

    pub async fn set_archived(&self, id: Uuid, archived: bool, actor_id: Uuid) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.repo.set_archived(&mut *tx, id, archived).await?;
        let (event, description) = if archived {
            (history_event::ARCHIVED, "Cliente archivado")
        } else {
            (history_event::RESTORED, "Cliente restaurado")
        };
        self.repo
            .append_history(&mut *tx, id, event, description, json!({}), Some(actor_id))
            .await?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("El cliente"));
        }
        Ok(())
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<ClientHistoryEvent>, AppError> {
        self.get(id).await?;
        self.repo.list_history(id).await
    }
}
