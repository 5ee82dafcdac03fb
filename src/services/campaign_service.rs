// src/services/campaign_service.rs

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CampaignRepository, ClientRepository},
    models::{
        campaigns::{
            Campaign, CampaignStatus, CampaignTarget, CreateCampaignPayload, Segment, SendSummary,
            TargetStatus, UpdateCampaignPayload,
        },
        clients::history_event,
    },
    services::email::{EmailMessage, Mailer},
};

#[derive(Clone)]
pub struct CampaignService {
    campaign_repo: CampaignRepository,
    client_repo: ClientRepository,
    mailer: Arc<dyn Mailer>,
    pool: PgPool,
}

/// Una campaña queda `sent` si al menos un correo salió.
fn final_status(summary: &SendSummary) -> CampaignStatus {
    if summary.sent > 0 {
        CampaignStatus::Sent
    } else {
        CampaignStatus::Failed
    }
}

impl CampaignService {
    pub fn new(
        campaign_repo: CampaignRepository,
        client_repo: ClientRepository,
        mailer: Arc<dyn Mailer>,
        pool: PgPool,
    ) -> Self {
        Self { campaign_repo, client_repo, mailer, pool }
    }

    pub async fn list(&self) -> Result<Vec<Campaign>, AppError> {
        self.campaign_repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Campaign, AppError> {
        self.campaign_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("La campaña"))
    }

    pub async fn create(&self, payload: &CreateCampaignPayload, actor_id: Uuid) -> Result<Campaign, AppError> {
        self.campaign_repo.create(payload, actor_id).await
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateCampaignPayload) -> Result<Campaign, AppError> {
        match self.campaign_repo.update_draft(id, payload).await? {
            Some(campaign) => Ok(campaign),
            None => {
                // Existe pero ya no es borrador
                self.get(id).await?;
                Err(AppError::Conflict("Sólo se pueden editar campañas en borrador.".to_string()))
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.campaign_repo.delete(id).await? {
            return Err(AppError::NotFound("La campaña"));
        }
        Ok(())
    }

    pub async fn targets(&self, id: Uuid) -> Result<Vec<CampaignTarget>, AppError> {
        self.get(id).await?;
        self.campaign_repo.list_targets(id).await
    }

    /// Envía a cada destinatario. Los errores de base al registrar un envío se
    /// registran en el log y no cortan el ciclo.
    async fn deliver(
        &self,
        campaign: &Campaign,
        targets: &[CampaignTarget],
        actor_id: Uuid,
    ) -> SendSummary {
        let mut summary = SendSummary { total: targets.len(), sent: 0, failed: 0 };

        for target in targets {
            let message = EmailMessage {
                to: target.email.clone(),
                subject: campaign.subject.clone(),
                html: campaign.body_html.clone(),
            };

            match self.mailer.send(message).await {
                Ok(()) => {
                    summary.sent += 1;
                    if let Err(e) = self
                        .campaign_repo
                        .mark_target(target.id, TargetStatus::Sent, None)
                        .await
                    {
                        tracing::warn!("No se marcó como enviado el destinatario {}: {}", target.email, e);
                    }

                    if let Some(client_id) = target.client_id {
                        if let Err(e) = self
                            .client_repo
                            .append_history(
                                &self.pool,
                                client_id,
                                history_event::CAMPAIGN_SENT,
                                &format!("Campaña enviada: {}", campaign.name),
                                json!({ "campaignId": campaign.id, "subject": campaign.subject }),
                                Some(actor_id),
                            )
                            .await
                        {
                            tracing::warn!("No se registró el historial del cliente {}: {}", client_id, e);
                        }
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("⚠️ Falló el envío a {}: {}", target.email, e);
                    if let Err(db_err) = self
                        .campaign_repo
                        .mark_target(target.id, TargetStatus::Failed, Some(&e.to_string()))
                        .await
                    {
                        tracing::warn!("No se marcó como fallido el destinatario {}: {}", target.email, db_err);
                    }
                }
            }
        }

        summary
    }

    /// Resuelve el segmento, registra los destinatarios y envía uno por uno.
    pub async fn send(&self, id: Uuid, actor_id: Uuid) -> Result<SendSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let campaign = self
            .campaign_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("La campaña"))?;

        if !campaign.status.can_send() {
            return Err(AppError::Conflict(
                "La campaña ya fue enviada o se está enviando.".to_string(),
            ));
        }

        let segment: Segment = campaign
            .segment
            .parse()
            .map_err(AppError::BadRequest)?;

        let recipients = self
            .client_repo
            .recipients(&mut *tx, segment.client_status())
            .await?;

        if recipients.is_empty() {
            return Err(AppError::BadRequest(
                "El segmento no tiene clientes con correo.".to_string(),
            ));
        }

        let targets = self
            .campaign_repo
            .replace_targets(&mut tx, id, &recipients)
            .await?;
        self.campaign_repo
            .set_status(&mut *tx, id, CampaignStatus::Sending)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📨 Enviando campaña '{}' a {} destinatarios ({})",
            campaign.name,
            targets.len(),
            segment.as_str()
        );

        let summary = self.deliver(&campaign, &targets, actor_id).await;

        // El estado final se escribe aunque fallen destinatarios
        self.campaign_repo
            .set_status(&self.pool, id, final_status(&summary))
            .await?;

        tracing::info!(
            "✅ Campaña '{}' terminada: {} enviados, {} fallidos",
            campaign.name,
            summary.sent,
            summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::test_support,
        models::{auth::StaffRole, clients::CreateClientPayload},
    };

    /// Entrega el correo pero deja inservible la tabla de destinatarios.
    struct BrokenTargetsMailer {
        pool: PgPool,
    }

    #[async_trait::async_trait]
    impl Mailer for BrokenTargetsMailer {
        async fn send(&self, _message: EmailMessage) -> Result<(), AppError> {
            let _ = sqlx::query("ALTER TABLE campaign_targets RENAME TO campaign_targets_off")
                .execute(&self.pool)
                .await;
            Ok(())
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn bookkeeping_errors_still_close_the_campaign(pool: PgPool) {
        let state = test_support::state_with_mailer(
            pool.clone(),
            Arc::new(BrokenTargetsMailer { pool: pool.clone() }),
        );
        let (admin, _) = test_support::staff_user(&state, "admin@asme.mx", StaffRole::Admin).await;

        for (company, email) in [("Acme", "compras@acme.mx"), ("Textiles León", "rh@textiles.mx")] {
            let client: CreateClientPayload = serde_json::from_value(serde_json::json!({
                "companyName": company,
                "email": email,
                "status": "activo"
            }))
            .unwrap();
            state.client_service.create(&client, admin).await.unwrap();
        }

        let payload: CreateCampaignPayload = serde_json::from_value(serde_json::json!({
            "name": "Simulacro noviembre",
            "subject": "Programa su simulacro",
            "bodyHtml": "<p>Agende su simulacro de evacuación.</p>"
        }))
        .unwrap();
        let campaign = state.campaign_service.create(&payload, admin).await.unwrap();

        let summary = state.campaign_service.send(campaign.id, admin).await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.sent, 2);

        let campaign = state.campaign_service.get(campaign.id).await.unwrap();
        assert_eq!(campaign.status, CampaignStatus::Sent);
    }

    #[test]
    fn campaign_fails_only_when_nothing_was_delivered() {
        let partial = SendSummary { total: 3, sent: 1, failed: 2 };
        let none = SendSummary { total: 2, sent: 0, failed: 2 };

        assert_eq!(final_status(&partial), CampaignStatus::Sent);
        assert_eq!(final_status(&none), CampaignStatus::Failed);
    }
}
