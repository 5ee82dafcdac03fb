// src/db/campaign_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::campaigns::{
        Campaign, CampaignStatus, CampaignTarget, CreateCampaignPayload, Recipient, TargetStatus,
        UpdateCampaignPayload,
    },
};

const CAMPAIGN_COLUMNS: &str = r#"
    id, name, subject, body_html, segment, status, sent_at,
    created_by, created_at, updated_at
"#;

const TARGET_COLUMNS: &str = "id, campaign_id, client_id, email, status, error, sent_at";

#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateCampaignPayload, created_by: Uuid) -> Result<Campaign, AppError> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            INSERT INTO email_campaigns (name, subject, body_html, segment, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(payload.name.trim())
        .bind(payload.subject.trim())
        .bind(&payload.body_html)
        .bind(payload.segment.as_str())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(campaign)
    }

    pub async fn list(&self) -> Result<Vec<Campaign>, AppError> {
        let campaigns = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM email_campaigns ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Campaign>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM email_campaigns WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(campaign)
    }

    // Sólo se editan borradores
    pub async fn update_draft(&self, id: Uuid, payload: &UpdateCampaignPayload) -> Result<Option<Campaign>, AppError> {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            UPDATE email_campaigns
            SET name       = COALESCE($2, name),
                subject    = COALESCE($3, subject),
                body_html  = COALESCE($4, body_html),
                segment    = COALESCE($5, segment),
                updated_at = NOW()
            WHERE id = $1 AND status = 'draft'
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.subject.as_deref())
        .bind(payload.body_html.as_deref())
        .bind(payload.segment.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM email_campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(&format!(
            r#"
            UPDATE email_campaigns
            SET status = $2,
                sent_at = CASE WHEN $2 = 'sent'::campaign_status THEN NOW() ELSE sent_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(campaign)
    }

    // =========================================================================
    //  DESTINATARIOS
    // =========================================================================

    /// Reemplaza los destinatarios de la campaña por los del segmento actual.
    pub async fn replace_targets(
        &self,
        conn: &mut PgConnection,
        campaign_id: Uuid,
        recipients: &[Recipient],
    ) -> Result<Vec<CampaignTarget>, AppError> {
        sqlx::query("DELETE FROM campaign_targets WHERE campaign_id = $1")
            .bind(campaign_id)
            .execute(&mut *conn)
            .await?;

        let client_ids: Vec<Uuid> = recipients.iter().map(|r| r.client_id).collect();
        let emails: Vec<String> = recipients.iter().map(|r| r.email.clone()).collect();

        let targets = sqlx::query_as::<_, CampaignTarget>(&format!(
            r#"
            INSERT INTO campaign_targets (campaign_id, client_id, email)
            SELECT $1, t.client_id, t.email
            FROM unnest($2::uuid[], $3::text[]) AS t(client_id, email)
            RETURNING {TARGET_COLUMNS}
            "#
        ))
        .bind(campaign_id)
        .bind(&client_ids)
        .bind(&emails)
        .fetch_all(&mut *conn)
        .await?;

        Ok(targets)
    }

    pub async fn mark_target(
        &self,
        target_id: Uuid,
        status: TargetStatus,
        error: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE campaign_targets
            SET status = $2,
                error = $3,
                sent_at = CASE WHEN $2 = 'sent'::target_status THEN NOW() ELSE NULL END
            WHERE id = $1
            "#,
        )
        .bind(target_id)
        .bind(status)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_targets(&self, campaign_id: Uuid) -> Result<Vec<CampaignTarget>, AppError> {
        let targets = sqlx::query_as::<_, CampaignTarget>(&format!(
            "SELECT {TARGET_COLUMNS} FROM campaign_targets WHERE campaign_id = $1 ORDER BY email"
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(targets)
    }
}
