// src/services/hearing_service.rs

use chrono::Local;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CaseRepository, HearingRepository},
    models::{
        cases::timeline_event,
        hearings::{
            next_scheduled, AgendaEntry, AgendaFilter, CreateHearingPayload, Hearing,
            UpdateHearingPayload, AUTO_DOCUMENT_KIND,
        },
    },
};

#[derive(Clone)]
pub struct HearingService {
    hearing_repo: HearingRepository,
    case_repo: CaseRepository,
    pool: PgPool,
}

impl HearingService {
    pub fn new(hearing_repo: HearingRepository, case_repo: CaseRepository, pool: PgPool) -> Self {
        Self { hearing_repo, case_repo, pool }
    }

    /// Agenda de audiencias; sin `from` arranca en el día de hoy.
    pub async fn agenda(&self, filter: &AgendaFilter) -> Result<Vec<AgendaEntry>, AppError> {
        let effective = AgendaFilter {
            from: filter.from.or_else(|| Some(Local::now().date_naive())),
            to: filter.to,
            status: filter.status,
        };
        self.hearing_repo.agenda(&effective).await
    }

    pub async fn list_for_case(&self, case_id: Uuid) -> Result<Vec<Hearing>, AppError> {
        self.case_repo
            .find_by_id(&self.pool, case_id)
            .await?
            .ok_or(AppError::NotFound("El caso"))?;

        self.hearing_repo.list_for_case(&self.pool, case_id).await
    }

    // Las horas de audiencia son locales; se guardan tal cual con zona UTC
    async fn refresh_next_hearing(&self, conn: &mut PgConnection, case_id: Uuid) -> Result<(), AppError> {
        let hearings = self.hearing_repo.list_for_case(&mut *conn, case_id).await?;
        let next = next_scheduled(&hearings, Local::now().naive_local());

        self.case_repo
            .set_next_hearing(&mut *conn, case_id, next.map(|at| at.and_utc()))
            .await
    }

    /// Programa la audiencia junto con su AUTO, el evento de línea de tiempo y la próxima fecha del caso.
    pub async fn create(
        &self,
        case_id: Uuid,
        payload: &CreateHearingPayload,
        actor_id: Uuid,
    ) -> Result<Hearing, AppError> {
        let auto = payload.auto_document.as_ref().ok_or_else(|| {
            AppError::BadRequest("Debe adjuntar el AUTO de la audiencia.".to_string())
        })?;

        let mut tx = self.pool.begin().await?;

        self.case_repo
            .find_by_id(&mut *tx, case_id)
            .await?
            .ok_or(AppError::NotFound("El caso"))?;

        let hearing = self.hearing_repo.create(&mut *tx, case_id, payload, actor_id).await?;

        self.case_repo
            .add_document(
                &mut *tx,
                case_id,
                Some(hearing.id),
                AUTO_DOCUMENT_KIND,
                auto.file_name.trim(),
                &auto.file_url,
                actor_id,
            )
            .await?;

        self.case_repo
            .add_timeline_entry(
                &mut *tx,
                case_id,
                timeline_event::HEARING_SCHEDULED,
                &format!(
                    "{} programada para el {} a las {}",
                    hearing.hearing_type,
                    hearing.hearing_date.format("%d/%m/%Y"),
                    hearing.hearing_time.format("%H:%M")
                ),
                Some(actor_id),
            )
            .await?;

        self.refresh_next_hearing(&mut tx, case_id).await?;

        tx.commit().await?;

        tracing::info!("📌 Audiencia {} programada en el caso {}", hearing.id, case_id);
        Ok(hearing)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateHearingPayload,
        actor_id: Uuid,
    ) -> Result<Hearing, AppError> {
        let mut tx = self.pool.begin().await?;

        let hearing = self.hearing_repo.update(&mut *tx, id, payload).await?;

        self.case_repo
            .add_timeline_entry(
                &mut *tx,
                hearing.case_id,
                timeline_event::HEARING_UPDATED,
                &format!(
                    "{} del {} actualizada ({:?})",
                    hearing.hearing_type,
                    hearing.hearing_date.format("%d/%m/%Y"),
                    hearing.status
                ),
                Some(actor_id),
            )
            .await?;

        self.refresh_next_hearing(&mut tx, hearing.case_id).await?;

        tx.commit().await?;
        Ok(hearing)
    }

    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let hearing = self
            .hearing_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("La audiencia"))?;

        self.hearing_repo.delete(&mut *tx, id).await?;

        self.case_repo
            .add_timeline_entry(
                &mut *tx,
                hearing.case_id,
                timeline_event::HEARING_DELETED,
                &format!(
                    "{} del {} eliminada",
                    hearing.hearing_type,
                    hearing.hearing_date.format("%d/%m/%Y")
                ),
                Some(actor_id),
            )
            .await?;

        self.refresh_next_hearing(&mut tx, hearing.case_id).await?;

        tx.commit().await?;
        Ok(())
    }
}
