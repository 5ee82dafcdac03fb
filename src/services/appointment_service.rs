// src/services/appointment_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AppointmentRepository,
    models::{
        appointments::{
            ApproveAppointmentPayload, Appointment, AppointmentStatus, CreateAppointmentPayload,
            RejectAppointmentPayload,
        },
        contact::ContactPayload,
    },
    services::email::{templates, EmailMessage, Mailer},
};

#[derive(Clone)]
pub struct AppointmentService {
    repo: AppointmentRepository,
    mailer: Arc<dyn Mailer>,
    notify_email: String,
}

/// Fecha y hora obligatorias para aprobar.
fn require_slot(payload: &ApproveAppointmentPayload) -> Result<(NaiveDate, NaiveTime), AppError> {
    match (payload.date, payload.time) {
        (Some(date), Some(time)) => Ok((date, time)),
        _ => Err(AppError::BadRequest(
            "Se requiere fecha y hora para aprobar la cita.".to_string(),
        )),
    }
}

fn ensure_pending(appointment: &Appointment) -> Result<(), AppError> {
    if appointment.status != AppointmentStatus::Pending {
        return Err(AppError::Conflict(
            "Sólo se pueden modificar citas pendientes.".to_string(),
        ));
    }
    Ok(())
}

impl AppointmentService {
    pub fn new(repo: AppointmentRepository, mailer: Arc<dyn Mailer>, notify_email: String) -> Self {
        Self { repo, mailer, notify_email }
    }

    // Los avisos por correo no deben tumbar la operación principal
    async fn notify(&self, message: EmailMessage) {
        let to = message.to.clone();
        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!("⚠️ No se pudo enviar el aviso a {}: {}", to, e);
        }
    }

    pub async fn create(&self, payload: &CreateAppointmentPayload) -> Result<Appointment, AppError> {
        let appointment = self.repo.create(payload).await?;
        tracing::info!("📅 Nueva solicitud de cita {} ({})", appointment.id, appointment.service);

        self.notify(templates::booking_notice(&self.notify_email, &appointment)).await;
        Ok(appointment)
    }

    pub async fn list(&self, status: Option<AppointmentStatus>) -> Result<Vec<Appointment>, AppError> {
        self.repo.list(status).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("La cita"))
    }

    pub async fn approve(&self, id: Uuid, payload: &ApproveAppointmentPayload) -> Result<Appointment, AppError> {
        let (date, time) = require_slot(payload)?;

        let appointment = self.get(id).await?;
        ensure_pending(&appointment)?;

        // Lectura y escritura separadas: dos aprobaciones simultáneas pueden colarse
        if let Some(other) = self.repo.find_approved_at(date, time, id).await? {
            tracing::info!("Conflicto de horario: la cita {} ya ocupa {} {}", other, date, time);
            return Err(AppError::Conflict(format!(
                "Ya existe una cita aprobada el {} a las {}.",
                date.format("%d/%m/%Y"),
                time.format("%H:%M")
            )));
        }

        let approved = self
            .repo
            .approve(id, date, time, payload.admin_notes.as_deref())
            .await?;

        self.notify(templates::appointment_approved(&approved)).await;
        Ok(approved)
    }

    pub async fn reject(&self, id: Uuid, payload: &RejectAppointmentPayload) -> Result<Appointment, AppError> {
        let appointment = self.get(id).await?;
        ensure_pending(&appointment)?;

        self.repo.reject(id, payload.admin_notes.as_deref()).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("La cita"));
        }
        Ok(())
    }

    /// Formulario de contacto: sólo reenvía al buzón del equipo.
    pub async fn contact(&self, payload: &ContactPayload) -> Result<(), AppError> {
        self.mailer
            .send(templates::contact_message(&self.notify_email, payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            full_name: "Carlos Méndez".into(),
            email: "carlos@empresa.mx".into(),
            phone: "5512345678".into(),
            service: "Consultoría".into(),
            participants: 1,
            message: None,
            preferred_date: None,
            preferred_time: None,
            status,
            appointment_date: None,
            appointment_time: None,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn approval_needs_both_date_and_time() {
        let only_date = ApproveAppointmentPayload {
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            ..Default::default()
        };
        let only_time = ApproveAppointmentPayload {
            time: NaiveTime::from_hms_opt(10, 0, 0),
            ..Default::default()
        };

        assert!(matches!(require_slot(&only_date), Err(AppError::BadRequest(_))));
        assert!(matches!(require_slot(&only_time), Err(AppError::BadRequest(_))));
        assert!(matches!(
            require_slot(&ApproveAppointmentPayload::default()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn approval_returns_the_requested_slot() {
        let payload = ApproveAppointmentPayload {
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            time: NaiveTime::from_hms_opt(10, 30, 0),
            admin_notes: None,
        };
        let (date, time) = require_slot(&payload).unwrap();
        assert_eq!(date.to_string(), "2025-03-14");
        assert_eq!(time.to_string(), "10:30:00");
    }

    #[test]
    fn only_pending_appointments_change() {
        assert!(ensure_pending(&appointment(AppointmentStatus::Pending)).is_ok());
        assert!(matches!(
            ensure_pending(&appointment(AppointmentStatus::Approved)),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_pending(&appointment(AppointmentStatus::Rejected)),
            Err(AppError::Conflict(_))
        ));
    }
}
