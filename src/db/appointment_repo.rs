// src/db/appointment_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::appointments::{Appointment, AppointmentStatus, CreateAppointmentPayload},
};

const APPOINTMENT_COLUMNS: &str = r#"
    id, full_name, email, phone, service, participants, message,
    preferred_date, preferred_time, status,
    appointment_date, appointment_time, admin_notes,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateAppointmentPayload) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (
                full_name, email, phone, service, participants, message,
                preferred_date, preferred_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(payload.full_name.trim())
        .bind(payload.email.trim())
        .bind(payload.phone.trim())
        .bind(&payload.service)
        .bind(payload.participants)
        .bind(payload.message.as_deref())
        .bind(payload.preferred_date)
        .bind(payload.preferred_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    pub async fn list(&self, status: Option<AppointmentStatus>) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE ($1::appointment_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    /// Cita aprobada en exactamente la misma fecha y hora, distinta de `exclude_id`.
    pub async fn find_approved_at(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        exclude_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let conflict = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM appointments
            WHERE status = 'approved'
              AND appointment_date = $1
              AND appointment_time = $2
              AND id <> $3
            LIMIT 1
            "#,
        )
        .bind(date)
        .bind(time)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conflict)
    }

    pub async fn approve(
        &self,
        id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        admin_notes: Option<&str>,
    ) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET status = 'approved',
                appointment_date = $2,
                appointment_time = $3,
                admin_notes = COALESCE($4, admin_notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(date)
        .bind(time)
        .bind(admin_notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    pub async fn reject(&self, id: Uuid, admin_notes: Option<&str>) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET status = 'rejected',
                admin_notes = COALESCE($2, admin_notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
