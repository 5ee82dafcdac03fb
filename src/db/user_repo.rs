// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{EmailOtp, Invitation, StaffRole, User},
};

const USER_COLUMNS: &str = "id, email, password_hash, full_name, created_at, updated_at";

// Usuarios, roles, códigos OTP e invitaciones
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Correo duplicado se traduce a EmailAlreadyExists
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name)
            VALUES (lower($1), $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn set_password<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET password_hash = $2,
                full_name = COALESCE($3, full_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    // =========================================================================
    //  ROLES
    // =========================================================================

    /// Rol del usuario en la tabla de consulta; sin fila equivale a `viewer`.
    pub async fn get_role(&self, user_id: Uuid) -> Result<StaffRole, AppError> {
        let role = sqlx::query_scalar::<_, StaffRole>(
            "SELECT role FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.unwrap_or_default())
    }

    pub async fn set_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: StaffRole,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  OTP
    // =========================================================================

    pub async fn create_otp(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO email_otps (email, code_hash, expires_at) VALUES (lower($1), $2, $3)",
        )
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Toma el código más reciente vigente y le descuenta un intento antes de compararlo.
    /// Agotados los intentos, el código deja de devolverse.
    pub async fn claim_otp_attempt(
        &self,
        email: &str,
        max_attempts: i32,
    ) -> Result<Option<EmailOtp>, AppError> {
        let otp = sqlx::query_as::<_, EmailOtp>(
            r#"
            UPDATE email_otps
            SET attempts = attempts + 1
            WHERE id = (
                SELECT id FROM email_otps
                WHERE email = lower($1)
                  AND consumed_at IS NULL
                  AND expires_at > NOW()
                ORDER BY created_at DESC
                LIMIT 1
                FOR UPDATE
            )
              AND attempts < $2
            RETURNING id, email, code_hash, attempts, expires_at, consumed_at, created_at
            "#,
        )
        .bind(email)
        .bind(max_attempts)
        .fetch_optional(&self.pool)
        .await?;

        Ok(otp)
    }

    // Devuelve false si otra petición ya lo consumió
    pub async fn consume_otp(&self, otp_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE email_otps SET consumed_at = NOW() WHERE id = $1 AND consumed_at IS NULL",
        )
        .bind(otp_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    //  INVITACIONES
    // =========================================================================

    pub async fn create_invitation(
        &self,
        email: &str,
        role: StaffRole,
        token_hash: &str,
        invited_by: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (email, role, token_hash, invited_by, expires_at)
            VALUES (lower($1), $2, $3, $4, $5)
            RETURNING id, email, role, token_hash, invited_by, expires_at, accepted_at, created_at
            "#,
        )
        .bind(email)
        .bind(role)
        .bind(token_hash)
        .bind(invited_by)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(invitation)
    }

    pub async fn find_pending_invitation<'e, E>(
        &self,
        executor: E,
        token_hash: &str,
    ) -> Result<Option<Invitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, email, role, token_hash, invited_by, expires_at, accepted_at, created_at
            FROM invitations
            WHERE token_hash = $1
              AND accepted_at IS NULL
              AND expires_at > NOW()
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(executor)
        .await?;

        Ok(invitation)
    }

    pub async fn mark_invitation_accepted<'e, E>(
        &self,
        executor: E,
        invitation_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE invitations SET accepted_at = NOW() WHERE id = $1")
            .bind(invitation_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
