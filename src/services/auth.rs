// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Invitation, StaffRole, User, UserProfile},
    services::email::{templates, Mailer},
};

const TOKEN_TTL_DAYS: i64 = 7;
const OTP_TTL_MINUTES: i64 = 10;
const OTP_MAX_ATTEMPTS: i32 = 5;
const INVITE_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    mailer: Arc<dyn Mailer>,
    jwt_secret: String,
    dashboard_url: String,
    pool: PgPool,
}

async fn hash_secret(secret: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&secret, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_secret(secret: String, hashed: String) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || verify(&secret, &hashed))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;
    Ok(valid)
}

/// SHA-256 hexadecimal; los tokens de invitación se guardan así.
fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_otp() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:06}")
}

fn generate_invite_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        mailer: Arc<dyn Mailer>,
        jwt_secret: String,
        dashboard_url: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, mailer, jwt_secret, dashboard_url, pool }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<String, AppError> {
        let hashed_password = hash_secret(password.to_owned()).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(&mut *tx, email, Some(&hashed_password), full_name)
            .await?;
        self.user_repo.set_role(&mut *tx, user.id, StaffRole::Viewer).await?;
        tx.commit().await?;

        tracing::info!("👤 Usuario registrado: {}", user.email);
        self.create_token(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Usuarios creados sólo por OTP no tienen contraseña
        let password_hash = user.password_hash.clone().ok_or(AppError::InvalidCredentials)?;

        if !verify_secret(password.to_owned(), password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Envía un código de un solo uso. Correos desconocidos no reciben nada.
    pub async fn request_otp(&self, email: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(&self.pool, email).await?.is_none() {
            tracing::info!("OTP solicitado para un correo no registrado");
            return Ok(());
        }

        let code = generate_otp();
        let code_hash = hash_secret(code.clone()).await?;
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        self.user_repo.create_otp(email, &code_hash, expires_at).await?;

        self.mailer.send(templates::otp_code(email, &code)).await
    }

    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<String, AppError> {
        let otp = self
            .user_repo
            .claim_otp_attempt(email, OTP_MAX_ATTEMPTS)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        if !verify_secret(code.to_owned(), otp.code_hash.clone()).await? {
            tracing::info!(
                "Código OTP incorrecto para {} (intento {}/{})",
                otp.email,
                otp.attempts,
                OTP_MAX_ATTEMPTS
            );
            return Err(AppError::InvalidOtp);
        }

        // Otra petición pudo consumirlo entre la lectura y aquí
        if !self.user_repo.consume_otp(otp.id).await? {
            return Err(AppError::InvalidOtp);
        }

        let user = self
            .user_repo
            .find_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        self.create_token(&user)
    }

    pub async fn invite(
        &self,
        email: &str,
        role: StaffRole,
        invited_by: Uuid,
    ) -> Result<Invitation, AppError> {
        let token = generate_invite_token();
        let expires_at = Utc::now() + Duration::days(INVITE_TTL_DAYS);

        let invitation = self
            .user_repo
            .create_invitation(email, role, &digest_token(&token), invited_by, expires_at)
            .await?;

        let link = format!(
            "{}/aceptar-invitacion?token={}",
            self.dashboard_url.trim_end_matches('/'),
            token
        );
        self.mailer.send(templates::invitation(email, role, &link)).await?;

        tracing::info!("✉️ Invitación enviada a {} como {:?}", invitation.email, role);
        Ok(invitation)
    }

    pub async fn accept_invite(
        &self,
        token: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<String, AppError> {
        let hashed_password = hash_secret(password.to_owned()).await?;

        let mut tx = self.pool.begin().await?;

        let invitation = self
            .user_repo
            .find_pending_invitation(&mut *tx, &digest_token(token))
            .await?
            .ok_or(AppError::InvalidInvite)?;

        // Si el correo ya existe se actualiza su contraseña y rol
        let user = match self.user_repo.find_by_email(&mut *tx, &invitation.email).await? {
            Some(existing) => {
                self.user_repo
                    .set_password(&mut *tx, existing.id, &hashed_password, full_name)
                    .await?
            }
            None => {
                self.user_repo
                    .create_user(&mut *tx, &invitation.email, Some(&hashed_password), full_name)
                    .await?
            }
        };

        self.user_repo.set_role(&mut *tx, user.id, invitation.role).await?;
        self.user_repo.mark_invitation_accepted(&mut *tx, invitation.id).await?;

        tx.commit().await?;

        tracing::info!("✅ Invitación aceptada por {}", user.email);
        self.create_token(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("El usuario"))?;
        let role = self.user_repo.get_role(user_id).await?;

        Ok(UserProfile { user, role })
    }

    pub async fn set_role(&self, user_id: Uuid, role: StaffRole) -> Result<UserProfile, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("El usuario"))?;
        self.user_repo.set_role(&self.pool, user_id, role).await?;

        tracing::info!("🔑 Rol de {} cambiado a {:?}", user.email, role);
        Ok(UserProfile { user, role })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "abogada@asme.mx".into(),
            password_hash: None,
            full_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_round_trip_keeps_subject_and_email() {
        let service = test_support::state().auth_service;
        let user = user();

        let token = service.create_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "abogada@asme.mx");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let service = test_support::state().auth_service;
        let mut token = service.create_token(&user()).unwrap();
        token.push('x');

        assert!(matches!(service.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn otp_codes_have_six_digits() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn invite_tokens_are_hashed_deterministically() {
        let token = generate_invite_token();
        assert_eq!(token.len(), 48);
        assert_eq!(digest_token(&token), digest_token(&token));
        assert_ne!(digest_token(&token), token);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn accepting_an_invite_fits_in_one_connection(
        pool_options: PgPoolOptions,
        connect_options: PgConnectOptions,
    ) {
        let pool = pool_options
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_with(connect_options)
            .await
            .unwrap();
        let state = test_support::state_with_pool(pool);
        let service = &state.auth_service;
        let (admin, _) = test_support::staff_user(&state, "admin@asme.mx", StaffRole::Admin).await;
        let (existing, _) = test_support::staff_user(&state, "pasante@asme.mx", StaffRole::Viewer).await;
        let expires_at = Utc::now() + Duration::days(1);

        // Correo nuevo
        state
            .user_repo
            .create_invitation("nueva@asme.mx", StaffRole::Lawyer, &digest_token("token-nueva"), admin, expires_at)
            .await
            .unwrap();
        let token = service.accept_invite("token-nueva", "clave-nueva-123", Some("Nueva")).await.unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(state.user_repo.get_role(claims.sub).await.unwrap(), StaffRole::Lawyer);

        // Correo ya registrado: conserva el id y toma el rol invitado
        state
            .user_repo
            .create_invitation("pasante@asme.mx", StaffRole::Assistant, &digest_token("token-pasante"), admin, expires_at)
            .await
            .unwrap();
        let token = service.accept_invite("token-pasante", "clave-pasante-123", None).await.unwrap();
        assert_eq!(service.validate_token(&token).unwrap().sub, existing);
        assert_eq!(state.user_repo.get_role(existing).await.unwrap(), StaffRole::Assistant);
        assert!(service.login("pasante@asme.mx", "clave-pasante-123").await.is_ok());

        // Una invitación sólo se acepta una vez
        assert!(matches!(
            service.accept_invite("token-pasante", "otra-clave-123", None).await,
            Err(AppError::InvalidInvite)
        ));
    }

    async fn issue_otp(state: &crate::config::AppState, email: &str, code: &str) {
        let code_hash = hash_secret(code.to_owned()).await.unwrap();
        state
            .user_repo
            .create_otp(email, &code_hash, Utc::now() + Duration::minutes(OTP_TTL_MINUTES))
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn otp_is_burned_after_too_many_wrong_codes(pool: PgPool) {
        let state = test_support::state_with_pool(pool);
        let service = &state.auth_service;
        test_support::staff_user(&state, "recepcion@asme.mx", StaffRole::Viewer).await;
        issue_otp(&state, "recepcion@asme.mx", "482913").await;

        for _ in 0..OTP_MAX_ATTEMPTS {
            assert!(matches!(
                service.verify_otp("recepcion@asme.mx", "000000").await,
                Err(AppError::InvalidOtp)
            ));
        }

        // El código correcto ya no sirve
        assert!(matches!(
            service.verify_otp("recepcion@asme.mx", "482913").await,
            Err(AppError::InvalidOtp)
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn otp_survives_a_typo_and_is_single_use(pool: PgPool) {
        let state = test_support::state_with_pool(pool);
        let service = &state.auth_service;
        let (user_id, _) = test_support::staff_user(&state, "abogado@asme.mx", StaffRole::Lawyer).await;
        issue_otp(&state, "abogado@asme.mx", "120045").await;

        assert!(service.verify_otp("abogado@asme.mx", "120046").await.is_err());

        let token = service.verify_otp("Abogado@asme.mx", "120045").await.unwrap();
        assert_eq!(service.validate_token(&token).unwrap().sub, user_id);

        assert!(matches!(
            service.verify_otp("abogado@asme.mx", "120045").await,
            Err(AppError::InvalidOtp)
        ));
    }
}
