// src/middleware/roles.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::StaffRole,
};

/// Regla que decide qué roles pasan.
pub trait RolePolicy: Send + Sync + 'static {
    fn allows(role: StaffRole) -> bool;
    fn denied_message() -> &'static str;
}

/// Extractor: usuario autenticado cuyo rol cumple la política `P`.
pub struct RequireRole<P> {
    pub user: AuthenticatedUser,
    pub role: StaffRole,
    _policy: PhantomData<P>,
}

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // Sin fila en user_roles equivale a viewer
        let role = app_state.user_repo.get_role(user.id).await?;

        if !P::allows(role) {
            tracing::info!("Acceso denegado a {} ({:?})", user.email, role);
            return Err(AppError::Forbidden(P::denied_message().to_string()));
        }

        Ok(RequireRole { user, role, _policy: PhantomData })
    }
}

// ---
// POLÍTICAS
// ---

/// Crear o editar casos y audiencias.
pub struct LegalEditor;
impl RolePolicy for LegalEditor {
    fn allows(role: StaffRole) -> bool {
        role.can_edit_legal()
    }
    fn denied_message() -> &'static str {
        "Tu rol no permite modificar casos ni audiencias."
    }
}

pub struct AdminOnly;
impl RolePolicy for AdminOnly {
    fn allows(role: StaffRole) -> bool {
        role.is_admin()
    }
    fn denied_message() -> &'static str {
        "Esta acción requiere rol de administrador."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_editor_rejects_viewers() {
        assert!(LegalEditor::allows(StaffRole::Lawyer));
        assert!(LegalEditor::allows(StaffRole::Assistant));
        assert!(!LegalEditor::allows(StaffRole::Viewer));
        assert!(!LegalEditor::allows(StaffRole::default()));
    }

    #[test]
    fn admin_only_is_strict() {
        assert!(AdminOnly::allows(StaffRole::Admin));
        assert!(!AdminOnly::allows(StaffRole::Lawyer));
    }
}
