// src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;
use crate::services::media_migration::MediaMigration;

#[derive(Debug, Parser)]
#[command(name = "asme-backend", version, about = "Backend del sitio y CRM de ASME")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Levanta el servidor HTTP (por defecto)
    Serve,
    /// Copia los medios del almacenamiento anterior al bucket actual y reescribe las URLs
    MigrateMedia {
        /// URL pública base del almacenamiento anterior
        #[arg(long)]
        from: String,
        /// Sólo reporta, no copia ni actualiza filas
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::MigrateMedia { from, dry_run } => migrate_media(settings, from, dry_run).await,
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let bind_addr = settings.bind_addr.clone();
    let app_state = AppState::new(settings).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falla al ejecutar las migraciones de la base de datos")?;
    tracing::info!("✅ Migraciones de la base de datos ejecutadas");

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("No fue posible escuchar en {bind_addr}"))?;
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app(app_state))
        .await
        .context("Error en el servidor Axum")?;
    Ok(())
}

async fn migrate_media(settings: Settings, from: String, dry_run: bool) -> anyhow::Result<()> {
    let pool = settings.connect().await?;
    let storage = settings.storage_client()?;

    if dry_run {
        tracing::info!("Modo simulación: no se copiará ni actualizará nada");
    }

    let report = MediaMigration::new(pool, storage, from, dry_run).run().await?;

    if report.failed > 0 {
        tracing::warn!("Quedaron {} archivos sin migrar; revise el log y vuelva a ejecutar", report.failed);
    }
    Ok(())
}

/// Router completo de la API. Las rutas del panel pasan por `auth_guard`.
pub fn app(app_state: AppState) -> Router {
    // Sitio público: sin token
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/otp", post(handlers::auth::request_otp))
        .route("/auth/otp/verify", post(handlers::auth::verify_otp))
        .route("/auth/invite/accept", post(handlers::auth::accept_invite))
        .route("/appointments", post(handlers::appointments::create_appointment))
        .route("/contact", post(handlers::contact::send_contact))
        .route("/blog/{kind}/posts", get(handlers::blog::list_posts))
        .route("/blog/{kind}/posts/{post}", get(handlers::blog::get_post))
        .route("/content/services", get(handlers::content::list_service_cards))
        .route("/content/galleries/{gallery}", get(handlers::content::list_gallery));

    // Panel interno: JWT obligatorio, el rol se revisa en cada handler
    let staff_routes = Router::new()
        .route("/auth/invite", post(handlers::auth::invite))
        .route("/users/me", get(handlers::auth::get_me))
        .route("/users/{id}/role", put(handlers::auth::set_user_role))
        // --- Citas ---
        .route("/appointments", get(handlers::appointments::list_appointments))
        .route(
            "/appointments/{id}",
            get(handlers::appointments::get_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route("/appointments/{id}/approve", post(handlers::appointments::approve_appointment))
        .route("/appointments/{id}/reject", post(handlers::appointments::reject_appointment))
        // --- Casos ---
        .route(
            "/cases",
            get(handlers::cases::list_cases).post(handlers::cases::create_case),
        )
        .route(
            "/cases/{id}",
            get(handlers::cases::get_case)
                .put(handlers::cases::update_case)
                .delete(handlers::cases::delete_case),
        )
        .route("/cases/{id}/archive", post(handlers::cases::archive_case))
        .route(
            "/cases/{id}/notes",
            get(handlers::cases::list_notes).post(handlers::cases::add_note),
        )
        .route("/cases/{id}/notes/{note_id}", delete(handlers::cases::delete_note))
        .route(
            "/cases/{id}/documents",
            get(handlers::cases::list_documents).post(handlers::cases::add_document),
        )
        .route("/cases/{id}/documents/{document_id}", delete(handlers::cases::delete_document))
        .route(
            "/cases/{id}/timeline",
            get(handlers::cases::list_timeline).post(handlers::cases::add_timeline_entry),
        )
        .route("/cases/{id}/timeline/{entry_id}", delete(handlers::cases::delete_timeline_entry))
        // --- Audiencias ---
        .route(
            "/cases/{id}/hearings",
            get(handlers::hearings::list_case_hearings).post(handlers::hearings::create_hearing),
        )
        .route("/hearings", get(handlers::hearings::agenda))
        .route(
            "/hearings/{id}",
            put(handlers::hearings::update_hearing).delete(handlers::hearings::delete_hearing),
        )
        // --- Blog ---
        .route("/blog/{kind}/admin/posts", get(handlers::blog::admin_list_posts))
        .route("/blog/{kind}/posts", post(handlers::blog::create_post))
        .route(
            "/blog/{kind}/posts/{post}",
            put(handlers::blog::update_post).delete(handlers::blog::delete_post),
        )
        .route("/blog/{kind}/posts/{post}/archive", post(handlers::blog::archive_post))
        // --- CRM ---
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/clients/{id}/archive", post(handlers::clients::archive_client))
        .route("/clients/{id}/history", get(handlers::clients::client_history))
        .route(
            "/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route(
            "/campaigns/{id}",
            get(handlers::campaigns::get_campaign)
                .put(handlers::campaigns::update_campaign)
                .delete(handlers::campaigns::delete_campaign),
        )
        .route("/campaigns/{id}/targets", get(handlers::campaigns::list_targets))
        .route("/campaigns/{id}/send", post(handlers::campaigns::send_campaign))
        // --- Contenido y archivos ---
        .route("/content/services", post(handlers::content::create_service_card))
        .route("/content/services/{id}", delete(handlers::content::delete_service_card))
        .route("/content/galleries/{gallery}", post(handlers::content::add_gallery_image))
        .route(
            "/content/galleries/{gallery}/{id}",
            delete(handlers::content::delete_gallery_image),
        )
        .route("/storage/upload-url", post(handlers::storage::create_upload_url))
        .route("/storage/objects", delete(handlers::storage::delete_object))
        .route("/documents/pipc", post(handlers::documents::generate_pipc))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public_routes.merge(staff_routes))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support;
    use crate::models::{
        appointments::AppointmentStatus,
        auth::{StaffRole, User},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chrono::Utc;
    use sqlx::PgPool;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn json_request(method: Method, uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    fn staff_token(state: &AppState) -> String {
        let user = User {
            id: Uuid::new_v4(),
            email: "recepcion@asme.mx".into(),
            password_hash: None,
            full_name: Some("Recepción".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.auth_service.create_token(&user).unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = app(test_support::state())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn staff_routes_require_a_token() {
        let response = app(test_support::state())
            .oneshot(Request::get("/api/cases").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_appointments_is_staff_only_but_booking_is_public() {
        let state = test_support::state();

        let list = app(state.clone())
            .oneshot(Request::get("/api/appointments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::UNAUTHORIZED);

        // Sin token llega al handler: el correo inválido se rechaza antes de tocar la base
        let booking = app(state)
            .oneshot(json_request(
                Method::POST,
                "/api/appointments",
                r#"{"fullName":"Ana","email":"no-es-correo","phone":"4771234567","service":"Consultoría"}"#,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(booking.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tampered_token_is_unauthorized() {
        let state = test_support::state();
        let token = format!("{}x", staff_token(&state));

        let response = app(state)
            .oneshot(json_request(Method::POST, "/api/documents/pipc", "{}", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn incomplete_pipc_form_is_a_validation_error() {
        let state = test_support::state();
        let token = staff_token(&state);

        let response = app(state)
            .oneshot(json_request(
                Method::POST,
                "/api/documents/pipc",
                r#"{"companyName":"","address":"Blvd. López Mateos 100","responsiblePerson":"Jorge","activity":"Oficinas","employees":12}"#,
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["details"]["company_name"].is_array());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app(test_support::state())
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const CASE_WITH_DOCUMENT: &str = r#"{
        "caseNumber":"123/2026","clientName":"Laura Torres","caseType":"civil",
        "document":{"fileName":"demanda.pdf","fileUrl":"https://archivo.externo.mx/demanda.pdf"}
    }"#;

    const HEARING_WITH_AUTO: &str = r#"{
        "hearingDate":"2026-11-20","hearingTime":"09:00","hearingType":"Audiencia inicial",
        "autoDocument":{"fileName":"auto.pdf","fileUrl":"https://archivo.externo.mx/auto.pdf"}
    }"#;

    #[sqlx::test(migrations = "./migrations")]
    async fn approving_a_taken_slot_is_a_conflict(pool: PgPool) {
        let state = test_support::state_with_pool(pool);
        let (_, admin) = test_support::staff_user(&state, "admin@asme.mx", StaffRole::Admin).await;

        let mut ids = Vec::new();
        for name in ["Ana", "Beto"] {
            let response = app(state.clone())
                .oneshot(json_request(
                    Method::POST,
                    "/api/appointments",
                    &format!(r#"{{"fullName":"{name}","email":"{name}@correo.mx","phone":"4771234567","service":"Consultoría"}}"#),
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            ids.push(json_body(response).await["id"].as_str().unwrap().to_string());
        }

        let slot = r#"{"date":"2026-11-03","time":"10:30"}"#;
        let first = app(state.clone())
            .oneshot(json_request(Method::POST, &format!("/api/appointments/{}/approve", ids[0]), slot, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app(state.clone())
            .oneshot(json_request(Method::POST, &format!("/api/appointments/{}/approve", ids[1]), slot, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        // La segunda sigue pendiente
        let pending = state.appointment_service.get(ids[1].parse().unwrap()).await.unwrap();
        assert_eq!(pending.status, AppointmentStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn viewers_cannot_create_cases_or_hearings(pool: PgPool) {
        let state = test_support::state_with_pool(pool);
        let (_, viewer) = test_support::staff_user(&state, "lectura@asme.mx", StaffRole::Viewer).await;
        let (_, lawyer) = test_support::staff_user(&state, "abogada@asme.mx", StaffRole::Lawyer).await;

        let denied = app(state.clone())
            .oneshot(json_request(Method::POST, "/api/cases", CASE_WITH_DOCUMENT, Some(&viewer)))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let created = app(state.clone())
            .oneshot(json_request(Method::POST, "/api/cases", CASE_WITH_DOCUMENT, Some(&lawyer)))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let case_id = json_body(created).await["id"].as_str().unwrap().to_string();

        let denied = app(state.clone())
            .oneshot(json_request(
                Method::POST,
                &format!("/api/cases/{case_id}/hearings"),
                HEARING_WITH_AUTO,
                Some(&viewer),
            ))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let hearings = state.hearing_service.list_for_case(case_id.parse().unwrap()).await.unwrap();
        assert!(hearings.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn cases_and_hearings_need_their_document(pool: PgPool) {
        let state = test_support::state_with_pool(pool);
        let (_, lawyer) = test_support::staff_user(&state, "abogado@asme.mx", StaffRole::Lawyer).await;

        let response = app(state.clone())
            .oneshot(json_request(
                Method::POST,
                "/api/cases",
                r#"{"caseNumber":"77/2026","clientName":"Mario Ruiz","caseType":"penal"}"#,
                Some(&lawyer),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["details"]["document"].is_array());

        let cases = state.case_service.list(&Default::default()).await.unwrap();
        assert!(cases.is_empty());

        let created = app(state.clone())
            .oneshot(json_request(Method::POST, "/api/cases", CASE_WITH_DOCUMENT, Some(&lawyer)))
            .await
            .unwrap();
        let case_id = json_body(created).await["id"].as_str().unwrap().to_string();

        let response = app(state.clone())
            .oneshot(json_request(
                Method::POST,
                &format!("/api/cases/{case_id}/hearings"),
                r#"{"hearingDate":"2026-11-20","hearingTime":"09:00","hearingType":"Audiencia inicial"}"#,
                Some(&lawyer),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["details"]["auto_document"].is_array());
    }

    #[test]
    fn cli_defaults_to_serve_and_parses_migrate_media() {
        let cli = Cli::try_parse_from(["asme-backend"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "asme-backend",
            "migrate-media",
            "--from",
            "https://old.supabase.co/storage/v1/object/public/media",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Some(Command::MigrateMedia { from, dry_run }) => {
                assert!(from.starts_with("https://old."));
                assert!(dry_run);
            }
            other => panic!("comando inesperado: {other:?}"),
        }
    }
}
