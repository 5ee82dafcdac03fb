// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "ASME Backend", description = "Sitio público y CRM interno de ASME y su despacho jurídico"),
    paths(
        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::request_otp,
        handlers::auth::verify_otp,
        handlers::auth::invite,
        handlers::auth::accept_invite,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::set_user_role,

        // --- Appointments ---
        handlers::appointments::create_appointment,
        handlers::appointments::list_appointments,
        handlers::appointments::get_appointment,
        handlers::appointments::approve_appointment,
        handlers::appointments::reject_appointment,
        handlers::appointments::delete_appointment,

        // --- Contact ---
        handlers::contact::send_contact,

        // --- Cases ---
        handlers::cases::list_cases,
        handlers::cases::get_case,
        handlers::cases::create_case,
        handlers::cases::update_case,
        handlers::cases::archive_case,
        handlers::cases::delete_case,
        handlers::cases::list_notes,
        handlers::cases::add_note,
        handlers::cases::delete_note,
        handlers::cases::list_documents,
        handlers::cases::add_document,
        handlers::cases::delete_document,
        handlers::cases::list_timeline,
        handlers::cases::add_timeline_entry,
        handlers::cases::delete_timeline_entry,

        // --- Hearings ---
        handlers::hearings::agenda,
        handlers::hearings::list_case_hearings,
        handlers::hearings::create_hearing,
        handlers::hearings::update_hearing,
        handlers::hearings::delete_hearing,

        // --- Blog ---
        handlers::blog::list_posts,
        handlers::blog::get_post,
        handlers::blog::admin_list_posts,
        handlers::blog::create_post,
        handlers::blog::update_post,
        handlers::blog::archive_post,
        handlers::blog::delete_post,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::archive_client,
        handlers::clients::delete_client,
        handlers::clients::client_history,

        // --- Campaigns ---
        handlers::campaigns::list_campaigns,
        handlers::campaigns::create_campaign,
        handlers::campaigns::get_campaign,
        handlers::campaigns::update_campaign,
        handlers::campaigns::delete_campaign,
        handlers::campaigns::list_targets,
        handlers::campaigns::send_campaign,

        // --- Content ---
        handlers::content::list_service_cards,
        handlers::content::create_service_card,
        handlers::content::delete_service_card,
        handlers::content::list_gallery,
        handlers::content::add_gallery_image,
        handlers::content::delete_gallery_image,

        // --- Storage ---
        handlers::storage::create_upload_url,
        handlers::storage::delete_object,

        // --- Documents ---
        handlers::documents::generate_pipc,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::StaffRole,
            models::auth::User,
            models::auth::UserProfile,
            models::auth::Invitation,
            models::auth::SignupPayload,
            models::auth::LoginPayload,
            models::auth::OtpRequestPayload,
            models::auth::OtpVerifyPayload,
            models::auth::InvitePayload,
            models::auth::AcceptInvitePayload,
            models::auth::SetRolePayload,
            models::auth::AuthResponse,

            // --- Appointments ---
            models::appointments::AppointmentStatus,
            models::appointments::Appointment,
            models::appointments::CreateAppointmentPayload,
            models::appointments::ApproveAppointmentPayload,
            models::appointments::RejectAppointmentPayload,
            models::contact::ContactPayload,

            // --- Cases ---
            models::cases::CaseType,
            models::cases::CaseStatus,
            models::cases::Case,
            models::cases::CaseNote,
            models::cases::CaseDocument,
            models::cases::TimelineEntry,
            models::cases::CaseDetail,
            models::cases::DocumentUpload,
            models::cases::CreateCasePayload,
            models::cases::UpdateCasePayload,
            models::cases::ArchivePayload,
            models::cases::CreateNotePayload,
            models::cases::AddDocumentPayload,
            models::cases::CreateTimelinePayload,

            // --- Hearings ---
            models::hearings::HearingStatus,
            models::hearings::Hearing,
            models::hearings::AgendaEntry,
            models::hearings::CreateHearingPayload,
            models::hearings::UpdateHearingPayload,

            // --- Blog ---
            models::blog::BlogKind,
            models::blog::MediaType,
            models::blog::BlogPost,
            models::blog::CreatePostPayload,
            models::blog::UpdatePostPayload,

            // --- CRM ---
            models::clients::ClientStatus,
            models::clients::Client,
            models::clients::ClientHistoryEvent,
            models::clients::CreateClientPayload,
            models::clients::UpdateClientPayload,
            models::campaigns::CampaignStatus,
            models::campaigns::TargetStatus,
            models::campaigns::Segment,
            models::campaigns::Campaign,
            models::campaigns::CampaignTarget,
            models::campaigns::CreateCampaignPayload,
            models::campaigns::UpdateCampaignPayload,
            models::campaigns::SendSummary,

            // --- Content / Storage ---
            models::content::ServiceCard,
            models::content::GalleryImage,
            models::content::CreateServiceCardPayload,
            models::content::CreateGalleryImagePayload,
            models::storage::UploadUrlRequest,
            models::storage::UploadUrlResponse,
            models::storage::DeleteObjectRequest,

            // --- Documents ---
            models::documents::EmergencyContact,
            models::documents::Brigade,
            models::documents::PipcForm,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, inicio de sesión, OTP e invitaciones"),
        (name = "Users", description = "Usuario actual y roles"),
        (name = "Appointments", description = "Solicitudes de cita y aprobación"),
        (name = "Contact", description = "Formulario de contacto del sitio"),
        (name = "Cases", description = "Expedientes jurídicos, notas, documentos y línea de tiempo"),
        (name = "Hearings", description = "Audiencias y agenda"),
        (name = "Blog", description = "Blogs de seguridad y jurídico"),
        (name = "Clients", description = "CRM: clientes e historial"),
        (name = "Campaigns", description = "CRM: campañas de correo"),
        (name = "Content", description = "Tarjetas de servicio y galerías del sitio"),
        (name = "Storage", description = "URLs prefirmadas del bucket"),
        (name = "Documents", description = "Generación del PIPC en PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_staff_and_public_routes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/appointments/{id}/approve"));
        assert!(doc.paths.paths.contains_key("/api/blog/{kind}/posts/{post}"));
        assert!(doc.paths.paths.contains_key("/api/documents/pipc"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
