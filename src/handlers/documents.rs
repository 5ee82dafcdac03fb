// src/handlers/documents.rs

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::documents::PipcForm,
};

/// Nombre de archivo seguro para Content-Disposition.
fn pdf_file_name(company: &str) -> String {
    let stem: String = company
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');

    if stem.is_empty() {
        "pipc.pdf".to_string()
    } else {
        format!("pipc_{stem}.pdf")
    }
}

// POST /api/documents/pipc
#[utoipa::path(
    post,
    path = "/api/documents/pipc",
    tag = "Documents",
    request_body = PipcForm,
    responses(
        (status = 200, description = "PDF del Programa Interno de Protección Civil", content_type = "application/pdf"),
        (status = 400, description = "Formulario incompleto"),
        (status = 500, description = "No fue posible generar el PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_pipc(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(form): Json<PipcForm>,
) -> Result<Response, AppError> {
    form.validate()?;

    let file_name = pdf_file_name(&form.company_name);
    let pdf_bytes = app_state.document_service.pipc_pdf(form).await?;

    tracing::info!("📄 PIPC generado por {} ({} bytes)", user.email, pdf_bytes.len());

    // El navegador descarga el archivo directamente
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_only_ascii_alphanumerics() {
        assert_eq!(
            pdf_file_name("Logística del Bajío S.A."),
            "pipc_log_stica_del_baj_o_s_a.pdf"
        );
        assert_eq!(pdf_file_name("  \"; "), "pipc.pdf");
    }
}
