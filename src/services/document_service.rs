// src/services/document_service.rs

use chrono::{Local, NaiveDate};
use genpdf::{elements, style, Element};

use crate::{common::error::AppError, models::documents::PipcForm};

const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
}

/// Filas de "Datos generales" del inmueble.
fn general_rows(form: &PipcForm) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Razón social", form.company_name.clone()),
        ("Domicilio", form.address.clone()),
        ("Responsable del inmueble", form.responsible_person.clone()),
        ("Giro o actividad", form.activity.clone()),
        ("Número de trabajadores", form.employees.to_string()),
        ("Niveles", form.floors.to_string()),
    ];
    if let Some(area) = form.built_area_m2 {
        rows.push(("Superficie construida", format!("{area:.2} m²")));
    }
    rows
}

fn issued_on(form: &PipcForm, today: NaiveDate) -> String {
    form.issued_on.unwrap_or(today).format("%d/%m/%Y").to_string()
}

fn pdf_err(e: genpdf::error::Error) -> AppError {
    AppError::PdfError(e.to_string())
}

fn render_pipc(fonts_dir: &str, form: &PipcForm, today: NaiveDate) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|e| AppError::PdfError(format!("Fuente no encontrada en {fonts_dir}: {e}")))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("PIPC - {}", form.company_name));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();
    let heading = style::Style::new().bold().with_font_size(13);

    // --- ENCABEZADO ---
    let mut title = elements::Paragraph::new("PROGRAMA INTERNO DE PROTECCIÓN CIVIL");
    title.set_alignment(genpdf::Alignment::Center);
    doc.push(title.styled(style::Style::new().bold().with_font_size(18)));

    let mut company = elements::Paragraph::new(form.company_name.clone());
    company.set_alignment(genpdf::Alignment::Center);
    doc.push(company.styled(style::Style::new().with_font_size(12)));

    doc.push(elements::Paragraph::new(format!("Fecha de emisión: {}", issued_on(form, today))));
    doc.push(elements::Break::new(1.5));

    // --- DATOS GENERALES ---
    doc.push(elements::Paragraph::new("1. Datos generales del inmueble").styled(heading));
    doc.push(elements::Break::new(0.5));

    let mut table = elements::TableLayout::new(vec![2, 3]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    for (label, value) in general_rows(form) {
        table
            .row()
            .element(elements::Paragraph::new(label).styled(bold))
            .element(elements::Paragraph::new(value))
            .push()
            .map_err(pdf_err)?;
    }
    doc.push(table);
    doc.push(elements::Break::new(1.5));

    // --- RIESGOS ---
    doc.push(elements::Paragraph::new("2. Análisis de riesgos").styled(heading));
    doc.push(elements::Break::new(0.5));
    if form.risks.is_empty() {
        doc.push(elements::Paragraph::new("Sin riesgos identificados."));
    } else {
        let mut list = elements::UnorderedList::new();
        for risk in &form.risks {
            list.push(elements::Paragraph::new(risk.clone()));
        }
        doc.push(list);
    }
    doc.push(elements::Break::new(1.5));

    // --- BRIGADAS ---
    doc.push(elements::Paragraph::new("3. Brigadas internas").styled(heading));
    doc.push(elements::Break::new(0.5));
    if form.brigades.is_empty() {
        doc.push(elements::Paragraph::new("Pendiente de integrar."));
    } else {
        let mut brigades = elements::TableLayout::new(vec![2, 2, 4]);
        brigades.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        brigades
            .row()
            .element(elements::Paragraph::new("Brigada").styled(bold))
            .element(elements::Paragraph::new("Jefe").styled(bold))
            .element(elements::Paragraph::new("Integrantes").styled(bold))
            .push()
            .map_err(pdf_err)?;
        for brigade in &form.brigades {
            brigades
                .row()
                .element(elements::Paragraph::new(brigade.name.clone()))
                .element(elements::Paragraph::new(brigade.leader.clone()))
                .element(elements::Paragraph::new(brigade.members.join(", ")))
                .push()
                .map_err(pdf_err)?;
        }
        doc.push(brigades);
    }
    doc.push(elements::Break::new(1.5));

    // --- DIRECTORIO ---
    doc.push(elements::Paragraph::new("4. Directorio de emergencia").styled(heading));
    doc.push(elements::Break::new(0.5));
    let mut contacts = elements::TableLayout::new(vec![3, 2]);
    contacts.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    contacts
        .row()
        .element(elements::Paragraph::new("Contacto").styled(bold))
        .element(elements::Paragraph::new("Teléfono").styled(bold))
        .push()
        .map_err(pdf_err)?;
    for contact in &form.emergency_contacts {
        contacts
            .row()
            .element(elements::Paragraph::new(contact.name.clone()))
            .element(elements::Paragraph::new(contact.phone.clone()))
            .push()
            .map_err(pdf_err)?;
    }
    doc.push(contacts);

    // --- FIRMA ---
    doc.push(elements::Break::new(4));
    let mut signature = elements::Paragraph::new("_______________________________");
    signature.set_alignment(genpdf::Alignment::Center);
    doc.push(signature);
    let mut signer = elements::Paragraph::new(form.responsible_person.clone());
    signer.set_alignment(genpdf::Alignment::Center);
    doc.push(signer.styled(style::Style::new().italic().with_font_size(9)));

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_err)?;
    Ok(buffer)
}

impl DocumentService {
    pub fn new(fonts_dir: String) -> Self {
        Self { fonts_dir }
    }

    /// Genera el PDF del PIPC. El render es síncrono y va en un hilo aparte.
    pub async fn pipc_pdf(&self, form: PipcForm) -> Result<Vec<u8>, AppError> {
        let fonts_dir = self.fonts_dir.clone();
        let today = Local::now().date_naive();

        let pdf = tokio::task::spawn_blocking(move || render_pipc(&fonts_dir, &form, today))
            .await
            .map_err(|e| anyhow::anyhow!("Falla en la tarea de render: {}", e))??;

        tracing::info!("📄 PIPC generado ({} bytes)", pdf.len());
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PipcForm {
        serde_json::from_value(serde_json::json!({
            "companyName": "Logística del Bajío",
            "address": "Av. Industrias 120, León, Gto.",
            "responsiblePerson": "Jorge Ramírez",
            "activity": "Almacenamiento",
            "employees": 42,
            "builtAreaM2": 1250.5,
            "risks": ["Incendio", "Sismo"]
        }))
        .unwrap()
    }

    #[test]
    fn general_rows_include_optional_area() {
        let rows = general_rows(&form());
        assert!(rows.contains(&("Número de trabajadores", "42".to_string())));
        assert!(rows.contains(&("Niveles", "1".to_string())));
        assert!(rows.contains(&("Superficie construida", "1250.50 m²".to_string())));
    }

    #[test]
    fn issue_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(issued_on(&form(), today), "09/06/2025");

        let mut dated = form();
        dated.issued_on = NaiveDate::from_ymd_opt(2025, 1, 2);
        assert_eq!(issued_on(&dated, today), "02/01/2025");
    }

    #[tokio::test]
    async fn missing_fonts_is_a_pdf_error() {
        let service = DocumentService::new("./no-existe".into());
        let result = service.pipc_pdf(form()).await;
        assert!(matches!(result, Err(AppError::PdfError(_))));
    }
}
