// src/services/email.rs

use async_trait::async_trait;
use serde_json::json;

use crate::common::error::AppError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Envío de correo transaccional. En pruebas se sustituye por un mailer en memoria.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), AppError> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [message.to],
                "subject": message.subject,
                "html": message.html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmailError(format!("{status}: {body}")));
        }

        tracing::debug!("📧 Correo enviado a {}", message.to);
        Ok(())
    }
}

/// Escapa texto del usuario antes de interpolarlo en HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
//  PLANTILLAS
// =============================================================================

pub mod templates {
    use super::{escape_html, EmailMessage};
    use crate::models::{
        appointments::Appointment, auth::StaffRole, contact::ContactPayload,
    };

    fn layout(title: &str, body: &str) -> String {
        format!(
            r#"<div style="font-family:Arial,sans-serif;max-width:600px;margin:auto">
<h2 style="color:#0b3d91">{title}</h2>
{body}
<hr/><p style="font-size:12px;color:#888">ASME · Seguridad y Servicios Jurídicos</p>
</div>"#
        )
    }

    fn row(label: &str, value: &str) -> String {
        format!("<p><strong>{label}:</strong> {}</p>", escape_html(value))
    }

    pub fn booking_notice(to: &str, appointment: &Appointment) -> EmailMessage {
        let mut body = String::new();
        body.push_str(&row("Nombre", &appointment.full_name));
        body.push_str(&row("Correo", &appointment.email));
        body.push_str(&row("Teléfono", &appointment.phone));
        body.push_str(&row("Servicio", &appointment.service));
        body.push_str(&row("Participantes", &appointment.participants.to_string()));
        if let Some(date) = appointment.preferred_date {
            body.push_str(&row("Fecha preferida", &date.format("%d/%m/%Y").to_string()));
        }
        if let Some(time) = appointment.preferred_time {
            body.push_str(&row("Hora preferida", &time.format("%H:%M").to_string()));
        }
        if let Some(message) = &appointment.message {
            body.push_str(&row("Mensaje", message));
        }

        EmailMessage {
            to: to.to_string(),
            subject: format!("Nueva solicitud de cita: {}", appointment.service),
            html: layout("Nueva solicitud de cita", &body),
        }
    }

    pub fn appointment_approved(appointment: &Appointment) -> EmailMessage {
        let when = match (appointment.appointment_date, appointment.appointment_time) {
            (Some(date), Some(time)) => {
                format!("{} a las {}", date.format("%d/%m/%Y"), time.format("%H:%M"))
            }
            _ => "la fecha acordada".to_string(),
        };

        let mut body = format!(
            "<p>Hola {},</p><p>Tu cita para <strong>{}</strong> fue confirmada para el {}.</p>",
            escape_html(&appointment.full_name),
            escape_html(&appointment.service),
            when
        );
        if let Some(notes) = &appointment.admin_notes {
            body.push_str(&row("Notas", notes));
        }

        EmailMessage {
            to: appointment.email.clone(),
            subject: "Tu cita fue confirmada".to_string(),
            html: layout("Cita confirmada", &body),
        }
    }

    pub fn contact_message(to: &str, payload: &ContactPayload) -> EmailMessage {
        let mut body = String::new();
        body.push_str(&row("Nombre", &payload.name));
        body.push_str(&row("Correo", &payload.email));
        if let Some(phone) = &payload.phone {
            body.push_str(&row("Teléfono", phone));
        }
        body.push_str(&row("Mensaje", &payload.message));

        let subject = payload
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Mensaje desde el sitio");

        EmailMessage {
            to: to.to_string(),
            subject: format!("Contacto: {subject}"),
            html: layout("Nuevo mensaje de contacto", &body),
        }
    }

    pub fn otp_code(to: &str, code: &str) -> EmailMessage {
        let body = format!(
            "<p>Tu código de acceso es:</p><p style=\"font-size:28px;letter-spacing:6px\"><strong>{}</strong></p><p>Vence en 10 minutos.</p>",
            escape_html(code)
        );
        EmailMessage {
            to: to.to_string(),
            subject: "Tu código de acceso".to_string(),
            html: layout("Código de acceso", &body),
        }
    }

    pub fn invitation(to: &str, role: StaffRole, link: &str) -> EmailMessage {
        let role_name = match role {
            StaffRole::Admin => "administrador",
            StaffRole::Lawyer => "abogado",
            StaffRole::Assistant => "asistente",
            StaffRole::Viewer => "consulta",
        };
        let body = format!(
            "<p>Fuiste invitado al panel de ASME con el rol <strong>{role_name}</strong>.</p><p><a href=\"{}\">Aceptar invitación</a></p><p>El enlace vence en 7 días.</p>",
            escape_html(link)
        );
        EmailMessage {
            to: to.to_string(),
            subject: "Invitación al panel de ASME".to_string(),
            html: layout("Invitación", &body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointments::{Appointment, AppointmentStatus};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            full_name: "Ana <script>".into(),
            email: "ana@empresa.mx".into(),
            phone: "5511112222".into(),
            service: "Curso de brigadas".into(),
            participants: 8,
            message: Some("Somos \"20\" & más".into()),
            preferred_date: NaiveDate::from_ymd_opt(2025, 3, 14),
            preferred_time: NaiveTime::from_hms_opt(10, 30, 0),
            status: AppointmentStatus::Pending,
            appointment_date: None,
            appointment_time: None,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn booking_notice_escapes_user_input() {
        let msg = templates::booking_notice("contacto@asme.mx", &appointment());
        assert_eq!(msg.to, "contacto@asme.mx");
        assert!(msg.html.contains("Ana &lt;script&gt;"));
        assert!(msg.html.contains("&quot;20&quot; &amp; más"));
        assert!(msg.html.contains("14/03/2025"));
        assert!(!msg.html.contains("<script>"));
    }

    #[test]
    fn approval_goes_to_the_customer() {
        let mut appt = appointment();
        appt.appointment_date = NaiveDate::from_ymd_opt(2025, 4, 2);
        appt.appointment_time = NaiveTime::from_hms_opt(9, 0, 0);
        let msg = templates::appointment_approved(&appt);
        assert_eq!(msg.to, "ana@empresa.mx");
        assert!(msg.html.contains("02/04/2025 a las 09:00"));
    }
}
