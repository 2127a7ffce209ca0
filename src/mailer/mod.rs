//! Outgoing lead email.
//!
//! No delivery provider is wired up yet; messages are composed and logged.

use serde::Serialize;

use crate::config::Config;
use crate::models::{Lead, LeadType};

/// A composed email.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    admin_email: String,
    from_email: String,
    reply_to_email: String,
    base_url: String,
    calendly_url: Option<String>,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        Self {
            admin_email: config.admin_email.clone(),
            from_email: config.from_email.clone(),
            reply_to_email: config.reply_to_email.clone(),
            base_url: config.base_url.clone(),
            calendly_url: config.calendly_url.clone(),
        }
    }

    /// Tell the shop a new lead arrived.
    pub fn admin_notification(&self, lead: &Lead) -> EmailMessage {
        let kind = match lead.lead_type() {
            LeadType::Contact => "contact message",
            LeadType::Enquiry => "product enquiry",
            LeadType::Customize => "custom rug request",
            LeadType::Trade => "trade application",
        };
        let mut body = format!(
            "New {} from {} <{}>\n",
            kind, lead.name, lead.email
        );
        if let Some(phone) = &lead.phone {
            body.push_str(&format!("Phone: {}\n", phone));
        }
        if !lead.message.is_empty() {
            body.push_str(&format!("\n{}\n", lead.message));
        }
        body.push_str(&format!("\n{}/admin/leads/{}\n", self.base_url, lead.id));

        EmailMessage {
            to: self.admin_email.clone(),
            from: self.from_email.clone(),
            reply_to: lead.email.clone(),
            subject: format!("New {}: {}", kind, lead.name),
            body,
        }
    }

    /// Thank the customer for getting in touch.
    pub fn customer_acknowledgement(&self, lead: &Lead) -> EmailMessage {
        let mut body = format!(
            "Hi {},\n\nThank you for getting in touch. Our team will reply within two working days.\n",
            lead.name
        );
        // Custom rug requests get the consultation booking link.
        if let (LeadType::Customize, Some(url)) = (lead.lead_type(), &self.calendly_url) {
            body.push_str(&format!("\nBook a design consultation: {}\n", url));
        }

        EmailMessage {
            to: lead.email.clone(),
            from: self.from_email.clone(),
            reply_to: self.reply_to_email.clone(),
            subject: "Thank you for reaching out".to_string(),
            body,
        }
    }

    pub async fn send(&self, message: &EmailMessage) {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery not configured, logging message instead"
        );
        tracing::debug!(body = %message.body, "Email body");
    }

    /// Send both lead emails.
    pub async fn notify_new_lead(&self, lead: &Lead) {
        self.send(&self.admin_notification(lead)).await;
        self.send(&self.customer_acknowledgement(lead)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DimensionUnit, LeadDetails, LeadStatus};

    fn config() -> Config {
        Config {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            db_path: "unused.sqlite".into(),
            upload_dir: "unused".into(),
            base_url: "https://rugs.example".to_string(),
            max_upload_bytes: 1024,
            admin_sessions: vec![],
            admin_email: "owner@rugs.example".to_string(),
            from_email: "noreply@rugs.example".to_string(),
            reply_to_email: "hello@rugs.example".to_string(),
            calendly_url: None,
            log_level: "warn".to_string(),
        }
    }

    #[test]
    fn test_admin_notification_replies_to_customer() {
        let lead = Lead {
            id: "lead-1".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("+91 98765 43210".to_string()),
            message: "Do you ship to Pune?".to_string(),
            status: LeadStatus::New,
            assigned_to: None,
            notes: vec![],
            source: "contact-page".to_string(),
            details: LeadDetails::Contact { subject: None },
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let mailer = Mailer::new(&config());

        let message = mailer.admin_notification(&lead);
        assert_eq!(message.to, "owner@rugs.example");
        assert_eq!(message.reply_to, "asha@example.com");
        assert!(message.subject.contains("contact message"));
        assert!(message.body.contains("https://rugs.example/admin/leads/lead-1"));

        let ack = mailer.customer_acknowledgement(&lead);
        assert_eq!(ack.to, "asha@example.com");
        assert_eq!(ack.reply_to, "hello@rugs.example");
        assert!(!ack.body.contains("consultation"));
    }

    #[test]
    fn test_customize_acknowledgement_includes_booking_link() {
        let mut config = config();
        config.calendly_url = Some("https://calendly.com/rugs/consult".to_string());
        let lead = Lead {
            id: "lead-2".to_string(),
            name: "Noor".to_string(),
            email: "noor@example.com".to_string(),
            phone: None,
            message: String::new(),
            status: LeadStatus::New,
            assigned_to: None,
            notes: vec![],
            source: "customize-page".to_string(),
            details: LeadDetails::Customize {
                width: Some(8.0),
                length: Some(10.0),
                unit: DimensionUnit::Ft,
                preferred_colors: vec![],
                preferred_materials: vec![],
                budget_range: None,
                timeline: None,
                moodboard_urls: vec![],
            },
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let ack = Mailer::new(&config).customer_acknowledgement(&lead);
        assert!(ack.body.contains("https://calendly.com/rugs/consult"));
    }
}
