//! Validation for the public lead forms and admin lead edits.

use super::{clean_list, clean_opt, Validator};
use crate::errors::AppError;
use crate::models::{
    BusinessType, ContactForm, CustomizeForm, DimensionUnit, EnquiryForm, LeadChanges,
    LeadDetails, LeadStatus, NewLead, TradeForm, UpdateLeadRequest,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 2000;
const NOTE_MAX: usize = 2000;
const SHORT_MAX: usize = 200;
const MAX_MOODBOARD_URLS: usize = 10;
const DIMENSION_MIN: f64 = 0.5;
const DIMENSION_MAX: f64 = 50.0;

fn source_or_default(source: Option<String>, default: &str) -> String {
    clean_opt(source).unwrap_or_else(|| default.to_string())
}

fn check_identity(v: &mut Validator, name: &str, email: &str, phone: Option<&str>) {
    v.text("name", name, "Name", NAME_MIN, NAME_MAX)
        .email("email", email)
        .phone("phone", phone);
}

pub fn validate_contact(form: ContactForm) -> Result<NewLead, AppError> {
    let mut v = Validator::new();
    check_identity(&mut v, &form.name, &form.email, form.phone.as_deref());
    v.max_len("subject", form.subject.as_deref(), "Subject", SHORT_MAX)
        .text("message", &form.message, "Message", MESSAGE_MIN, MESSAGE_MAX);
    v.finish()?;

    Ok(NewLead {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        phone: clean_opt(form.phone),
        message: form.message.trim().to_string(),
        source: source_or_default(form.source, "contact-page"),
        details: LeadDetails::Contact {
            subject: clean_opt(form.subject),
        },
    })
}

pub fn validate_enquiry(form: EnquiryForm) -> Result<NewLead, AppError> {
    let mut v = Validator::new();
    check_identity(&mut v, &form.name, &form.email, form.phone.as_deref());
    v.max_len("message", form.message.as_deref(), "Message", MESSAGE_MAX)
        .max_len("productName", form.product_name.as_deref(), "Product name", SHORT_MAX)
        .max_len("preferredSize", form.preferred_size.as_deref(), "Preferred size", SHORT_MAX)
        .check(
            "productId",
            form.product_id.as_deref().map_or(true, |id| id.len() <= SHORT_MAX),
            "Invalid product reference",
        );
    v.finish()?;

    Ok(NewLead {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        phone: clean_opt(form.phone),
        message: clean_opt(form.message).unwrap_or_default(),
        source: source_or_default(form.source, "product-page"),
        details: LeadDetails::Enquiry {
            product_id: clean_opt(form.product_id),
            product_name: clean_opt(form.product_name),
            preferred_size: clean_opt(form.preferred_size),
        },
    })
}

pub fn validate_customize(form: CustomizeForm) -> Result<NewLead, AppError> {
    let mut v = Validator::new();
    check_identity(&mut v, &form.name, &form.email, form.phone.as_deref());
    if let Some(width) = form.width {
        v.range("width", width, "Width", DIMENSION_MIN, DIMENSION_MAX);
    }
    if let Some(length) = form.length {
        v.range("length", length, "Length", DIMENSION_MIN, DIMENSION_MAX);
    }
    let unit = match form.unit.as_deref().map(str::trim) {
        None | Some("") | Some("ft") => Some(DimensionUnit::Ft),
        Some("m") => Some(DimensionUnit::M),
        Some(_) => None,
    };
    v.check("unit", unit.is_some(), "Unit must be ft or m")
        .max_len("budgetRange", form.budget_range.as_deref(), "Budget range", SHORT_MAX)
        .max_len("timeline", form.timeline.as_deref(), "Timeline", SHORT_MAX)
        .max_len("message", form.message.as_deref(), "Message", MESSAGE_MAX)
        .check(
            "moodboardUrls",
            form.moodboard_urls.len() <= MAX_MOODBOARD_URLS,
            format!("At most {} moodboard images", MAX_MOODBOARD_URLS),
        );
    for url in &form.moodboard_urls {
        v.url("moodboardUrls", Some(url.as_str()));
    }
    v.finish()?;

    Ok(NewLead {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        phone: clean_opt(form.phone),
        message: clean_opt(form.message).unwrap_or_default(),
        source: source_or_default(form.source, "customize-page"),
        details: LeadDetails::Customize {
            width: form.width,
            length: form.length,
            unit: unit.unwrap_or_default(),
            preferred_colors: clean_list(form.preferred_colors),
            preferred_materials: clean_list(form.preferred_materials),
            budget_range: clean_opt(form.budget_range),
            timeline: clean_opt(form.timeline),
            moodboard_urls: clean_list(form.moodboard_urls),
        },
    })
}

pub fn validate_trade(form: TradeForm) -> Result<NewLead, AppError> {
    let mut v = Validator::new();
    let business_type = BusinessType::parse(form.business_type.trim());
    v.text("name", &form.name, "Name", NAME_MIN, NAME_MAX)
        .email("email", &form.email)
        .required("phone", &form.phone, "Phone")
        .phone("phone", Some(form.phone.as_str()))
        .text("companyName", &form.company_name, "Company name", NAME_MIN, SHORT_MAX)
        .check(
            "businessType",
            business_type.is_some(),
            "Please choose a business type",
        )
        .url("website", form.website.as_deref())
        .max_len("projectVolume", form.project_volume.as_deref(), "Project volume", SHORT_MAX)
        .max_len("message", form.message.as_deref(), "Message", MESSAGE_MAX);
    v.finish()?;

    let business_type = business_type
        .ok_or_else(|| AppError::field("businessType", "Please choose a business type"))?;

    Ok(NewLead {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        phone: clean_opt(Some(form.phone)),
        message: clean_opt(form.message).unwrap_or_default(),
        source: source_or_default(form.source, "trade-page"),
        details: LeadDetails::Trade {
            company_name: form.company_name.trim().to_string(),
            business_type,
            website: clean_opt(form.website),
            project_volume: clean_opt(form.project_volume),
        },
    })
}

/// Parse a status string, reporting failures against `field`.
pub fn parse_lead_status(field: &str, status: &str) -> Result<LeadStatus, AppError> {
    LeadStatus::parse(status.trim()).ok_or_else(|| {
        AppError::field(
            field,
            format!("Unknown status '{}'", status.trim()),
        )
    })
}

pub fn validate_lead_changes(request: UpdateLeadRequest) -> Result<LeadChanges, AppError> {
    let mut v = Validator::new();
    if let Some(name) = &request.name {
        v.text("name", name, "Name", NAME_MIN, NAME_MAX);
    }
    if let Some(email) = &request.email {
        v.email("email", email);
    }
    v.phone("phone", request.phone.as_deref())
        .max_len("message", request.message.as_deref(), "Message", MESSAGE_MAX)
        .max_len("assignedTo", request.assigned_to.as_deref(), "Assignee", NAME_MAX)
        .max_len("source", request.source.as_deref(), "Source", NAME_MAX);
    let status = request.status.as_deref().map(LeadStatus::parse);
    v.check(
        "status",
        !matches!(status, Some(None)),
        "Unknown status",
    );
    v.finish()?;

    Ok(LeadChanges {
        name: request.name.map(|n| n.trim().to_string()),
        email: request.email.map(|e| e.trim().to_lowercase()),
        phone: clean_opt(request.phone),
        message: request.message.map(|m| m.trim().to_string()),
        status: status.flatten(),
        assigned_to: clean_opt(request.assigned_to),
        source: clean_opt(request.source),
    })
}

pub fn validate_note(content: &str) -> Result<String, AppError> {
    let mut v = Validator::new();
    v.text("content", content, "Note", 1, NOTE_MAX);
    v.finish()?;
    Ok(content.trim().to_string())
}
