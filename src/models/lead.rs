//! Lead model: one captured customer interaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which form produced a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    Contact,
    Enquiry,
    Customize,
    Trade,
}

impl LeadType {
    pub const ALL: [LeadType; 4] = [
        LeadType::Contact,
        LeadType::Enquiry,
        LeadType::Customize,
        LeadType::Trade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadType::Contact => "contact",
            LeadType::Enquiry => "enquiry",
            LeadType::Customize => "customize",
            LeadType::Trade => "trade",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Where a lead sits in the sales pipeline. Only admins move it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Reviewing,
    Contacted,
    Quoted,
    Converted,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Reviewing,
        LeadStatus::Contacted,
        LeadStatus::Quoted,
        LeadStatus::Converted,
        LeadStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Reviewing => "reviewing",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Quoted => "quoted",
            LeadStatus::Converted => "converted",
            LeadStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Kind of business a trade applicant runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessType {
    InteriorDesigner,
    Architect,
    Retailer,
    Hospitality,
    Other,
}

impl BusinessType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interior-designer" => Some(BusinessType::InteriorDesigner),
            "architect" => Some(BusinessType::Architect),
            "retailer" => Some(BusinessType::Retailer),
            "hospitality" => Some(BusinessType::Hospitality),
            "other" => Some(BusinessType::Other),
            _ => None,
        }
    }
}

/// Measurement unit for custom rug dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    #[default]
    Ft,
    M,
}

/// Type-specific fields. The variant tag doubles as the lead's `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LeadDetails {
    #[serde(rename_all = "camelCase")]
    Contact {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Enquiry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preferred_size: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Customize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<f64>,
        #[serde(default)]
        unit: DimensionUnit,
        #[serde(default)]
        preferred_colors: Vec<String>,
        #[serde(default)]
        preferred_materials: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        budget_range: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeline: Option<String>,
        #[serde(default)]
        moodboard_urls: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Trade {
        company_name: String,
        business_type: BusinessType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        website: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_volume: Option<String>,
    },
}

impl LeadDetails {
    pub fn lead_type(&self) -> LeadType {
        match self {
            LeadDetails::Contact { .. } => LeadType::Contact,
            LeadDetails::Enquiry { .. } => LeadType::Enquiry,
            LeadDetails::Customize { .. } => LeadType::Customize,
            LeadDetails::Trade { .. } => LeadType::Trade,
        }
    }
}

/// An admin note attached to a lead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadNote {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

/// A captured customer contact, enquiry, customize or trade submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub status: LeadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Vec<LeadNote>,
    pub source: String,
    #[serde(flatten)]
    pub details: LeadDetails,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead {
    pub fn lead_type(&self) -> LeadType {
        self.details.lead_type()
    }
}

/// Validated lead ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub source: String,
    pub details: LeadDetails,
}

/// Request body for the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for a product enquiry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub preferred_size: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for a custom rug request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub preferred_colors: Vec<String>,
    #[serde(default)]
    pub preferred_materials: Vec<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub moodboard_urls: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for a trade programme application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub project_volume: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for patching a lead from the admin screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Validated lead patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<String>,
    pub source: Option<String>,
}

/// Request body for changing a lead's status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusRequest {
    pub status: String,
}

/// Request body for adding an admin note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLeadNoteRequest {
    #[serde(default)]
    pub content: String,
}

/// Request body for assigning a lead; `null` clears the assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadRequest {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Request body for moving many leads to one status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeadStatusRequest {
    pub ids: Vec<String>,
    pub status: String,
}

/// Query parameters for listing leads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadQuery {
    #[serde(default, rename = "type")]
    pub lead_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Lead counts for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
}
