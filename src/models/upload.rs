//! Upload request/response models.

use serde::{Deserialize, Serialize};

/// What an uploaded file belongs to. Determines its path prefix and allowed types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadContext {
    Product,
    Collection,
    Moodboard,
    Admin,
    Temp,
}

impl UploadContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadContext::Product => "product",
            UploadContext::Collection => "collection",
            UploadContext::Moodboard => "moodboard",
            UploadContext::Admin => "admin",
            UploadContext::Temp => "temp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(UploadContext::Product),
            "collection" => Some(UploadContext::Collection),
            "moodboard" => Some(UploadContext::Moodboard),
            "admin" => Some(UploadContext::Admin),
            "temp" => Some(UploadContext::Temp),
            _ => None,
        }
    }
}

/// What the server knows about a file before storing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Outcome of checking a file against the upload policy.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// A stored file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// Per-file outcomes of a multi-file upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MultiUploadResult {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedUpload>,
}

/// Request body for deleting a stored file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub path: String,
}
