//! File upload glue: validation, path derivation and the object storage seam.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    FailedUpload, FileMeta, FileValidation, MultiUploadResult, UploadContext, UploadedFile,
};

/// Maximum number of files accepted in one multi-file upload.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

const MAX_FILE_NAME_LEN: usize = 100;
const DEFAULT_IDENTIFIER: &str = "general";
const NONCE_LEN: usize = 8;

const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/avif",
    "image/gif",
];
const DOCUMENT_TYPES: &[&str] = &["application/pdf"];

/// Where uploaded bytes end up.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path` and return the object's public URL.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String, AppError>;

    /// Remove the object at `path`.
    async fn delete(&self, path: &str) -> Result<(), AppError>;
}

/// Stores objects on the local filesystem and serves them under `/media`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base: format!("{}/media", base_url.trim_end_matches('/')),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::BadRequest(format!("Invalid storage path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<String, AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(format!("{}/{}", self.public_base, path))
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File {} not found", path)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Limits applied to every upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// MIME types accepted for a context.
    pub fn allowed_types(&self, context: UploadContext) -> Vec<&'static str> {
        match context {
            UploadContext::Admin => IMAGE_TYPES.iter().chain(DOCUMENT_TYPES).copied().collect(),
            _ => IMAGE_TYPES.to_vec(),
        }
    }
}

/// Check a file's type and size before anything is stored.
pub fn validate_file(meta: &FileMeta, context: UploadContext, policy: &UploadPolicy) -> FileValidation {
    let content_type = meta.content_type.trim().to_ascii_lowercase();
    if !policy.allowed_types(context).contains(&content_type.as_str()) {
        return FileValidation::rejected(format!(
            "File type {} is not allowed for {} uploads",
            if content_type.is_empty() { "unknown" } else { content_type.as_str() },
            context.as_str()
        ));
    }
    if meta.size == 0 {
        return FileValidation::rejected("File is empty");
    }
    if meta.size > policy.max_bytes {
        return FileValidation::rejected(format!(
            "File is too large ({} bytes, maximum {} bytes)",
            meta.size, policy.max_bytes
        ));
    }
    FileValidation::ok()
}

/// Lowercase a name and reduce it to `[a-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers on Windows may send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    for c in base.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    let capped: String = trimmed.chars().take(MAX_FILE_NAME_LEN).collect();
    let capped = capped.trim_end_matches(|c| c == '-' || c == '.');
    if capped.is_empty() {
        "file".to_string()
    } else {
        capped.to_string()
    }
}

/// `{context}/{identifier}/{timestamp}-{nonce}-{sanitized name}`.
///
/// The nonce keeps same-named files stored in the same millisecond apart.
pub fn storage_path(
    context: UploadContext,
    identifier: Option<&str>,
    file_name: &str,
    timestamp_millis: i64,
    nonce: &str,
) -> String {
    let identifier = identifier
        .map(sanitize_file_name)
        .filter(|id| id != "file")
        .unwrap_or_else(|| DEFAULT_IDENTIFIER.to_string());
    format!(
        "{}/{}/{}-{}-{}",
        context.as_str(),
        identifier,
        timestamp_millis,
        nonce,
        sanitize_file_name(file_name)
    )
}

fn path_nonce() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(NONCE_LEN);
    id
}

/// Validate one file and forward it to storage.
pub async fn upload_file(
    storage: &dyn ObjectStorage,
    policy: &UploadPolicy,
    context: UploadContext,
    identifier: Option<&str>,
    meta: &FileMeta,
    bytes: &[u8],
) -> Result<UploadedFile, AppError> {
    let validation = validate_file(meta, context, policy);
    if let Some(error) = validation.error {
        return Err(AppError::field("file", error));
    }

    let path = storage_path(
        context,
        identifier,
        &meta.file_name,
        Utc::now().timestamp_millis(),
        &path_nonce(),
    );
    let url = storage.put(&path, bytes, &meta.content_type).await?;
    tracing::info!(path = %path, size = meta.size, "Stored upload");

    Ok(UploadedFile {
        url,
        path,
        file_name: meta.file_name.clone(),
        content_type: meta.content_type.clone(),
        size: meta.size,
    })
}

/// Upload every file independently; one failure never stops the rest.
pub async fn upload_files(
    storage: &dyn ObjectStorage,
    policy: &UploadPolicy,
    context: UploadContext,
    identifier: Option<&str>,
    files: &[(FileMeta, Vec<u8>)],
) -> MultiUploadResult {
    let mut result = MultiUploadResult::default();

    for (index, (meta, bytes)) in files.iter().enumerate() {
        if index >= MAX_FILES_PER_UPLOAD {
            result.failed.push(FailedUpload {
                file_name: meta.file_name.clone(),
                error: format!("At most {} files per upload", MAX_FILES_PER_UPLOAD),
            });
            continue;
        }
        match upload_file(storage, policy, context, identifier, meta, bytes).await {
            Ok(uploaded) => result.uploaded.push(uploaded),
            Err(err) => {
                let error = match &err {
                    AppError::Validation(errors) => errors.get("file").unwrap_or("Invalid file").to_string(),
                    other => other.message(),
                };
                tracing::warn!(file = %meta.file_name, %error, "Upload failed");
                result.failed.push(FailedUpload {
                    file_name: meta.file_name.clone(),
                    error,
                });
            }
        }
    }

    result
}
