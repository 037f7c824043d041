//! Multipart form handling and media storage for admin uploads.

use std::collections::HashMap;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Request bodies (form fields plus file) are capped at 16 MB.
pub const MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "mp4", "webm", "ogg"];

/// Subdirectory of the upload root, one per owning record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Products,
    Blog,
    Gallery,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Blog => "blog",
            Self::Gallery => "gallery",
        }
    }
}

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Lowercased extension if it is on the allow-list.
    pub fn allowed_extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
    }
}

/// A fully buffered `multipart/form-data` body.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // Browsers submit an empty part for an untouched file input.
                    if file_name.is_empty() || bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(name, UploadedFile { file_name, bytes });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text field that must be present and not blank.
    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        match self.text(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
            _ => Err(ApiError::BadRequest(format!("Missing required field '{}'", name))),
        }
    }

    /// Text field that becomes `None` when absent or empty.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.text(name).filter(|v| !v.is_empty()).map(str::to_string)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Write `file` under `<upload_dir>/<kind>/` with a fresh unique name and
/// return the media reference stored on the owning record.
pub async fn save_upload(
    upload_dir: &Path,
    kind: UploadKind,
    file: &UploadedFile,
) -> Result<String, ApiError> {
    let ext = file
        .allowed_extension()
        .ok_or_else(|| ApiError::BadRequest("Invalid file".into()))?;

    let dir = upload_dir.join(kind.as_str());
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {}", dir.display(), e);
        e
    })?;

    let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = dir.join(&stored_name);
    let mut out = tokio::fs::File::create(&path).await.map_err(|e| {
        error!("Failed to create file {}: {}", path.display(), e);
        e
    })?;
    out.write_all(&file.bytes).await?;
    out.flush().await?;

    info!(
        "Stored upload '{}' ({} bytes) as {}/{}",
        file.file_name,
        file.bytes.len(),
        kind.as_str(),
        stored_name
    );
    Ok(format!("/uploads/{}/{}", kind.as_str(), stored_name))
}

/// Pass `result` through, removing the freshly stored `media_ref` first when
/// the record that would have referenced it was never written.
pub async fn discard_upload_on_err<T>(
    upload_dir: &Path,
    media_ref: Option<&str>,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    if result.is_err() {
        if let Some(media_ref) = media_ref {
            let path = upload_dir.join(media_ref.trim_start_matches("/uploads/"));
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!("Removed orphaned upload {}", path.display()),
                Err(e) => warn!("Failed to remove orphaned upload {}: {}", path.display(), e),
            }
        }
    }
    result
}
