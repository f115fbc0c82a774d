use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::IntakeError;

/// Extraction payload exactly as the service returns it, before validation.
///
/// Field values may be any JSON type and confidence may be missing, a string,
/// or out of range; [`crate::normalize::normalize_extraction`] cleans all of
/// that up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExtraction {
    #[serde(default, alias = "data")]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub provider: Option<String>,
}

/// A captured (already cropped) product photo ready to send for extraction.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Human-readable identifier used in logs and failure reports, usually the
    /// file name.
    pub label: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl CapturedImage {
    #[must_use]
    pub fn new(label: impl Into<String>, bytes: Vec<u8>, content_type: &'static str) -> Self {
        Self {
            label: label.into(),
            bytes,
            content_type,
        }
    }

    /// Reads an image from disk, inferring the content type from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::ImageIo`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IntakeError::ImageIo {
                path: path.display().to_string(),
                source,
            })?;

        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Self::new(label, bytes, content_type_for(path)))
    }
}

/// MIME type for an image path, by extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
