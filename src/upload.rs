//! The file a user picked, and the client-side PDF check.
//!
//! Validation only looks at the *declared* content type, the same signal a
//! browser file picker exposes. Files from disk get their declared type from
//! the extension.

use crate::error::ForgeError;
use bytes::Bytes;
use std::path::Path;
use tracing::debug;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// An in-memory file waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    /// Declared MIME type, e.g. `application/pdf`.
    pub content_type: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ForgeError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ForgeError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ForgeError::Internal(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(file_name, declared_type_for(path), bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size label shown next to a selected file, e.g. `12.50 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size() as f64 / 1024.0)
    }

    pub fn is_pdf(&self) -> bool {
        is_pdf_content_type(&self.content_type)
    }
}

/// Content type a file picker would declare for this path.
pub fn declared_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// `application/pdf`, ignoring case and parameters such as `; charset=...`.
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}

/// Reject anything that does not declare itself as a PDF.
pub fn validate_pdf(upload: &Upload) -> Result<(), ForgeError> {
    if upload.is_pdf() {
        Ok(())
    } else {
        Err(ForgeError::NotAPdf {
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
        })
    }
}
