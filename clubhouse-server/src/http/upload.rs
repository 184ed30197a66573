//! Multipart form handling and image uploads
//!
//! Uploaded files land in a fixed directory under a sanitized name; the row
//! stores only that name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};

use crate::models::FormFields;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("filename '{0}' has no usable characters")]
    InvalidFilename(String),

    #[error("failed to save {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A file part with a non-empty filename
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields and files of a multipart submission
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Drain a multipart body.
    ///
    /// A file input submitted without choosing a file arrives with an empty
    /// filename; it is treated as absent.
    pub async fn read(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(filename) => {
                    let bytes = field.bytes().await?;
                    if !filename.is_empty() {
                        form.files.insert(name, UploadedFile { filename, bytes });
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn with_file(mut self, name: &str, filename: &str, bytes: impl Into<Bytes>) -> Self {
        self.files.insert(
            name.to_owned(),
            UploadedFile {
                filename: filename.to_owned(),
                bytes: bytes.into(),
            },
        );
        self
    }
}

impl FormFields for MultipartForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reduce a client filename to a safe, flat ASCII name.
///
/// Non-ASCII is dropped, path separators and whitespace collapse to `_`,
/// anything outside `[A-Za-z0-9_.-]` is removed, and leading/trailing dots
/// and underscores are stripped. Returns `None` when nothing is left.
pub fn secure_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Write `file` into `dir`, returning the stored name.
///
/// A file with the same name is overwritten.
pub async fn save_upload(dir: &Path, file: &UploadedFile) -> Result<String, UploadError> {
    let filename = secure_filename(&file.filename)
        .ok_or_else(|| UploadError::InvalidFilename(file.filename.clone()))?;
    let path = dir.join(&filename);

    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = file.bytes.len(), "Saved upload");
    Ok(filename)
}

/// Save the upload if one was sent, otherwise use `default`.
pub async fn save_or_default(
    dir: &Path,
    file: Option<&UploadedFile>,
    default: &str,
) -> Result<String, UploadError> {
    match file {
        Some(file) => save_upload(dir, file).await,
        None => Ok(default.to_owned()),
    }
}

/// Create the upload directories if missing.
pub async fn ensure_dirs(dirs: &[PathBuf]) -> Result<(), UploadError> {
    for dir in dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| UploadError::Io {
                path: dir.clone(),
                source,
            })?;
    }
    Ok(())
}
