//! Uploaded document storage.
//!
//! # Responsibility
//! - Accept uploads for record file fields and give them stable relative
//!   paths under one media root.
//! - Remove stored files after their record is deleted or the field is
//!   replaced, without ever failing the surrounding operation.
//!
//! # Invariants
//! - Stored paths are relative and never escape the media root.
//! - Only `pdf`, `png`, `jpg` and `jpeg` uploads up to `MAX_UPLOAD_BYTES`
//!   are accepted.
//! - A record only ever references uploads under its own
//!   `<entity_tag>/<record_id>/<field>_` prefix.
//! - Cleanup failures are reported and logged, never propagated.

mod local;

pub use local::LocalFileStore;

use crate::model::entity::EntityRef;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Accepted lowercase file extensions.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// Path is empty, absolute, or walks out of the media root.
    InvalidPath(String),
    /// Upload extension is not in `ALLOWED_EXTENSIONS`.
    UnsupportedExtension(String),
    /// Upload is empty or larger than `MAX_UPLOAD_BYTES`.
    InvalidSize { size: usize, max: usize },
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "invalid stored file path `{path}`"),
            Self::UnsupportedExtension(ext) => write!(
                f,
                "unsupported file extension `{ext}`; expected one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
            Self::InvalidSize { size, max } => {
                write!(f, "upload size {size} bytes is outside 1..={max}")
            }
            Self::Io { path, source } => write!(f, "file I/O failed at `{}`: {source}", path.display()),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Byte storage addressed by media-root-relative paths.
pub trait FileStore {
    fn save(&self, relative_path: &str, bytes: &[u8]) -> StorageResult<()>;
    /// Deletes one stored file. Deleting a missing file succeeds.
    fn delete(&self, relative_path: &str) -> StorageResult<()>;
}

/// Outcome of a best-effort cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<String>,
    /// `(path, error message)` for each deletion that failed.
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds `<entity_tag>/<record_id>/<field>_<uuid>.<ext>` for an upload.
pub fn stored_file_name(
    target: EntityRef,
    field: &str,
    original_name: &str,
) -> StorageResult<String> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(StorageError::UnsupportedExtension(extension));
    }
    if field.is_empty()
        || !field
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
    {
        return Err(StorageError::InvalidPath(field.to_string()));
    }

    Ok(format!(
        "{}{}.{extension}",
        stored_file_prefix(target, field),
        Uuid::new_v4().simple()
    ))
}

/// Prefix shared by every upload of `field` on `target`.
pub fn stored_file_prefix(target: EntityRef, field: &str) -> String {
    format!("{}/{}/{field}_", target.entity_type.as_str(), target.id)
}

/// Whether `path` names an upload stored for `target`'s `field`.
pub fn is_owned_upload(target: EntityRef, field: &str, path: &str) -> bool {
    let Some(name) = path.strip_prefix(&stored_file_prefix(target, field)) else {
        return false;
    };
    !name.is_empty() && !name.contains(['/', '\\']) && checked_relative_path(path).is_ok()
}

/// Validates and saves one upload; returns the stored relative path.
pub fn store_upload<F: FileStore + ?Sized>(
    store: &F,
    target: EntityRef,
    field: &str,
    original_name: &str,
    bytes: &[u8],
) -> StorageResult<String> {
    if bytes.is_empty() || bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StorageError::InvalidSize {
            size: bytes.len(),
            max: MAX_UPLOAD_BYTES,
        });
    }

    let path = stored_file_name(target, field, original_name)?;
    store.save(&path, bytes)?;
    info!(
        "event=file_store module=storage status=ok target={target} field={field} bytes={}",
        bytes.len()
    );
    Ok(path)
}

/// Deletes every path, collecting failures instead of returning them.
pub fn best_effort_cleanup<F: FileStore + ?Sized>(store: &F, paths: &[String]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for path in paths {
        match store.delete(path) {
            Ok(()) => report.removed.push(path.clone()),
            Err(err) => {
                warn!("event=file_cleanup module=storage status=error path={path} error={err}");
                report.failed.push((path.clone(), err.to_string()));
            }
        }
    }

    if !paths.is_empty() {
        info!(
            "event=file_cleanup module=storage status=ok removed={} failed={}",
            report.removed.len(),
            report.failed.len()
        );
    }
    report
}

/// Rejects empty, absolute and parent-walking paths.
pub(crate) fn checked_relative_path(relative_path: &str) -> StorageResult<&Path> {
    let path = Path::new(relative_path);
    let all_normal = path
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if relative_path.trim().is_empty() || !all_normal {
        return Err(StorageError::InvalidPath(relative_path.to_string()));
    }
    Ok(path)
}
