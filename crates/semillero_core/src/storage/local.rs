//! Filesystem-backed file store rooted at the media directory.

use crate::storage::{checked_relative_path, FileStore, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path.
    pub fn resolve(&self, relative_path: &str) -> StorageResult<PathBuf> {
        Ok(self.root.join(checked_relative_path(relative_path)?))
    }
}

impl FileStore for LocalFileStore {
    fn save(&self, relative_path: &str, bytes: &[u8]) -> StorageResult<()> {
        let target = self.resolve(relative_path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, bytes).map_err(|source| StorageError::Io {
            path: target.clone(),
            source,
        })
    }

    fn delete(&self, relative_path: &str) -> StorageResult<()> {
        let target = self.resolve(relative_path)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: target,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LocalFileStore;
    use crate::storage::FileStore;

    #[test]
    fn save_then_delete_round_trips_on_disk() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocalFileStore::new(dir.path());
        store
            .save("student/abc/photo_1.png", b"png-bytes")
            .expect("save file");
        let path = store.resolve("student/abc/photo_1.png").expect("resolve");
        assert_eq!(std::fs::read(&path).expect("read back"), b"png-bytes");

        store.delete("student/abc/photo_1.png").expect("delete file");
        assert!(!path.exists());
        store
            .delete("student/abc/photo_1.png")
            .expect("deleting a missing file succeeds");
    }

    #[test]
    fn refuses_paths_outside_root() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = LocalFileStore::new(dir.path());
        assert!(store.save("../escape.pdf", b"x").is_err());
        assert!(store.delete("/etc/hosts").is_err());
    }
}
