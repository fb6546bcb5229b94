//! Temporary-directory media store.

use crate::media::{MediaHandle, MediaKind, MediaStore};
use crate::StoreError;
use attest_types::AttemptId;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A [`MediaStore`] backed by a scratch directory.
///
/// Each attempt gets its own subdirectory; [`MediaStore::release`] removes
/// it, and dropping the store removes everything. Suitable for single-node
/// deployments and integration tests; a blob service implements the same
/// trait in larger installations.
pub struct TempMediaStore {
    root: TempDir,
}

impl TempMediaStore {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            root: TempDir::new()?,
        })
    }

    fn attempt_dir(&self, attempt: &AttemptId) -> PathBuf {
        self.root.path().join(attempt.as_str())
    }

    fn blob_path(&self, handle: &MediaHandle) -> PathBuf {
        self.attempt_dir(&handle.attempt)
            .join(match handle.kind {
                MediaKind::Document => "document",
                MediaKind::SelfieVideo => "selfie_video",
            })
    }
}

impl MediaStore for TempMediaStore {
    fn save(
        &self,
        attempt: &AttemptId,
        kind: MediaKind,
        bytes: &[u8],
    ) -> Result<MediaHandle, StoreError> {
        let dir = self.attempt_dir(attempt);
        fs::create_dir_all(&dir)?;
        let handle = MediaHandle {
            attempt: attempt.clone(),
            kind,
        };
        fs::write(self.blob_path(&handle), bytes)?;
        Ok(handle)
    }

    fn read(&self, handle: &MediaHandle) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(handle);
        if !path.exists() {
            return Err(StoreError::NotFound(format!(
                "{}/{}",
                handle.attempt, handle.kind
            )));
        }
        Ok(fs::read(path)?)
    }

    fn release(&self, attempt: &AttemptId) -> Result<(), StoreError> {
        let dir = self.attempt_dir(attempt);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_read_round_trip() {
        let store = TempMediaStore::new().unwrap();
        let attempt = AttemptId::new("a1");
        let handle = store
            .save(&attempt, MediaKind::Document, b"image bytes")
            .unwrap();
        assert_eq!(store.read(&handle).unwrap(), b"image bytes");
    }

    #[test]
    fn release_deletes_all_attempt_media() {
        let store = TempMediaStore::new().unwrap();
        let attempt = AttemptId::new("a2");
        let doc = store.save(&attempt, MediaKind::Document, b"d").unwrap();
        let vid = store.save(&attempt, MediaKind::SelfieVideo, b"v").unwrap();

        store.release(&attempt).unwrap();
        assert!(matches!(store.read(&doc), Err(StoreError::NotFound(_))));
        assert!(matches!(store.read(&vid), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn release_is_idempotent() {
        let store = TempMediaStore::new().unwrap();
        let attempt = AttemptId::new("a3");
        store.release(&attempt).unwrap();
        store.release(&attempt).unwrap();
    }

    #[test]
    fn attempts_are_isolated() {
        let store = TempMediaStore::new().unwrap();
        let a = AttemptId::new("a4");
        let b = AttemptId::new("a5");
        let ha = store.save(&a, MediaKind::Document, b"a").unwrap();
        store.save(&b, MediaKind::Document, b"b").unwrap();

        store.release(&b).unwrap();
        assert_eq!(store.read(&ha).unwrap(), b"a");
    }
}
