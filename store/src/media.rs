//! Media storage trait.

use crate::StoreError;
use attest_types::AttemptId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of media a blob is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// The identity document image.
    Document,
    /// The selfie video.
    SelfieVideo,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Document => write!(f, "document"),
            MediaKind::SelfieVideo => write!(f, "selfie_video"),
        }
    }
}

/// Opaque, stable handle to a stored media blob.
///
/// Valid for the lifetime of the owning attempt; reads through a handle
/// after [`MediaStore::release`] fail with `NotFound`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandle {
    pub attempt: AttemptId,
    pub kind: MediaKind,
}

/// Trait for storing an attempt's uploaded media.
///
/// Media is a scoped resource: acquired for the duration of one attempt and
/// released on every exit path, success or failure.
pub trait MediaStore: Send + Sync {
    /// Store a media blob for an attempt, returning a stable handle.
    fn save(
        &self,
        attempt: &AttemptId,
        kind: MediaKind,
        bytes: &[u8],
    ) -> Result<MediaHandle, StoreError>;

    /// Read a previously saved blob.
    fn read(&self, handle: &MediaHandle) -> Result<Vec<u8>, StoreError>;

    /// Delete all media belonging to an attempt. Idempotent.
    fn release(&self, attempt: &AttemptId) -> Result<(), StoreError>;
}
