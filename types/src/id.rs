//! Verification attempt identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for one end-to-end verification attempt
/// (one document image + one selfie video).
///
/// The pipeline never inspects the contents; callers typically use a UUID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AttemptId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AttemptId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
