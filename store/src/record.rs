//! Attempt record storage trait.

use crate::StoreError;
use attest_types::{AttemptId, Outcome, Score, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a verification attempt.
///
/// `Completed` and `Failed` are terminal; an attempt must never be left in
/// `Processing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

/// The persisted state of one verification attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: AttemptId,
    pub status: AttemptStatus,
    pub created_at: Timestamp,
    pub document_valid: Option<bool>,
    pub face_match_score: Option<Score>,
    pub liveness_score: Option<Score>,
    pub decision: Option<Outcome>,
    pub decision_reason: Option<String>,
    pub processing_time_secs: Option<f64>,
    /// Redacted error detail, set when the attempt failed.
    pub error: Option<String>,
}

impl AttemptRecord {
    /// A freshly created attempt with no results yet.
    pub fn created(id: AttemptId, now: Timestamp) -> Self {
        Self {
            id,
            status: AttemptStatus::Created,
            created_at: now,
            document_valid: None,
            face_match_score: None,
            liveness_score: None,
            decision: None,
            decision_reason: None,
            processing_time_secs: None,
            error: None,
        }
    }
}

/// A partial update to an attempt record. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub status: Option<AttemptStatus>,
    pub document_valid: Option<bool>,
    pub face_match_score: Option<Score>,
    pub liveness_score: Option<Score>,
    pub decision: Option<Outcome>,
    pub decision_reason: Option<String>,
    pub processing_time_secs: Option<f64>,
    pub error: Option<String>,
}

impl RecordPatch {
    /// A patch that only moves the status.
    pub fn status(status: AttemptStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply this patch to a record in place.
    pub fn apply(self, record: &mut AttemptRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(v) = self.document_valid {
            record.document_valid = Some(v);
        }
        if let Some(v) = self.face_match_score {
            record.face_match_score = Some(v);
        }
        if let Some(v) = self.liveness_score {
            record.liveness_score = Some(v);
        }
        if let Some(v) = self.decision {
            record.decision = Some(v);
        }
        if let Some(v) = self.decision_reason {
            record.decision_reason = Some(v);
        }
        if let Some(v) = self.processing_time_secs {
            record.processing_time_secs = Some(v);
        }
        if let Some(v) = self.error {
            record.error = Some(v);
        }
    }
}

/// Trait for persisting attempt state transitions and decision fields.
///
/// Implementations must serialize updates per attempt id: at most one
/// writer for a given attempt at a time.
pub trait RecordStore: Send + Sync {
    /// Persist a new attempt. Fails if the id already exists.
    fn create(&self, record: &AttemptRecord) -> Result<(), StoreError>;

    /// Apply a partial update to an existing attempt.
    fn update(&self, attempt: &AttemptId, patch: RecordPatch) -> Result<(), StoreError>;

    /// Fetch the latest committed state of an attempt.
    fn get(&self, attempt: &AttemptId) -> Result<AttemptRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_leaves_unset_fields_untouched() {
        let mut record = AttemptRecord::created(AttemptId::new("a1"), Timestamp::new(100));
        record.document_valid = Some(true);

        RecordPatch {
            status: Some(AttemptStatus::Processing),
            ..RecordPatch::default()
        }
        .apply(&mut record);

        assert_eq!(record.status, AttemptStatus::Processing);
        assert_eq!(record.document_valid, Some(true));
        assert!(record.decision.is_none());
    }

    #[test]
    fn full_patch_fills_decision_fields() {
        let mut record = AttemptRecord::created(AttemptId::new("a2"), Timestamp::new(100));

        RecordPatch {
            status: Some(AttemptStatus::Completed),
            document_valid: Some(true),
            face_match_score: Some(Score::clamped(0.85)),
            liveness_score: Some(Score::clamped(0.92)),
            decision: Some(Outcome::Verified),
            decision_reason: Some("All checks passed".into()),
            processing_time_secs: Some(1.25),
            error: None,
        }
        .apply(&mut record);

        assert_eq!(record.status, AttemptStatus::Completed);
        assert_eq!(record.decision, Some(Outcome::Verified));
        assert_eq!(record.processing_time_secs, Some(1.25));
        assert!(record.error.is_none());
    }
}
