//! Signal structs produced by the three extractors.
//!
//! A signal is a structured, confidence-scored observation. Signals are
//! created once per verification attempt and never mutated afterwards; the
//! decision engine consumes them by reference.

use crate::embedding::Embedding;
use crate::score::Score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity document category, classified from the image itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    NationalId,
    DriversLicense,
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentKind::Passport => "passport",
            DocumentKind::NationalId => "national_id",
            DocumentKind::DriversLicense => "drivers_license",
            DocumentKind::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Result of document analysis: classified type, extracted fields, and a
/// validity verdict with its confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentSignal {
    pub kind: DocumentKind,
    pub valid: bool,
    pub confidence: Score,
    /// Extracted fields keyed by canonical name (`passport_number`,
    /// `full_name`, `date_of_birth`, ...).
    pub fields: BTreeMap<String, String>,
    /// Extractor fault detail, when the failure-safe signal was produced.
    pub note: Option<String>,
}

impl DocumentSignal {
    /// The failure-safe signal: unknown type, invalid, zero confidence.
    pub fn failure_safe(note: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Unknown,
            valid: false,
            confidence: Score::ZERO,
            fields: BTreeMap::new(),
            note: Some(note.into()),
        }
    }
}

/// Result of face detection + embedding on a single image source.
///
/// `detected == false` is a normal business outcome, not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceSignal {
    pub detected: bool,
    pub embedding: Option<Embedding>,
    pub detection_confidence: Score,
}

impl FaceSignal {
    /// The "no face found" signal.
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            embedding: None,
            detection_confidence: Score::ZERO,
        }
    }
}

/// Similarity between two face signals' embeddings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSignal {
    pub similarity: Score,
}

/// Which liveness analysis was applied to the selfie video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessMethod {
    /// Motion / texture / blur cues from an unprompted video.
    Passive,
    /// Challenge-response cues: blinking and head movement.
    Active,
}

impl fmt::Display for LivenessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LivenessMethod::Passive => write!(f, "passive"),
            LivenessMethod::Active => write!(f, "active"),
        }
    }
}

/// Result of liveness analysis on the selfie video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivenessSignal {
    pub passed: bool,
    pub score: Score,
    /// Score rescaled around the method's pass threshold.
    pub confidence: Score,
    pub method: LivenessMethod,
    /// Per-indicator sub-scores (`motion`, `texture`, `blur` for passive;
    /// `blinking`, `head_movement` for active).
    pub indicators: BTreeMap<String, f64>,
    /// Why the signal failed, when it did (`insufficient_frames`,
    /// `insufficient_frames_active`, or an extractor fault detail).
    pub reason: Option<String>,
}

impl LivenessSignal {
    /// The failure-safe signal for a method, with a reason for the log.
    pub fn failure_safe(method: LivenessMethod, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: Score::ZERO,
            confidence: Score::ZERO,
            method,
            indicators: BTreeMap::new(),
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_safe_document_is_invalid_unknown() {
        let sig = DocumentSignal::failure_safe("decoder crashed");
        assert_eq!(sig.kind, DocumentKind::Unknown);
        assert!(!sig.valid);
        assert_eq!(sig.confidence, Score::ZERO);
        assert!(sig.fields.is_empty());
        assert_eq!(sig.note.as_deref(), Some("decoder crashed"));
    }

    #[test]
    fn not_detected_face_has_no_embedding() {
        let sig = FaceSignal::not_detected();
        assert!(!sig.detected);
        assert!(sig.embedding.is_none());
        assert_eq!(sig.detection_confidence, Score::ZERO);
    }

    #[test]
    fn failure_safe_liveness_carries_reason() {
        let sig = LivenessSignal::failure_safe(LivenessMethod::Passive, "insufficient_frames");
        assert!(!sig.passed);
        assert_eq!(sig.score, Score::ZERO);
        assert_eq!(sig.reason.as_deref(), Some("insufficient_frames"));
    }

    #[test]
    fn document_kind_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentKind::DriversLicense).unwrap();
        assert_eq!(json, "\"drivers_license\"");
    }
}
