//! The decision engine: a fixed-precedence table over extractor signals.

use attest_types::{
    ComponentScores, Decision, DecisionThresholds, DocumentSignal, FaceSignal, LivenessSignal,
    MatchSignal, Outcome,
};

/// Similarity at or above which the fast-path verified branch opens.
pub const FAST_PATH_SIMILARITY: f64 = 0.8;
/// Document confidence required for the fast-path verified branch.
pub const FAST_PATH_DOCUMENT_CONFIDENCE: f64 = 0.7;

/// Combine the three signals into a final decision.
///
/// An ordered chain of short-circuiting checks; the first failing check
/// wins and the precedence is fixed:
/// 1. invalid document → rejected
/// 2. no face detected → rejected
/// 3. liveness not passed → rejected
/// 4. similarity strictly below the face-match threshold → rejected
/// 5. high similarity, high liveness score, confident document → verified
/// 6. otherwise → manual review
///
/// Pure and deterministic: frozen inputs always produce bit-identical
/// decisions. `processing_time_secs` is left at 0.0 for the orchestrator to
/// fill in.
pub fn decide(
    doc: &DocumentSignal,
    face: &FaceSignal,
    face_match: &MatchSignal,
    liveness: &LivenessSignal,
    thresholds: &DecisionThresholds,
) -> Decision {
    let scores = ComponentScores {
        document: doc.confidence,
        face: face_match.similarity,
        liveness: liveness.score,
    };

    let (outcome, reason) = if !doc.valid {
        (Outcome::Rejected, "Invalid document")
    } else if !face.detected {
        (Outcome::Rejected, "No face detected")
    } else if !liveness.passed {
        (Outcome::Rejected, "Liveness detection failed")
    } else if face_match.similarity.value() < thresholds.face_match {
        (Outcome::Rejected, "Face match insufficient")
    } else if face_match.similarity.value() >= FAST_PATH_SIMILARITY
        && liveness.score.value() >= thresholds.liveness_confidence
        && doc.confidence.value() >= FAST_PATH_DOCUMENT_CONFIDENCE
    {
        (Outcome::Verified, "All checks passed")
    } else {
        (Outcome::ManualReview, "Requires manual review")
    };

    Decision {
        outcome,
        reason: reason.to_string(),
        scores,
        processing_time_secs: 0.0,
    }
}
