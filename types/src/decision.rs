//! The terminal decision of a verification attempt.

use crate::score::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final verdict of the decision engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Verified,
    Rejected,
    ManualReview,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Verified => "verified",
            Outcome::Rejected => "rejected",
            Outcome::ManualReview => "manual_review",
        };
        write!(f, "{s}")
    }
}

/// The headline score of each pipeline component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub document: Score,
    pub face: Score,
    pub liveness: Score,
}

/// The decision for one verification attempt.
///
/// Created exactly once per attempt and never mutated after the orchestrator
/// hands it to its caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: Outcome,
    pub reason: String,
    pub scores: ComponentScores,
    /// Wall-clock duration of the attempt's processing, filled in by the
    /// orchestrator.
    pub processing_time_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Outcome::ManualReview).unwrap(),
            "\"manual_review\""
        );
    }

    #[test]
    fn outcome_display_matches_wire_form() {
        assert_eq!(Outcome::Verified.to_string(), "verified");
        assert_eq!(Outcome::ManualReview.to_string(), "manual_review");
    }
}
