//! Unit-interval score type.
//!
//! Every confidence, similarity, and liveness sub-score in the pipeline is a
//! float in `[0, 1]`. `Score` enforces the clamp at construction so the
//! invariant cannot be violated downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A float clamped to the unit interval `[0.0, 1.0]`.
///
/// NaN inputs clamp to zero (fail closed).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Create a score, clamping the input into `[0, 1]`.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Scale by a factor, re-clamping the result.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::clamped(self.0 * factor)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::clamped(value)
    }
}
