//! Face embedding vector and cosine comparison.

use crate::score::Score;
use serde::{Deserialize, Serialize};

/// A face embedding vector produced by a face engine.
///
/// Embeddings are only comparable when they come from the same engine and
/// have the same dimensionality; comparison fails closed otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Return an L2-normalized copy. A zero vector normalizes to itself.
    pub fn l2_normalized(&self) -> Self {
        let norm = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return self.clone();
        }
        Self(self.0.iter().map(|v| v / norm).collect())
    }

    /// Cosine similarity of two embeddings, clamped to `[0, 1]`.
    ///
    /// Returns `Score::ZERO` when either vector is empty or the
    /// dimensionalities differ (fail closed rather than guess).
    pub fn cosine_similarity(&self, other: &Embedding) -> Score {
        if self.is_empty() || other.is_empty() || self.len() != other.len() {
            return Score::ZERO;
        }

        let a = self.l2_normalized();
        let b = other.l2_normalized();
        let dot: f32 = a.0.iter().zip(&b.0).map(|(x, y)| x * y).sum();
        Score::clamped(dot as f64)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
