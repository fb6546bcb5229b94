//! Fundamental types for the attest verification pipeline.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: attempt identifiers, clamped scores, face embeddings, the
//! extractor signal structs, the final decision, and the tunable parameters.

pub mod decision;
pub mod embedding;
pub mod id;
pub mod params;
pub mod score;
pub mod signal;
pub mod time;

pub use decision::{ComponentScores, Decision, Outcome};
pub use embedding::Embedding;
pub use id::AttemptId;
pub use params::{
    DecisionThresholds, DocumentParams, FaceParams, LivenessParams, PipelineParams,
};
pub use score::Score;
pub use signal::{
    DocumentKind, DocumentSignal, FaceSignal, LivenessMethod, LivenessSignal, MatchSignal,
};
pub use time::Timestamp;
