//! Decision engine and verification orchestrator.
//!
//! The [`decide`] function is the deterministic heart of the pipeline: a
//! fixed-precedence table over the three extractor signals. Around it, the
//! [`VerificationOrchestrator`] drives one attempt through its state machine
//! (`Created → Processing → {Completed, Failed}`), fanning the extractors
//! out across blocking tasks and persisting every transition.

pub mod config;
pub mod decision;
pub mod error;
pub mod locks;
pub mod logging;
pub mod orchestrator;

pub use config::PipelineConfig;
pub use decision::decide;
pub use error::PipelineError;
pub use locks::AttemptLocks;
pub use orchestrator::{AttemptSubmission, VerificationOrchestrator};
