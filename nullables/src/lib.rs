//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the pipeline (media storage, attempt
//! records, the audit trail, OCR, face detection) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or load model weights
//!
//! Usage: swap real implementations for nullables in tests.

pub mod extract;
pub mod store;

pub use extract::{CannedOcr, FailingOcr, PixelFaceEngine};
pub use store::{NullAuditSink, NullMediaStore, NullRecordStore};
