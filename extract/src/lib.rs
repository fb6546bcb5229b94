//! Signal extractors for the attest verification pipeline.
//!
//! Three extractors turn raw media into structured signals:
//! - [`DocumentExtractor`]: document image → type, fields, validity.
//! - [`FaceExtractor`]: document image / selfie video → face embedding.
//! - [`LivenessExtractor`]: selfie video → passive or active liveness score.
//!
//! Each extractor exposes a fallible `try_*` API (typed faults) and an
//! infallible wrapper that converts any fault into the extractor's
//! failure-safe signal, so the pipeline always completes. "No face found"
//! and "invalid document" are business outcomes, not faults.
//!
//! The model-backed steps sit behind two seams: [`OcrEngine`] for text
//! recognition and [`FaceEngine`] for detection/embedding. Extractors are
//! plainly constructed with their engine injected — no process-wide state.

pub mod document;
pub mod engine;
pub mod error;
pub mod face;
pub mod liveness;
pub mod ocr;

pub use document::DocumentExtractor;
pub use engine::{FaceDetection, FaceEngine, LumaFaceEngine};
pub use error::ExtractError;
pub use face::FaceExtractor;
pub use liveness::LivenessExtractor;
pub use ocr::OcrEngine;
