//! OCR engine seam.

use crate::error::ExtractError;
use attest_media::Frame;

/// Pluggable text recognition over a document image.
///
/// The pipeline specifies *that* text is extracted, not *how*; recognition
/// quality is a property of the engine, not of this crate. Production
/// deployments wrap a real OCR backend; tests inject a canned engine.
pub trait OcrEngine: Send + Sync {
    /// Human-readable name of this engine.
    fn name(&self) -> &str;

    /// Recognize the text content of a document image.
    fn recognize(&self, image: &Frame) -> Result<String, ExtractError>;
}
