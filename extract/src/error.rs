use attest_media::MediaError;
use thiserror::Error;

/// A fault inside an extractor — unreadable media, a crashed engine.
///
/// Distinct from signal-absence outcomes (no face, invalid document), which
/// are ordinary signal values. The infallible extractor APIs convert these
/// faults into failure-safe signals; `try_*` callers see them typed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("ocr failed: {0}")]
    Ocr(String),

    #[error("face engine failed: {0}")]
    Engine(String),
}
