//! Nullable extraction engines — deterministic OCR and face detection.

use attest_extract::{ExtractError, FaceDetection, FaceEngine, OcrEngine};
use attest_media::{Frame, Region};
use attest_types::{Embedding, Score};

/// An OCR engine that returns a fixed text for every frame.
pub struct CannedOcr {
    text: String,
}

impl CannedOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrEngine for CannedOcr {
    fn name(&self) -> &str {
        "canned"
    }

    fn recognize(&self, _frame: &Frame) -> Result<String, ExtractError> {
        Ok(self.text.clone())
    }
}

/// An OCR engine that always fails, to exercise failure-safe paths.
pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn name(&self) -> &str {
        "failing"
    }

    fn recognize(&self, _frame: &Frame) -> Result<String, ExtractError> {
        Err(ExtractError::Ocr("simulated ocr failure".into()))
    }
}

/// A face engine whose output is a pure function of each frame's first
/// pixel.
///
/// Every frame contains a "face" covering the whole frame at the configured
/// confidence. The embedding for a frame with first pixel `p` is the unit
/// vector of `[p, 255 - p]`, so tests control the similarity between two
/// media items purely through pixel values: equal pixels give similarity 1,
/// pixels 0 and 255 give similarity 0.
pub struct PixelFaceEngine {
    confidence: f64,
    eyes: usize,
    detect_nothing: bool,
    min_detect_width: usize,
    max_detect_width: usize,
}

impl PixelFaceEngine {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            eyes: 2,
            detect_nothing: false,
            min_detect_width: 0,
            max_detect_width: usize::MAX,
        }
    }

    /// Fix the number of visible eyes reported for every frame.
    pub fn with_eyes(mut self, eyes: usize) -> Self {
        self.eyes = eyes;
        self
    }

    /// Detect faces only in frames at most `width` pixels wide. Lets a test
    /// blind the engine to one media item by frame size.
    pub fn max_detect_width(mut self, width: usize) -> Self {
        self.max_detect_width = width;
        self
    }

    /// Detect faces only in frames at least `width` pixels wide.
    pub fn min_detect_width(mut self, width: usize) -> Self {
        self.min_detect_width = width;
        self
    }

    /// An engine that never detects a face.
    pub fn blind() -> Self {
        Self {
            confidence: 0.0,
            eyes: 0,
            detect_nothing: true,
            min_detect_width: 0,
            max_detect_width: usize::MAX,
        }
    }
}

impl FaceEngine for PixelFaceEngine {
    fn name(&self) -> &str {
        "pixel"
    }

    fn detect(&self, frame: &Frame) -> Option<FaceDetection> {
        if self.detect_nothing
            || frame.width() < self.min_detect_width
            || frame.width() > self.max_detect_width
        {
            return None;
        }
        Some(FaceDetection {
            region: frame.full_region(),
            confidence: Score::clamped(self.confidence),
        })
    }

    fn embed(&self, frame: &Frame, _region: Region) -> Embedding {
        let p = frame.get(0, 0) as f32;
        Embedding::new(vec![p, 255.0 - p]).l2_normalized()
    }

    fn eye_count(&self, _frame: &Frame, _region: Region) -> usize {
        self.eyes
    }
}
