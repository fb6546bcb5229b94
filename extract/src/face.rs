//! Face extraction and comparison.

use crate::engine::FaceEngine;
use crate::error::ExtractError;
use attest_media::{Frame, FrameSource};
use attest_types::{FaceParams, FaceSignal, MatchSignal, Score};
use std::sync::Arc;
use tracing::{debug, warn};

/// Detects and embeds faces in the document image and the selfie video.
pub struct FaceExtractor {
    engine: Arc<dyn FaceEngine>,
    params: FaceParams,
}

impl FaceExtractor {
    pub fn new(engine: Arc<dyn FaceEngine>, params: FaceParams) -> Self {
        Self { engine, params }
    }

    /// Extract the single best face from a document image.
    ///
    /// "No face" is a normal outcome, returned as `detected = false`.
    pub fn from_document(&self, image: &Frame) -> FaceSignal {
        match self.engine.detect(image) {
            Some(det) => FaceSignal {
                detected: true,
                embedding: Some(self.engine.embed(image, det.region)),
                detection_confidence: det.confidence,
            },
            None => FaceSignal::not_detected(),
        }
    }

    /// Extract the best face across a sampled subset of selfie frames.
    ///
    /// Reads at most `max_selfie_frames` frames, analyzes every
    /// `selfie_stride`-th (indices 0, 3, 6, ...), and keeps the detection
    /// with the highest engine confidence.
    pub fn try_from_selfie(
        &self,
        source: &mut dyn FrameSource,
    ) -> Result<FaceSignal, ExtractError> {
        let mut best: Option<FaceSignal> = None;
        let mut analyzed = 0usize;

        for index in 0..self.params.max_selfie_frames {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            if index % self.params.selfie_stride != 0 {
                continue;
            }
            analyzed += 1;

            if let Some(det) = self.engine.detect(&frame) {
                let better = best
                    .as_ref()
                    .is_none_or(|b| det.confidence > b.detection_confidence);
                if better {
                    best = Some(FaceSignal {
                        detected: true,
                        embedding: Some(self.engine.embed(&frame, det.region)),
                        detection_confidence: det.confidence,
                    });
                }
            }
        }

        debug!(analyzed, detected = best.is_some(), "selfie face sampling done");
        Ok(best.unwrap_or_else(FaceSignal::not_detected))
    }

    /// Infallible variant of [`Self::try_from_selfie`]: a decode fault is
    /// logged and reported as "no face detected".
    pub fn from_selfie(&self, source: &mut dyn FrameSource) -> FaceSignal {
        match self.try_from_selfie(source) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "selfie face extraction fault, returning not-detected");
                FaceSignal::not_detected()
            }
        }
    }

    /// Cosine similarity of two face signals' embeddings, clamped to [0, 1].
    ///
    /// Returns similarity 0 when either embedding is missing or the
    /// dimensionalities differ — comparison fails closed.
    pub fn compare(a: &FaceSignal, b: &FaceSignal) -> MatchSignal {
        let similarity = match (&a.embedding, &b.embedding) {
            (Some(ea), Some(eb)) => ea.cosine_similarity(eb),
            _ => Score::ZERO,
        };
        MatchSignal { similarity }
    }
}
