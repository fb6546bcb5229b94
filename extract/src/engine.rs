//! Face engine seam and the built-in luminance fallback engine.

use attest_media::{ops, Frame, Region};
use attest_types::{Embedding, Score};

/// One detected face in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceDetection {
    pub region: Region,
    /// Detector probability for this face.
    pub confidence: Score,
}

/// Pluggable face detection, embedding, and eye localization.
///
/// Implementations hold their model weights as immutable state loaded once
/// at construction; the pipeline shares one engine across attempts via
/// `Arc`. Selection and training of embedding models is out of scope here —
/// only the contract matters:
/// - `detect` returns the single best face by detector probability, or
///   `None` when no face is present (a normal outcome).
/// - `embed` must produce vectors of a fixed dimensionality; comparing
///   embeddings from different engines fails closed downstream.
pub trait FaceEngine: Send + Sync {
    /// Human-readable name of this engine.
    fn name(&self) -> &str;

    /// Detect the single best face in a frame.
    fn detect(&self, frame: &Frame) -> Option<FaceDetection>;

    /// Embed the face in `region` of `frame`.
    fn embed(&self, frame: &Frame, region: Region) -> Embedding;

    /// Count visible eyes inside a detected face region (0, 1, or 2).
    /// Used by active liveness blink scoring.
    fn eye_count(&self, frame: &Frame, region: Region) -> usize;
}

/// Tuning constants of the luminance engine, fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct LumaEngineParams {
    /// Minimum window luma variance to count as a face.
    pub min_face_variance: f64,
    /// Variance at which detection confidence saturates.
    pub variance_norm: f64,
    /// Side length of the embedding grid (embedding dim = grid²).
    pub embedding_grid: usize,
    /// An eye-candidate cell must be darker than this fraction of the
    /// surrounding region mean.
    pub eye_darkness_ratio: f64,
}

impl Default for LumaEngineParams {
    fn default() -> Self {
        Self {
            min_face_variance: 150.0,
            variance_norm: 3000.0,
            embedding_grid: 8,
            eye_darkness_ratio: 0.6,
        }
    }
}

/// A model-free face engine built on luma statistics.
///
/// The fallback path for deployments without a neural detector: faces are
/// located as the highest-variance square window, embeddings are mean-pooled
/// luma grids, and eyes are dark clusters in the upper face half. Detection
/// confidence is deliberately modest — a real engine should replace this in
/// production, and the decision engine's thresholds assume it does.
pub struct LumaFaceEngine {
    params: LumaEngineParams,
}

impl LumaFaceEngine {
    pub fn new(params: LumaEngineParams) -> Self {
        Self { params }
    }
}

impl Default for LumaFaceEngine {
    fn default() -> Self {
        Self::new(LumaEngineParams::default())
    }
}

impl FaceEngine for LumaFaceEngine {
    fn name(&self) -> &str {
        "luma-fallback"
    }

    fn detect(&self, frame: &Frame) -> Option<FaceDetection> {
        let side = (frame.width().min(frame.height()) / 2).max(4);
        if frame.width() < side || frame.height() < side {
            return None;
        }
        let step = (side / 4).max(1);

        let mut best: Option<(f64, Region)> = None;
        let mut y = 0;
        while y + side <= frame.height() {
            let mut x = 0;
            while x + side <= frame.width() {
                let region = Region {
                    x,
                    y,
                    width: side,
                    height: side,
                };
                let var = ops::region_variance(frame, region);
                if best.as_ref().is_none_or(|(v, _)| var > *v) {
                    best = Some((var, region));
                }
                x += step;
            }
            y += step;
        }

        let (var, region) = best?;
        if var < self.params.min_face_variance {
            return None;
        }
        Some(FaceDetection {
            region,
            confidence: Score::clamped(var / self.params.variance_norm),
        })
    }

    fn embed(&self, frame: &Frame, region: Region) -> Embedding {
        let grid = ops::downsample_grid(frame, region, self.params.embedding_grid);
        Embedding::new(grid).l2_normalized()
    }

    fn eye_count(&self, frame: &Frame, region: Region) -> usize {
        let upper = frame.clip(region.upper_half());
        if upper.area() == 0 {
            return 0;
        }

        let mut count = 0;
        // One eye candidate per horizontal half of the upper face.
        for half in 0..2 {
            let half_region = Region {
                x: upper.x + half * upper.width / 2,
                y: upper.y,
                width: upper.width / 2,
                height: upper.height,
            };
            if half_region.area() == 0 {
                continue;
            }
            let half_mean = ops::region_mean(frame, half_region);
            if half_mean == 0.0 {
                continue;
            }

            // Darkest cell of a 4x4 grid over this half.
            let mut darkest = f64::MAX;
            for cy in 0..4 {
                for cx in 0..4 {
                    let cell = Region {
                        x: half_region.x + cx * half_region.width / 4,
                        y: half_region.y + cy * half_region.height / 4,
                        width: (half_region.width / 4).max(1),
                        height: (half_region.height / 4).max(1),
                    };
                    let m = ops::region_mean(frame, frame.clip(cell));
                    if m < darkest {
                        darkest = m;
                    }
                }
            }

            if darkest < half_mean * self.params.eye_darkness_ratio {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_media::Frame;

    /// A frame with a high-contrast square patch on a flat background.
    fn face_frame() -> Frame {
        Frame::from_fn(64, 64, |x, y| {
            if (16..48).contains(&x) && (16..48).contains(&y) {
                if (x + y) % 2 == 0 {
                    220
                } else {
                    40
                }
            } else {
                128
            }
        })
    }

    #[test]
    fn flat_frame_detects_nothing() {
        let engine = LumaFaceEngine::default();
        assert!(engine.detect(&Frame::filled(64, 64, 128)).is_none());
    }

    #[test]
    fn contrast_patch_is_detected() {
        let engine = LumaFaceEngine::default();
        let det = engine.detect(&face_frame()).expect("face detected");
        assert!(det.confidence > Score::ZERO);
        // The winning window overlaps the patch.
        assert!(det.region.x < 48 && det.region.x + det.region.width > 16);
    }

    #[test]
    fn embedding_has_grid_squared_dims_and_unit_norm() {
        let engine = LumaFaceEngine::default();
        let frame = face_frame();
        let det = engine.detect(&frame).unwrap();
        let emb = engine.embed(&frame, det.region);
        assert_eq!(emb.len(), 64);
        let norm: f32 = emb.as_slice().iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn same_face_embeds_identically() {
        let engine = LumaFaceEngine::default();
        let frame = face_frame();
        let det = engine.detect(&frame).unwrap();
        assert_eq!(engine.embed(&frame, det.region), engine.embed(&frame, det.region));
    }

    #[test]
    fn dark_clusters_count_as_eyes() {
        let engine = LumaFaceEngine::default();
        // Bright face with two dark spots in the upper half.
        let frame = Frame::from_fn(32, 32, |x, y| {
            let in_left_eye = (6..10).contains(&x) && (4..8).contains(&y);
            let in_right_eye = (22..26).contains(&x) && (4..8).contains(&y);
            if in_left_eye || in_right_eye {
                10
            } else {
                200
            }
        });
        let region = frame.full_region();
        assert_eq!(engine.eye_count(&frame, region), 2);
    }

    #[test]
    fn uniform_face_has_no_eyes() {
        let engine = LumaFaceEngine::default();
        let frame = Frame::filled(32, 32, 200);
        assert_eq!(engine.eye_count(&frame, frame.full_region()), 0);
    }
}
