//! Liveness detection from selfie video.
//!
//! Two analysis paths over a bounded frame sample:
//! - **Passive**: motion, texture, and blur cues from an unprompted video.
//! - **Active**: challenge-response cues — blinking and head movement.
//!
//! Every sub-score is band-limited: implausibly *good* readings (a perfectly
//! still subject, an unnaturally sharp image) are penalized because they are
//! the signature of replay attacks, not of live capture.

use crate::engine::FaceEngine;
use crate::error::ExtractError;
use attest_media::{ops, Frame, FrameSource};
use attest_types::{LivenessMethod, LivenessParams, LivenessSignal, Score};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Computes a liveness score from a selfie video.
pub struct LivenessExtractor {
    engine: Arc<dyn FaceEngine>,
    params: LivenessParams,
}

impl LivenessExtractor {
    pub fn new(engine: Arc<dyn FaceEngine>, params: LivenessParams) -> Self {
        Self { engine, params }
    }

    /// Assess liveness. Never fails: faults become the failure-safe signal
    /// with the fault detail in `reason`.
    pub fn assess(&self, source: &mut dyn FrameSource, method: LivenessMethod) -> LivenessSignal {
        match self.try_assess(source, method) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, ?method, "liveness fault, returning failure-safe signal");
                LivenessSignal::failure_safe(method, e.to_string())
            }
        }
    }

    /// Assess liveness with typed faults.
    pub fn try_assess(
        &self,
        source: &mut dyn FrameSource,
        method: LivenessMethod,
    ) -> Result<LivenessSignal, ExtractError> {
        match method {
            LivenessMethod::Passive => self.assess_passive(source),
            LivenessMethod::Active => self.assess_active(source),
        }
    }

    // ── Passive path ─────────────────────────────────────────────────────

    fn assess_passive(&self, source: &mut dyn FrameSource) -> Result<LivenessSignal, ExtractError> {
        let p = &self.params;

        let mut sampled: Vec<Frame> = Vec::new();
        for index in 0..p.max_passive_frames {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            if index % p.passive_stride == 0 {
                sampled.push(frame);
            }
        }

        if sampled.len() < p.min_passive_frames {
            return Ok(LivenessSignal::failure_safe(
                LivenessMethod::Passive,
                "insufficient_frames",
            ));
        }

        let motion = self.motion_score(&sampled)?;

        // One Laplacian pass per frame feeds both texture and blur.
        let laplacians: Vec<f64> = sampled.par_iter().map(ops::laplacian_variance).collect();
        let texture = self.texture_score(&laplacians);
        let blur = self.blur_score(&laplacians);

        let score = Score::clamped(
            motion * p.motion_weight + texture * p.texture_weight + blur * p.blur_weight,
        );
        let passed = score.value() >= p.passive_pass_threshold;
        let confidence = score.scaled(if passed {
            p.passive_pass_boost
        } else {
            p.passive_fail_damp
        });

        let mut indicators = BTreeMap::new();
        indicators.insert("motion".to_string(), motion);
        indicators.insert("texture".to_string(), texture);
        indicators.insert("blur".to_string(), blur);

        Ok(LivenessSignal {
            passed,
            score,
            confidence,
            method: LivenessMethod::Passive,
            indicators,
            reason: None,
        })
    }

    /// Mean normalized inter-frame motion, band-limited.
    fn motion_score(&self, frames: &[Frame]) -> Result<f64, ExtractError> {
        let p = &self.params;
        let mut normalized = Vec::with_capacity(frames.len().saturating_sub(1));
        for pair in frames.windows(2) {
            let raw = ops::motion_magnitude(&pair[0], &pair[1])?;
            normalized.push((raw / p.motion_divisor).min(1.0));
        }
        Ok(band_limit_motion(mean(&normalized), p))
    }

    /// Mean normalized focus measure, floored — live video keeps texture.
    fn texture_score(&self, laplacians: &[f64]) -> f64 {
        let p = &self.params;
        let avg = mean(
            &laplacians
                .iter()
                .map(|lap| (lap / p.texture_divisor).min(1.0))
                .collect::<Vec<_>>(),
        );
        avg.max(p.texture_floor)
    }

    /// Mean normalized blur measure, band-limited.
    fn blur_score(&self, laplacians: &[f64]) -> f64 {
        let p = &self.params;
        let avg = mean(
            &laplacians
                .iter()
                .map(|lap| (lap / p.blur_divisor).min(1.0))
                .collect::<Vec<_>>(),
        );
        band_limit_blur(avg, p)
    }

    // ── Active path ──────────────────────────────────────────────────────

    fn assess_active(&self, source: &mut dyn FrameSource) -> Result<LivenessSignal, ExtractError> {
        let p = &self.params;

        let mut frames: Vec<Frame> = Vec::new();
        for _ in 0..p.max_active_frames {
            let Some(frame) = source.next_frame()? else {
                break;
            };
            frames.push(frame);
        }

        if frames.len() < p.min_active_frames {
            return Ok(LivenessSignal::failure_safe(
                LivenessMethod::Active,
                "insufficient_frames_active",
            ));
        }

        // Track the face across frames. Detection order matters for the
        // movement trace, so this stays sequential.
        let mut centers: Vec<(f64, f64)> = Vec::new();
        let mut eye_scores: Vec<f64> = Vec::new();
        for frame in &frames {
            if let Some(det) = self.engine.detect(frame) {
                centers.push(det.region.center());
                let eyes = self.engine.eye_count(frame, det.region);
                eye_scores.push((2 - eyes.min(2)) as f64 / 2.0);
            }
        }

        let blink = blink_score(&eye_scores);
        let head_movement = self.head_movement_score(&centers);

        // Either cue alone is evidence of a live, responsive subject.
        let score = Score::clamped(blink.max(head_movement));
        let passed = score.value() >= p.active_pass_threshold;
        let confidence = score.scaled(if passed {
            p.active_pass_boost
        } else {
            p.active_fail_damp
        });

        let mut indicators = BTreeMap::new();
        indicators.insert("blinking".to_string(), blink);
        indicators.insert("head_movement".to_string(), head_movement);

        Ok(LivenessSignal {
            passed,
            score,
            confidence,
            method: LivenessMethod::Active,
            indicators,
            reason: None,
        })
    }

    /// Variance of the face-center trace, normalized to [0, 1].
    fn head_movement_score(&self, centers: &[(f64, f64)]) -> f64 {
        let p = &self.params;
        if centers.len() < p.min_tracked_faces {
            return 0.0;
        }
        let xs: Vec<f64> = centers.iter().map(|c| c.0).collect();
        let ys: Vec<f64> = centers.iter().map(|c| c.1).collect();
        let avg_variance = (variance(&xs) + variance(&ys)) / 2.0;
        (avg_variance / p.head_movement_divisor * 10.0).min(1.0)
    }
}

/// Band-limit the motion score: the plausible live band passes through,
/// near-stillness (a photo) is penalized, excess (replay, noise) is capped.
fn band_limit_motion(avg: f64, p: &LivenessParams) -> f64 {
    if (p.motion_band_low..=p.motion_band_high).contains(&avg) {
        avg
    } else if avg < p.motion_band_low {
        avg * p.motion_low_factor
    } else {
        p.motion_excess_score
    }
}

/// Band-limit the blur score: moderate blur passes, an unnaturally sharp
/// image (compressed replay) is penalized, heavy motion blur is acceptable.
fn band_limit_blur(avg: f64, p: &LivenessParams) -> f64 {
    if (p.blur_band_low..=p.blur_band_high).contains(&avg) {
        avg
    } else if avg < p.blur_band_low {
        avg * p.blur_low_factor
    } else {
        p.blur_excess_score
    }
}

/// Blink likelihood: fewer visible eyes per frame raises the per-frame
/// score; variance across frames rewards alternation (an actual blink).
fn blink_score(eye_scores: &[f64]) -> f64 {
    if eye_scores.is_empty() {
        return 0.0;
    }
    let avg = mean(eye_scores);
    let std = variance(eye_scores).sqrt();
    ((avg + std) / 2.0).min(1.0)
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population variance.
fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FaceDetection;
    use attest_media::{FrameBuffer, MediaError, Region};
    use attest_types::Embedding;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that always detects a face, with scripted per-call region
    /// positions and eye counts.
    struct TrackedEngine {
        calls: AtomicUsize,
        x_step: usize,
        eyes: Vec<usize>,
    }

    impl TrackedEngine {
        fn new(x_step: usize, eyes: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                x_step,
                eyes,
            }
        }
    }

    impl FaceEngine for TrackedEngine {
        fn name(&self) -> &str {
            "tracked"
        }

        fn detect(&self, _frame: &Frame) -> Option<FaceDetection> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            Some(FaceDetection {
                region: Region {
                    x: i * self.x_step,
                    y: 0,
                    width: 10,
                    height: 10,
                },
                confidence: Score::clamped(0.8),
            })
        }

        fn embed(&self, _frame: &Frame, _region: Region) -> Embedding {
            Embedding::new(vec![1.0])
        }

        fn eye_count(&self, _frame: &Frame, _region: Region) -> usize {
            let i = self.calls.load(Ordering::SeqCst).saturating_sub(1);
            self.eyes[i % self.eyes.len()]
        }
    }

    fn extractor(engine: TrackedEngine) -> LivenessExtractor {
        LivenessExtractor::new(Arc::new(engine), LivenessParams::default())
    }

    fn flat_frames(n: usize) -> Vec<Frame> {
        (0..n).map(|_| Frame::filled(16, 16, 128)).collect()
    }

    // ── Band limits ────────────────────────────────────────────────────

    #[test]
    fn motion_band_limits() {
        let p = LivenessParams::default();
        assert_eq!(band_limit_motion(0.4, &p), 0.4);
        assert_eq!(band_limit_motion(0.1, &p), 0.1);
        assert_eq!(band_limit_motion(0.8, &p), 0.8);
        assert_eq!(band_limit_motion(0.05, &p), 0.1);
        assert_eq!(band_limit_motion(0.95, &p), 0.5);
    }

    #[test]
    fn blur_band_limits() {
        let p = LivenessParams::default();
        assert_eq!(band_limit_blur(0.5, &p), 0.5);
        assert_eq!(band_limit_blur(0.2, &p), 0.30000000000000004);
        assert_eq!(band_limit_blur(0.95, &p), 0.8);
    }

    #[test]
    fn band_edges_are_injectable() {
        let mut p = LivenessParams::default();
        p.motion_band_high = 0.5;
        p.motion_excess_score = 0.2;
        p.blur_band_low = 0.6;
        p.blur_low_factor = 1.1;
        assert_eq!(band_limit_motion(0.6, &p), 0.2);
        assert_eq!(band_limit_blur(0.5, &p), 0.55);
    }

    #[test]
    fn blink_score_rewards_alternation() {
        // Steady eyes-open: no blink evidence.
        assert_eq!(blink_score(&[0.0, 0.0, 0.0, 0.0]), 0.0);
        // Alternating open/closed: mean 0.5, std 0.5 → 0.5.
        assert_eq!(blink_score(&[0.0, 1.0, 0.0, 1.0]), 0.5);
        // No faces at all.
        assert_eq!(blink_score(&[]), 0.0);
    }

    // ── Passive path ───────────────────────────────────────────────────

    #[test]
    fn two_frame_video_is_insufficient() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let mut source = FrameBuffer::new(flat_frames(2));
        let sig = ext.assess(&mut source, LivenessMethod::Passive);
        assert!(!sig.passed);
        assert_eq!(sig.score, Score::ZERO);
        assert_eq!(sig.reason.as_deref(), Some("insufficient_frames"));
        assert_eq!(sig.method, LivenessMethod::Passive);
    }

    #[test]
    fn static_flat_video_fails_passive() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let mut source = FrameBuffer::new(flat_frames(20));
        let sig = ext.assess(&mut source, LivenessMethod::Passive);
        // motion 0 (doubled is still 0), texture floored at 0.3, blur 0:
        // 0.4*0 + 0.4*0.3 + 0.2*0 = 0.12
        assert!(!sig.passed);
        assert!((sig.score.value() - 0.12).abs() < 1e-9);
        assert_eq!(sig.indicators["motion"], 0.0);
        assert_eq!(sig.indicators["texture"], 0.3);
        assert_eq!(sig.indicators["blur"], 0.0);
        // Failed passive confidence is damped by 0.8.
        assert!((sig.confidence.value() - 0.12 * 0.8).abs() < 1e-9);
        assert!(sig.reason.is_none());
    }

    struct CountingSource {
        inner: FrameBuffer,
        served: usize,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, MediaError> {
            let frame = self.inner.next_frame()?;
            if frame.is_some() {
                self.served += 1;
            }
            Ok(frame)
        }
    }

    #[test]
    fn passive_reads_at_most_fifty_frames() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let mut source = CountingSource {
            inner: FrameBuffer::new(flat_frames(500)),
            served: 0,
        };
        ext.assess(&mut source, LivenessMethod::Passive);
        assert_eq!(source.served, 50);
    }

    #[test]
    fn active_reads_at_most_hundred_frames() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let mut source = CountingSource {
            inner: FrameBuffer::new(flat_frames(500)),
            served: 0,
        };
        ext.assess(&mut source, LivenessMethod::Active);
        assert_eq!(source.served, 100);
    }

    // ── Active path ────────────────────────────────────────────────────

    #[test]
    fn nine_frames_is_insufficient_for_active() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let mut source = FrameBuffer::new(flat_frames(9));
        let sig = ext.assess(&mut source, LivenessMethod::Active);
        assert!(!sig.passed);
        assert_eq!(sig.reason.as_deref(), Some("insufficient_frames_active"));
        assert_eq!(sig.method, LivenessMethod::Active);
    }

    #[test]
    fn still_head_with_blinking_scores_blink_only() {
        // Face fixed in place, eyes alternating 2/0 → blink 0.5, movement 0.
        let ext = extractor(TrackedEngine::new(0, vec![2, 0]));
        let mut source = FrameBuffer::new(flat_frames(10));
        let sig = ext.assess(&mut source, LivenessMethod::Active);
        assert_eq!(sig.indicators["blinking"], 0.5);
        assert_eq!(sig.indicators["head_movement"], 0.0);
        assert!((sig.score.value() - 0.5).abs() < 1e-9);
        assert!(!sig.passed); // 0.5 < 0.7
        assert!((sig.confidence.value() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn moving_head_passes_active() {
        // Face center sweeps across the frame; eyes always open.
        let ext = extractor(TrackedEngine::new(20, vec![2]));
        let mut source = FrameBuffer::new(flat_frames(10));
        let sig = ext.assess(&mut source, LivenessMethod::Active);
        assert_eq!(sig.indicators["blinking"], 0.0);
        assert_eq!(sig.indicators["head_movement"], 1.0);
        assert!(sig.passed);
        assert_eq!(sig.score, Score::ONE);
        assert_eq!(sig.confidence, Score::ONE); // 1.0 * 1.1 clamps
    }

    // ── Faults ─────────────────────────────────────────────────────────

    struct FaultySource;

    impl FrameSource for FaultySource {
        fn next_frame(&mut self) -> Result<Option<Frame>, MediaError> {
            Err(MediaError::Unreadable("corrupt container".into()))
        }
    }

    #[test]
    fn decode_fault_becomes_failure_safe_signal() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let sig = ext.assess(&mut FaultySource, LivenessMethod::Passive);
        assert!(!sig.passed);
        assert_eq!(sig.score, Score::ZERO);
        assert!(sig.reason.as_deref().unwrap().contains("corrupt container"));
    }

    #[test]
    fn decode_fault_is_typed_in_try_variant() {
        let ext = extractor(TrackedEngine::new(0, vec![2]));
        let result = ext.try_assess(&mut FaultySource, LivenessMethod::Active);
        assert!(matches!(result, Err(ExtractError::Media(_))));
    }
}
