//! Tunable pipeline parameters.
//!
//! Every numeric knob in the pipeline lives here: decision thresholds plus
//! the empirical normalization constants of the heuristics. The defaults are
//! tuning values, not physics — they are injected into the extractors and
//! the decision engine rather than hard-coded there.

use serde::{Deserialize, Serialize};

/// Thresholds consumed by the decision engine. Injectable per call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// Minimum face-match similarity below which the attempt is rejected.
    pub face_match: f64,
    /// Minimum liveness score required for the fast-path verified branch.
    pub liveness_confidence: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            face_match: 0.6,
            liveness_confidence: 0.9,
        }
    }
}

/// Document extractor parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentParams {
    /// Weight of required-field completeness in the validity confidence.
    pub completeness_weight: f64,
    /// Weight of the primary identifier's format score.
    pub format_weight: f64,
    /// Confidence at or above which the document counts as valid.
    pub validity_threshold: f64,
}

impl Default for DocumentParams {
    fn default() -> Self {
        Self {
            completeness_weight: 0.7,
            format_weight: 0.3,
            validity_threshold: 0.5,
        }
    }
}

/// Face extractor sampling parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceParams {
    /// Hard cap on frames read from the selfie video.
    pub max_selfie_frames: usize,
    /// Analyze every `selfie_stride`-th frame (indices 0, 3, 6, ...).
    pub selfie_stride: usize,
}

impl Default for FaceParams {
    fn default() -> Self {
        Self {
            max_selfie_frames: 30,
            selfie_stride: 3,
        }
    }
}

/// Liveness extractor parameters.
///
/// The divisors are empirical normalization constants carried over from the
/// field-tuned heuristics; no derivation is documented for them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessParams {
    // ── Passive path ─────────────────────────────────────────────────────
    /// Hard cap on frames read for passive analysis.
    pub max_passive_frames: usize,
    /// Sample every `passive_stride`-th frame.
    pub passive_stride: usize,
    /// Minimum sampled frames; fewer fails with `insufficient_frames`.
    pub min_passive_frames: usize,
    /// Divisor normalizing raw inter-frame motion magnitude.
    pub motion_divisor: f64,
    /// Divisor normalizing the Laplacian focus measure for texture.
    pub texture_divisor: f64,
    /// Divisor normalizing the Laplacian measure for blur.
    pub blur_divisor: f64,
    /// Weights of the passive sub-scores (motion, texture, blur).
    pub motion_weight: f64,
    pub texture_weight: f64,
    pub blur_weight: f64,
    /// Passive score at or above which liveness passes.
    pub passive_pass_threshold: f64,
    /// Floor applied to the normalized texture score.
    pub texture_floor: f64,
    /// Plausible motion band; inside it the score passes through unchanged.
    pub motion_band_low: f64,
    pub motion_band_high: f64,
    /// Rescale applied to motion below the band (near-stillness).
    pub motion_low_factor: f64,
    /// Score assigned to motion above the band (replay or noise).
    pub motion_excess_score: f64,
    /// Plausible blur band.
    pub blur_band_low: f64,
    pub blur_band_high: f64,
    /// Rescale applied to blur below the band (unnaturally sharp).
    pub blur_low_factor: f64,
    /// Score assigned to blur above the band (heavy motion blur).
    pub blur_excess_score: f64,

    // ── Active path ──────────────────────────────────────────────────────
    /// Hard cap on consecutive frames read for active analysis.
    pub max_active_frames: usize,
    /// Minimum frames; fewer fails with `insufficient_frames_active`.
    pub min_active_frames: usize,
    /// Divisor normalizing face-center position variance.
    pub head_movement_divisor: f64,
    /// Minimum face-bearing frames for a head-movement score.
    pub min_tracked_faces: usize,
    /// Active score at or above which liveness passes.
    pub active_pass_threshold: f64,

    // ── Confidence rescaling ─────────────────────────────────────────────
    /// Confidence boost factor applied when the method passed.
    pub passive_pass_boost: f64,
    pub passive_fail_damp: f64,
    pub active_pass_boost: f64,
    pub active_fail_damp: f64,
}

impl Default for LivenessParams {
    fn default() -> Self {
        Self {
            max_passive_frames: 50,
            passive_stride: 2,
            min_passive_frames: 3,
            motion_divisor: 10.0,
            texture_divisor: 500.0,
            blur_divisor: 100.0,
            motion_weight: 0.4,
            texture_weight: 0.4,
            blur_weight: 0.2,
            passive_pass_threshold: 0.6,
            texture_floor: 0.3,
            motion_band_low: 0.1,
            motion_band_high: 0.8,
            motion_low_factor: 2.0,
            motion_excess_score: 0.5,
            blur_band_low: 0.3,
            blur_band_high: 0.9,
            blur_low_factor: 1.5,
            blur_excess_score: 0.8,
            max_active_frames: 100,
            min_active_frames: 10,
            head_movement_divisor: 1000.0,
            min_tracked_faces: 5,
            active_pass_threshold: 0.7,
            passive_pass_boost: 1.2,
            passive_fail_damp: 0.8,
            active_pass_boost: 1.1,
            active_fail_damp: 0.9,
        }
    }
}

/// All pipeline parameters, aggregated for injection at construction time.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub thresholds: DecisionThresholds,
    pub document: DocumentParams,
    pub face: FaceParams,
    pub liveness: LivenessParams,
}
