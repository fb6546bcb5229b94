//! Pixel operations used by the signal-extraction heuristics.
//!
//! These are the only genuinely numeric pieces of the media layer: a
//! Laplacian focus measure (texture/blur), an inter-frame motion magnitude,
//! region statistics, and mean-pooled downsampling for fallback embeddings.

use crate::error::MediaError;
use crate::frame::{Frame, Region};

/// Variance of the 4-neighbour Laplacian response over interior pixels.
///
/// High values mean sharp edges (in-focus, textured); flat frames score 0.
pub fn laplacian_variance(frame: &Frame) -> f64 {
    let (w, h) = (frame.width(), frame.height());
    if w < 3 || h < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let n = ((w - 2) * (h - 2)) as f64;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let c = frame.get(x, y) as f64;
            let lap = 4.0 * c
                - frame.get(x - 1, y) as f64
                - frame.get(x + 1, y) as f64
                - frame.get(x, y - 1) as f64
                - frame.get(x, y + 1) as f64;
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let mean = sum / n;
    (sum_sq / n) - mean * mean
}

/// Mean absolute per-pixel luma difference between two consecutive frames.
///
/// Stands in for a dense optical-flow magnitude: still images score near 0,
/// live motion scores in the low single digits, hard cuts score high.
pub fn motion_magnitude(a: &Frame, b: &Frame) -> Result<f64, MediaError> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(MediaError::Decode(
            "frame dimensions changed mid-stream".into(),
        ));
    }

    let total: u64 = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(&p, &q)| (p as i16 - q as i16).unsigned_abs() as u64)
        .sum();

    Ok(total as f64 / a.as_bytes().len() as f64)
}

/// Mean luma over a region (clipped to the frame).
pub fn region_mean(frame: &Frame, region: Region) -> f64 {
    let r = frame.clip(region);
    if r.area() == 0 {
        return 0.0;
    }
    let mut sum = 0u64;
    for y in r.y..r.y + r.height {
        for x in r.x..r.x + r.width {
            sum += frame.get(x, y) as u64;
        }
    }
    sum as f64 / r.area() as f64
}

/// Luma variance over a region (clipped to the frame).
pub fn region_variance(frame: &Frame, region: Region) -> f64 {
    let r = frame.clip(region);
    if r.area() == 0 {
        return 0.0;
    }
    let mean = region_mean(frame, r);
    let mut sum_sq = 0.0;
    for y in r.y..r.y + r.height {
        for x in r.x..r.x + r.width {
            let d = frame.get(x, y) as f64 - mean;
            sum_sq += d * d;
        }
    }
    sum_sq / r.area() as f64
}

/// Mean-pool a region into an `n`×`n` grid of luma values in `[0, 1]`.
///
/// The grid is the raw material of the fallback face embedding; cells that
/// fall outside the clipped region contribute 0.
pub fn downsample_grid(frame: &Frame, region: Region, n: usize) -> Vec<f32> {
    let r = frame.clip(region);
    let mut out = vec![0.0f32; n * n];
    if r.area() == 0 || n == 0 {
        return out;
    }

    for cy in 0..n {
        for cx in 0..n {
            let x0 = r.x + cx * r.width / n;
            let x1 = r.x + (cx + 1) * r.width / n;
            let y0 = r.y + cy * r.height / n;
            let y1 = r.y + (cy + 1) * r.height / n;
            let cell = Region {
                x: x0,
                y: y0,
                width: x1.saturating_sub(x0),
                height: y1.saturating_sub(y0),
            };
            if cell.area() > 0 {
                out[cy * n + cx] = (region_mean(frame, cell) / 255.0) as f32;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_frame() -> impl Strategy<Value = Frame> {
        (3usize..20, 3usize..20).prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<u8>(), w * h)
                .prop_map(move |data| Frame::from_luma(w, h, data).unwrap())
        })
    }

    #[test]
    fn flat_frame_has_zero_laplacian_variance() {
        let f = Frame::filled(16, 16, 128);
        assert_eq!(laplacian_variance(&f), 0.0);
    }

    #[test]
    fn checkerboard_has_high_laplacian_variance() {
        let f = Frame::from_fn(16, 16, |x, y| if (x + y) % 2 == 0 { 255 } else { 0 });
        assert!(laplacian_variance(&f) > 1000.0);
    }

    #[test]
    fn tiny_frame_scores_zero() {
        let f = Frame::filled(2, 2, 10);
        assert_eq!(laplacian_variance(&f), 0.0);
    }

    #[test]
    fn identical_frames_have_zero_motion() {
        let f = Frame::filled(8, 8, 77);
        assert_eq!(motion_magnitude(&f, &f.clone()).unwrap(), 0.0);
    }

    #[test]
    fn uniform_shift_measures_exactly() {
        let a = Frame::filled(8, 8, 100);
        let b = Frame::filled(8, 8, 110);
        assert_eq!(motion_magnitude(&a, &b).unwrap(), 10.0);
    }

    #[test]
    fn dimension_change_is_a_decode_fault() {
        let a = Frame::filled(8, 8, 0);
        let b = Frame::filled(4, 4, 0);
        assert!(motion_magnitude(&a, &b).is_err());
    }

    #[test]
    fn region_stats() {
        let f = Frame::from_fn(4, 4, |x, _| if x < 2 { 0 } else { 200 });
        let left = Region {
            x: 0,
            y: 0,
            width: 2,
            height: 4,
        };
        assert_eq!(region_mean(&f, left), 0.0);
        assert_eq!(region_variance(&f, left), 0.0);
        assert_eq!(region_mean(&f, f.full_region()), 100.0);
        assert!(region_variance(&f, f.full_region()) > 0.0);
    }

    #[test]
    fn downsample_grid_shape_and_range() {
        let f = Frame::from_fn(32, 32, |x, y| ((x * 7 + y * 3) % 256) as u8);
        let grid = downsample_grid(&f, f.full_region(), 8);
        assert_eq!(grid.len(), 64);
        assert!(grid.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    proptest! {
        #[test]
        fn laplacian_variance_is_nonnegative(frame in arb_frame()) {
            // Allow floating-point slack on the two-pass variance.
            prop_assert!(laplacian_variance(&frame) >= -1e-6);
        }

        #[test]
        fn motion_magnitude_is_symmetric(a in arb_frame()) {
            let b = Frame::from_fn(a.width(), a.height(), |x, y| a.get(x, y).wrapping_add(17));
            prop_assert_eq!(
                motion_magnitude(&a, &b).unwrap(),
                motion_magnitude(&b, &a).unwrap()
            );
        }

        #[test]
        fn downsample_grid_stays_in_unit_interval(frame in arb_frame(), n in 1usize..8) {
            let grid = downsample_grid(&frame, frame.full_region(), n);
            prop_assert_eq!(grid.len(), n * n);
            prop_assert!(grid.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn downsample_empty_region_is_zeros() {
        let f = Frame::filled(8, 8, 255);
        let grid = downsample_grid(
            &f,
            Region {
                x: 8,
                y: 8,
                width: 4,
                height: 4,
            },
            4,
        );
        assert!(grid.iter().all(|&v| v == 0.0));
    }
}
