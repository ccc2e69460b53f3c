use crate::consts::{MOTION_BLUR_EPSILON, SAMPLE_MAX};
use crate::frame::GrayFrame;

use super::gradient::sobel_mean_magnitude;

/// Mean absolute difference between two frames, scaled to [0, 1].
///
/// Frames of different size are compared over their overlapping top-left
/// area.
pub fn mean_abs_difference(current: &GrayFrame, previous: &GrayFrame) -> f64 {
    let h = current.height().min(previous.height());
    let w = current.width().min(previous.width());
    if h == 0 || w == 0 {
        return 0.0;
    }

    let mut accum = 0u64;
    for row in 0..h {
        for col in 0..w {
            accum += current.data[[row, col]].abs_diff(previous.data[[row, col]]) as u64;
        }
    }
    accum as f64 / (h * w) as f64 / SAMPLE_MAX
}

/// Temporal change relative to edge strength: large inter-frame change on
/// a frame with weak edges means the motion smeared the image.
///
/// Returns `0` for the first frame of a sequence.
pub fn motion_blur(current: &GrayFrame, previous: Option<&GrayFrame>) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    let diff = mean_abs_difference(current, previous);
    let edges = sobel_mean_magnitude(current) / SAMPLE_MAX;
    diff / (edges + MOTION_BLUR_EPSILON)
}
