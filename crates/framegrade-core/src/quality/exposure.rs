use crate::consts::{EXPOSURE_CLIP_HIGH, EXPOSURE_CLIP_LOW};
use crate::frame::GrayFrame;

/// Fraction of pixels that are crushed (`<= 5`) or blown (`>= 250`).
pub fn clipped_fraction(frame: &GrayFrame) -> f64 {
    let total = frame.pixel_count();
    if total == 0 {
        return 0.0;
    }
    let clipped = frame
        .data
        .iter()
        .filter(|&&v| v <= EXPOSURE_CLIP_LOW || v >= EXPOSURE_CLIP_HIGH)
        .count();
    clipped as f64 / total as f64
}
