use crate::detection::Region;
use crate::frame::GrayFrame;

use super::laplacian::{laplacian_variance, laplacian_variance_in_region};

/// Area-weighted Laplacian variance over the subject regions.
///
/// Falls back to whole-frame sharpness when no region overlaps the frame.
pub fn subject_blur(frame: &GrayFrame, regions: &[Region]) -> f64 {
    let mut weighted_sum = 0.0f64;
    let mut area_sum = 0.0f64;

    for region in regions {
        let Some(clamped) = region.clamp_to(frame.width(), frame.height()) else {
            continue;
        };
        let area = clamped.area() as f64;
        weighted_sum += laplacian_variance_in_region(frame, &clamped) * area;
        area_sum += area;
    }

    if area_sum <= 0.0 {
        return laplacian_variance(frame);
    }
    weighted_sum / area_sum
}
