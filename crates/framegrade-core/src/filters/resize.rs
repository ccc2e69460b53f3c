use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

use crate::frame::GrayFrame;
use crate::pipeline::config::FrameNormalization;

/// Target dimensions after applying `norm`, or `None` if the frame already
/// fits. Frames are only ever shrunk and keep their aspect ratio.
pub fn fitted_dimensions(width: usize, height: usize, norm: &FrameNormalization) -> Option<(usize, usize)> {
    let short = width.min(height) as f64;
    let long = width.max(height) as f64;

    let mut scale = 1.0f64;
    if norm.target_short_side > 0 && short > norm.target_short_side as f64 {
        scale = scale.min(norm.target_short_side as f64 / short);
    }
    if norm.target_long_side > 0 && long > norm.target_long_side as f64 {
        scale = scale.min(norm.target_long_side as f64 / long);
    }
    if scale >= 1.0 {
        return None;
    }

    let new_w = ((width as f64 * scale).round() as usize).max(1);
    let new_h = ((height as f64 * scale).round() as usize).max(1);
    Some((new_w, new_h))
}

/// Downscale a frame with bilinear filtering so it fits `norm`.
///
/// Returns `None` when no resize is needed.
pub fn downscale_to_fit(frame: &GrayFrame, norm: &FrameNormalization) -> Option<GrayFrame> {
    let (w, h) = (frame.width(), frame.height());
    let (new_w, new_h) = fitted_dimensions(w, h, norm)?;

    let contiguous = frame.data.as_standard_layout();
    let samples = contiguous.as_slice()?;
    let src = ImageBuffer::<Luma<u8>, &[u8]>::from_raw(w as u32, h as u32, samples)?;
    let resized = imageops::resize(&src, new_w as u32, new_h as u32, FilterType::Triangle);

    GrayFrame::from_raw(new_w, new_h, resized.into_raw())
        .ok()
        .map(|f| f.with_metadata(frame.metadata.clone()))
}
