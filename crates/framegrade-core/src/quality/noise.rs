use crate::consts::SAMPLE_MAX;
use crate::frame::GrayFrame;

/// Mean absolute deviation of each pixel from its 3x3 neighbourhood mean,
/// scaled to [0, 1].
///
/// Neighbourhood indices are clamped at the borders, so edge pixels see
/// their own row/column repeated.
pub fn noise_estimate(frame: &GrayFrame) -> f64 {
    let (h, w) = frame.data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }
    let data = &frame.data;

    let mut accum = 0.0f64;
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0u32;
            for dy in -1i64..=1 {
                let r = (row as i64 + dy).clamp(0, h as i64 - 1) as usize;
                for dx in -1i64..=1 {
                    let c = (col as i64 + dx).clamp(0, w as i64 - 1) as usize;
                    sum += data[[r, c]] as u32;
                }
            }
            let mean = sum as f64 / 9.0;
            accum += (data[[row, col]] as f64 - mean).abs();
        }
    }

    accum / (h * w) as f64 / SAMPLE_MAX
}
