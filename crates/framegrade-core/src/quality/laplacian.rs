use ndarray::{s, ArrayView2};

use crate::detection::Region;
use crate::frame::GrayFrame;

/// Laplacian variance of a frame. Higher means sharper.
///
/// Convolves the interior (1-pixel border excluded) with the 3x3 kernel:
///   0  1  0
///   1 -4  1
///   0  1  0
/// Then returns the variance of the result.
pub fn laplacian_variance(frame: &GrayFrame) -> f64 {
    laplacian_variance_view(frame.view())
}

pub fn laplacian_variance_view(data: ArrayView2<'_, u8>) -> f64 {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let count = ((h - 2) * (w - 2)) as f64;

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let lap = -4 * data[[row, col]] as i32
                + data[[row - 1, col]] as i32
                + data[[row + 1, col]] as i32
                + data[[row, col - 1]] as i32
                + data[[row, col + 1]] as i32;
            let value = lap as f64;
            sum += value;
            sum_sq += value * value;
        }
    }

    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Laplacian variance restricted to the pixels of `region`.
///
/// The kernel is evaluated at every pixel of the region that has a full
/// 3x3 neighbourhood inside the frame, so neighbours just outside the
/// region still contribute. A region that leaves fewer than two interior
/// rows or columns scores `0`.
pub fn laplacian_variance_in_region(frame: &GrayFrame, region: &Region) -> f64 {
    let (h, w) = frame.data.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }

    let x0 = i64::from(region.x).max(1);
    let y0 = i64::from(region.y).max(1);
    let x1 = (i64::from(region.x) + i64::from(region.width) - 1).min(w as i64 - 2);
    let y1 = (i64::from(region.y) + i64::from(region.height) - 1).min(h as i64 - 2);
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }

    let window = frame.data.slice(s![
        (y0 - 1) as usize..=(y1 + 1) as usize,
        (x0 - 1) as usize..=(x1 + 1) as usize
    ]);
    laplacian_variance_view(window)
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn single_hot_pixel_variance() {
        // One bright pixel in a 3x3 frame: the only interior sample is -4*9.
        let mut data = Array2::<u8>::zeros((3, 3));
        data[[1, 1]] = 9;
        let frame = GrayFrame::new(data);
        // A single sample has zero variance.
        assert_eq!(laplacian_variance(&frame), 0.0);
    }

    #[test]
    fn region_covering_frame_matches_whole_frame() {
        let data = Array2::from_shape_fn((8, 8), |(r, c)| ((r * 31 + c * 17) % 256) as u8);
        let frame = GrayFrame::new(data);
        let whole = laplacian_variance(&frame);
        let region = laplacian_variance_in_region(&frame, &Region::new(0, 0, 8, 8));
        assert!((whole - region).abs() < 1e-9);
    }

    #[test]
    fn single_column_region_is_zero() {
        let data = Array2::from_shape_fn((8, 8), |(r, c)| ((r * 7 + c * 13) % 256) as u8);
        let frame = GrayFrame::new(data);
        assert_eq!(laplacian_variance_in_region(&frame, &Region::new(3, 1, 1, 6)), 0.0);
    }
}
