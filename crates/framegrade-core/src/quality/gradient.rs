use ndarray::ArrayView2;

use crate::frame::GrayFrame;

/// Mean Sobel gradient magnitude over the frame interior, in sample units.
///
/// Sobel kernels:
///   Gx = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]
///   Gy = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]]
///
/// Score = mean of sqrt(Gx^2 + Gy^2). Higher = more edge detail.
pub fn sobel_mean_magnitude(frame: &GrayFrame) -> f64 {
    sobel_mean_magnitude_view(frame.view())
}

pub fn sobel_mean_magnitude_view(data: ArrayView2<'_, u8>) -> f64 {
    let (h, w) = data.dim();
    if h < 3 || w < 3 {
        return 0.0;
    }

    let px = |row: usize, col: usize| data[[row, col]] as i32;
    let mut sum = 0.0f64;
    let count = ((h - 2) * (w - 2)) as f64;

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let gx = -px(row - 1, col - 1) + px(row - 1, col + 1) - 2 * px(row, col - 1)
                + 2 * px(row, col + 1)
                - px(row + 1, col - 1)
                + px(row + 1, col + 1);

            let gy = -px(row - 1, col - 1) - 2 * px(row - 1, col) - px(row - 1, col + 1)
                + px(row + 1, col - 1)
                + 2 * px(row + 1, col)
                + px(row + 1, col + 1);

            sum += ((gx * gx + gy * gy) as f64).sqrt();
        }
    }

    sum / count
}
