use crate::consts::{LUMA_WEIGHT_B, LUMA_WEIGHT_G, LUMA_WEIGHT_R, LUMA_WEIGHT_SUM};
use crate::error::{FramegradeError, Result};
use crate::frame::{GrayFrame, InputFrame, PixelFormat};

/// Integer BT.601 luma of one pixel, truncated.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((LUMA_WEIGHT_R * r as u32 + LUMA_WEIGHT_G * g as u32 + LUMA_WEIGHT_B * b as u32)
        / LUMA_WEIGHT_SUM) as u8
}

/// Convert a caller-owned frame into a freshly allocated [`GrayFrame`].
pub fn to_gray(input: &InputFrame<'_>) -> Result<GrayFrame> {
    to_gray_reusing(input, Vec::new())
}

/// Convert a caller-owned frame, writing into `buffer`'s allocation.
///
/// The input buffer is only borrowed for the duration of the call.
pub fn to_gray_reusing(input: &InputFrame<'_>, mut buffer: Vec<u8>) -> Result<GrayFrame> {
    validate_input(input)?;

    let width = input.width as usize;
    let height = input.height as usize;
    let row_bytes = input.min_row_bytes();
    let len = width * height;

    buffer.clear();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| FramegradeError::Alloc { bytes: len })?;

    for row in 0..height {
        let start = row * input.stride_bytes;
        let src = &input.data[start..start + row_bytes];
        match input.format {
            PixelFormat::Gray8 => buffer.extend_from_slice(src),
            PixelFormat::Rgba8888 => {
                buffer.extend(src.chunks_exact(4).map(|px| luma(px[0], px[1], px[2])))
            }
            PixelFormat::Bgra8888 => {
                buffer.extend(src.chunks_exact(4).map(|px| luma(px[2], px[1], px[0])))
            }
        }
    }

    GrayFrame::from_raw(width, height, buffer)
}

fn validate_input(input: &InputFrame<'_>) -> Result<()> {
    if input.data.is_empty() {
        return Err(FramegradeError::InvalidArgument(
            "frame buffer is empty".into(),
        ));
    }
    if input.width == 0 || input.height == 0 {
        return Err(FramegradeError::InvalidDimensions {
            width: input.width,
            height: input.height,
        });
    }

    let row_bytes = input.min_row_bytes();
    if input.stride_bytes < row_bytes {
        return Err(FramegradeError::InvalidArgument(format!(
            "stride {} is smaller than {} bytes per {} row of width {}",
            input.stride_bytes, row_bytes, input.format, input.width
        )));
    }

    let required = (input.height as usize - 1)
        .checked_mul(input.stride_bytes)
        .and_then(|n| n.checked_add(row_bytes))
        .ok_or(FramegradeError::InvalidDimensions {
            width: input.width,
            height: input.height,
        })?;
    if input.data.len() < required {
        return Err(FramegradeError::InvalidArgument(format!(
            "frame buffer holds {} bytes, {}x{} {} with stride {} needs {}",
            input.data.len(),
            input.width,
            input.height,
            input.format,
            input.stride_bytes,
            required
        )));
    }
    Ok(())
}
