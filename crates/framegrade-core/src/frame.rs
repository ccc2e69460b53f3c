use ndarray::{Array2, ArrayView2};

use crate::error::{FramegradeError, Result};

/// Pixel layout of a caller-supplied frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// One 8-bit luma sample per pixel.
    Gray8,
    /// Four 8-bit samples per pixel in R, G, B, A order.
    Rgba8888,
    /// Four 8-bit samples per pixel in B, G, R, A order.
    Bgra8888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgba8888 | Self::Bgra8888 => 4,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gray8 => write!(f, "GRAY8"),
            Self::Rgba8888 => write!(f, "RGBA8888"),
            Self::Bgra8888 => write!(f, "BGRA8888"),
        }
    }
}

/// A borrowed, caller-owned frame buffer of arbitrary layout.
///
/// Rows start every `stride_bytes` bytes; padding past the last pixel of a
/// row is ignored.
#[derive(Clone, Copy, Debug)]
pub struct InputFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub stride_bytes: usize,
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> InputFrame<'a> {
    /// Tightly packed frame (stride equals the row width in bytes).
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            stride_bytes: width as usize * format.bytes_per_pixel(),
            format,
            data,
        }
    }

    /// Smallest legal stride for this width and format.
    pub fn min_row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }
}

/// Canonical single-channel 8-bit frame that every metric operates on.
///
/// Samples are stored row-major with shape `(height, width)`.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    pub data: Array2<u8>,
    pub metadata: FrameMetadata,
}

impl GrayFrame {
    pub fn new(data: Array2<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame from tightly packed row-major samples.
    pub fn from_raw(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FramegradeError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            });
        }
        let data = Array2::from_shape_vec((height, width), samples).map_err(|e| {
            FramegradeError::InvalidArgument(format!(
                "sample buffer does not match {width}x{height}: {e}"
            ))
        })?;
        Ok(Self::new(data))
    }

    /// Frame with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self::new(Array2::from_elem((height, width), value))
    }

    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Distance in samples between the starts of consecutive rows.
    pub fn row_stride(&self) -> usize {
        self.data.strides()[0].unsigned_abs()
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    /// Give the sample buffer back so the next frame can reuse its allocation.
    pub fn into_samples(self) -> Vec<u8> {
        let (samples, _offset) = self.data.into_raw_vec_and_offset();
        samples
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    /// Position of the frame in its source, before sampling.
    pub frame_index: usize,
    /// Presentation time relative to the start of the source.
    pub timestamp_us: Option<u64>,
}

impl FrameMetadata {
    pub fn timestamp_seconds(&self) -> Option<f64> {
        self.timestamp_us.map(|us| us as f64 / 1_000_000.0)
    }
}
