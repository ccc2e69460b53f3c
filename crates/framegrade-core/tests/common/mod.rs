#![allow(dead_code)]

use ndarray::Array2;

use framegrade_core::frame::GrayFrame;
use framegrade_core::io::ser::SER_HEADER_SIZE;

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8..=19 Bayer variants, 100=RGB, 101=BGR
pub fn build_ser_header(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian flag, 0 as most capture tools write it
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer
    let mut observer = [0u8; 40];
    observer[..4].copy_from_slice(b"Test");
    buf.extend_from_slice(&observer);
    // Instrument, Telescope
    buf.extend_from_slice(&[0u8; 40]);
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete mono 8-bit SER file with the given frame data and no trailer.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, 8, frames.len(), 0);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Mono 8-bit SER file with a timestamp trailer, times given in seconds.
pub fn build_ser_with_timestamps(
    width: u32,
    height: u32,
    frames: &[Vec<u8>],
    times_s: &[f64],
) -> Vec<u8> {
    assert_eq!(frames.len(), times_s.len());
    let mut buf = build_ser_with_frames(width, height, frames);
    // Arbitrary non-zero epoch; readers only use differences.
    let epoch = 638_000_000_000_000_000u64;
    for t in times_s {
        let ticks = epoch + (t * 10_000_000.0).round() as u64;
        buf.extend_from_slice(&ticks.to_le_bytes());
    }
    buf
}

/// Write a SER buffer to a temporary file.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".ser")
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}

/// Alternating 0/255 pixels: the sharpest possible 8-bit pattern.
pub fn checkerboard(width: usize, height: usize) -> GrayFrame {
    GrayFrame::new(Array2::from_shape_fn((height, width), |(r, c)| {
        if (r + c) % 2 == 0 {
            255
        } else {
            0
        }
    }))
}

/// Smooth diagonal ramp spanning mid-tones only.
pub fn ramp(width: usize, height: usize) -> GrayFrame {
    GrayFrame::new(Array2::from_shape_fn((height, width), |(r, c)| {
        (40 + (r + c) * 2).min(200) as u8
    }))
}

/// Deterministic pseudo-random texture in the mid-tone range.
pub fn texture(width: usize, height: usize, seed: u32) -> GrayFrame {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let mut samples = Vec::with_capacity(width * height);
    for _ in 0..width * height {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        samples.push(30 + (state % 196) as u8);
    }
    GrayFrame::from_raw(width, height, samples).expect("valid texture")
}

/// Row-major samples of a frame.
pub fn samples(frame: &GrayFrame) -> Vec<u8> {
    frame.data.iter().copied().collect()
}
