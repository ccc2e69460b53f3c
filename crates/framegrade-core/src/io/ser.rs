use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::color::luma;
use crate::consts::SER_TICKS_PER_SECOND;
use crate::error::{FramegradeError, Result};
use crate::frame::{FrameMetadata, GrayFrame};

use super::source::{FrameSource, SourceInfo, TimeSampler};

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Sample layout recorded in the SER `ColorID` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerColor {
    Mono,
    Bayer(i32),
    Rgb,
    Bgr,
}

impl SerColor {
    fn from_id(color_id: i32) -> Self {
        match color_id {
            8..=19 => Self::Bayer(color_id),
            100 => Self::Rgb,
            101 => Self::Bgr,
            _ => Self::Mono,
        }
    }

    fn planes(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            _ => 1,
        }
    }
}

impl std::fmt::Display for SerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mono => write!(f, "mono"),
            Self::Bayer(id) => write!(f, "bayer (color id {id})"),
            Self::Rgb => write!(f, "RGB"),
            Self::Bgr => write!(f, "BGR"),
        }
    }
}

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
}

impl SerHeader {
    /// Bytes per sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    pub fn color(&self) -> SerColor {
        SerColor::from_id(self.color_id)
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_sample() * self.color().planes())
    }
}

/// Memory-mapped SER video reader producing 8-bit grayscale frames.
pub struct SerReader {
    mmap: Mmap,
    frame_bytes: usize,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(FramegradeError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(FramegradeError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let frame_bytes = header
            .frame_byte_size()
            .ok_or_else(|| FramegradeError::InvalidSer("frame size overflows".into()))?;

        let expected = frame_bytes
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| FramegradeError::InvalidSer("frame data size overflows".into()))?;
        if mmap.len() < expected {
            return Err(FramegradeError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            frame_bytes,
            header,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Raw bytes of a single frame (zero-copy from the mapping).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(FramegradeError::InvalidArgument(format!(
                "frame index {index} out of range (total: {count})"
            )));
        }
        let offset = SER_HEADER_SIZE + index * self.frame_bytes;
        Ok(&self.mmap[offset..offset + self.frame_bytes])
    }

    /// Decode one frame to 8-bit grayscale.
    ///
    /// Deep samples are rescaled to 8 bits; RGB/BGR frames are reduced with
    /// the integer luma weights.
    pub fn read_gray(&self, index: usize) -> Result<GrayFrame> {
        let color = self.header.color();
        if let SerColor::Bayer(_) = color {
            return Err(FramegradeError::Unsupported(format!(
                "SER {color} frames are not supported"
            )));
        }

        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let bps = self.header.bytes_per_sample();
        let planes = color.planes();
        let sample = |offset: usize| -> u8 {
            read_sample(raw, offset, bps, self.header.pixel_depth, self.header.little_endian)
        };

        let mut data = Array2::<u8>::zeros((h, w));
        for row in 0..h {
            for col in 0..w {
                let px = (row * w + col) * planes * bps;
                data[[row, col]] = match color {
                    SerColor::Rgb => luma(sample(px), sample(px + bps), sample(px + 2 * bps)),
                    SerColor::Bgr => luma(sample(px + 2 * bps), sample(px + bps), sample(px)),
                    _ => sample(px),
                };
            }
        }

        Ok(GrayFrame::new(data).with_metadata(FrameMetadata {
            frame_index: index,
            timestamp_us: self.relative_timestamp_us(index),
        }))
    }

    /// Per-frame capture time from the optional trailer, in 100 ns ticks.
    pub fn read_timestamp(&self, index: usize) -> Option<u64> {
        let trailer_offset = SER_HEADER_SIZE + self.frame_bytes * self.frame_count();
        let ts_offset = trailer_offset + index * 8;
        let bytes = self.mmap.get(ts_offset..ts_offset + 8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    /// Capture time relative to the first frame, in microseconds.
    fn relative_timestamp_us(&self, index: usize) -> Option<u64> {
        let first = self.read_timestamp(0)?;
        let ticks = self.read_timestamp(index)?.checked_sub(first)?;
        Some(ticks / 10)
    }

    pub fn source_info(&self, path: &Path) -> SourceInfo {
        let duration_s = match (self.read_timestamp(0), self.frame_count().checked_sub(1)) {
            (Some(first), Some(last)) => self
                .read_timestamp(last)
                .and_then(|t| t.checked_sub(first))
                .map(|ticks| ticks as f64 / SER_TICKS_PER_SECOND),
            _ => None,
        };
        let frame_rate = duration_s
            .filter(|d| *d > 0.0)
            .map(|d| (self.frame_count() - 1) as f64 / d);

        let mut detail = vec![
            format!("{}-bit {}", self.header.pixel_depth, self.header.color()),
        ];
        for (label, value) in [
            ("observer", &self.header.observer),
            ("instrument", &self.header.instrument),
            ("telescope", &self.header.telescope),
        ] {
            if !value.is_empty() {
                detail.push(format!("{label}: {value}"));
            }
        }

        SourceInfo {
            path: PathBuf::from(path),
            kind: "ser",
            width: Some(self.header.width),
            height: Some(self.header.height),
            total_frames: Some(self.frame_count()),
            frame_rate,
            duration_s,
            detail: Some(detail.join(", ")),
        }
    }
}

/// [`FrameSource`] over a SER file, sampled by trailer timestamps.
pub struct SerSource {
    reader: SerReader,
    path: PathBuf,
    next_index: usize,
    sampler: TimeSampler,
}

impl SerSource {
    pub fn open(path: &Path, fps: f32) -> Result<Self> {
        let reader = SerReader::open(path)?;
        if let SerColor::Bayer(_) = reader.header.color() {
            return Err(FramegradeError::Unsupported(format!(
                "SER {} frames are not supported",
                reader.header.color()
            )));
        }
        Ok(Self {
            reader,
            path: path.to_path_buf(),
            next_index: 0,
            sampler: TimeSampler::new(fps),
        })
    }
}

impl FrameSource for SerSource {
    fn describe(&self) -> String {
        format!(
            "SER {} ({} frames, {}x{})",
            self.path.display(),
            self.reader.frame_count(),
            self.reader.header.width,
            self.reader.header.height
        )
    }

    fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        while self.next_index < self.reader.frame_count() {
            let index = self.next_index;
            self.next_index += 1;
            let timestamp = self
                .reader
                .relative_timestamp_us(index)
                .map(|us| us as f64 / 1_000_000.0);
            if self.sampler.admit(timestamp) {
                return self.reader.read_gray(index).map(Some);
            }
        }
        Ok(None)
    }
}

fn read_sample(raw: &[u8], offset: usize, bytes_per_sample: usize, depth: u32, little_endian: bool) -> u8 {
    if bytes_per_sample == 1 {
        return raw[offset];
    }
    let pair = [raw[offset], raw[offset + 1]];
    let value = if little_endian {
        u16::from_le_bytes(pair)
    } else {
        u16::from_be_bytes(pair)
    } as u32;
    let max_val = (1u32 << depth) - 1;
    (value.min(max_val) * 255 / max_val) as u8
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    if width == 0 || height == 0 {
        return Err(FramegradeError::InvalidDimensions { width, height });
    }
    if !(1..=16).contains(&pixel_depth) {
        return Err(FramegradeError::InvalidSer(format!(
            "unsupported pixel depth {pixel_depth}"
        )));
    }

    // Most writers store 0 here for little-endian data despite the format
    // documentation; only an explicit 1 is taken as big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}
