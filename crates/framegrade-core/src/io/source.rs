use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::consts::{DEFAULT_SAMPLING_FPS, SAMPLE_TIME_TOLERANCE_S};
use crate::error::{FramegradeError, Result};
use crate::frame::GrayFrame;
use crate::pipeline::config::AnalyzerConfig;

use super::ffmpeg::{probe_video, FfmpegSource};
use super::image_seq::{is_image_path, ImageSequenceSource};
use super::ser::{SerReader, SerSource};

/// Supplier of decoded, time-sampled canonical frames in presentation order.
pub trait FrameSource {
    /// Short human-readable label for logs.
    fn describe(&self) -> String;

    /// Next sampled frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<GrayFrame>>;
}

/// What a source knows about its input before decoding.
#[derive(Clone, Debug, Default)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: &'static str,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub total_frames: Option<usize>,
    pub frame_rate: Option<f64>,
    pub duration_s: Option<f64>,
    pub detail: Option<String>,
}

/// Admits frames at a fixed temporal rate.
///
/// A frame is taken once its timestamp reaches the next sample time; the
/// sample time then advances by one interval. Frames without a timestamp
/// are always taken.
#[derive(Clone, Debug)]
pub struct TimeSampler {
    interval: f64,
    next_sample_time: f64,
}

impl TimeSampler {
    pub fn new(fps: f32) -> Self {
        let fps = if fps > 0.0 { fps } else { DEFAULT_SAMPLING_FPS };
        Self {
            interval: 1.0 / fps as f64,
            next_sample_time: 0.0,
        }
    }

    pub fn admit(&mut self, timestamp_s: Option<f64>) -> bool {
        let Some(t) = timestamp_s else {
            return true;
        };
        if t + SAMPLE_TIME_TOLERANCE_S < self.next_sample_time {
            return false;
        }
        self.next_sample_time += self.interval;
        true
    }
}

/// Frames already decoded into memory.
pub struct MemorySource {
    frames: VecDeque<GrayFrame>,
    sampler: Option<TimeSampler>,
}

impl MemorySource {
    pub fn new(frames: Vec<GrayFrame>) -> Self {
        Self {
            frames: frames.into(),
            sampler: None,
        }
    }

    /// Only yield frames whose metadata timestamps fall on a `fps` grid.
    pub fn with_sampling(mut self, fps: f32) -> Self {
        self.sampler = Some(TimeSampler::new(fps));
        self
    }
}

impl FrameSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} frames)", self.frames.len())
    }

    fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        while let Some(frame) = self.frames.pop_front() {
            let admitted = match self.sampler.as_mut() {
                Some(sampler) => sampler.admit(frame.metadata.timestamp_seconds()),
                None => true,
            };
            if admitted {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(FramegradeError::InvalidArgument(format!(
            "input not found: {}",
            path.display()
        )))
    }
}

/// Pick a frame source for `path`.
///
/// Directories and still images are read as image sequences, `.ser` files
/// with the built-in SER reader, and everything else through ffmpeg.
pub fn open_source(path: &Path, config: &AnalyzerConfig) -> Result<Box<dyn FrameSource>> {
    ensure_exists(path)?;
    let fps = config.effective_fps();

    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::from_dir(path)?));
    }
    match extension_lower(path).as_deref() {
        Some("ser") => Ok(Box::new(SerSource::open(path, fps)?)),
        _ if is_image_path(path) => Ok(Box::new(ImageSequenceSource::single(path))),
        _ => Ok(Box::new(FfmpegSource::open(path, fps, config.max_frames)?)),
    }
}

/// Describe `path` without decoding any frames.
pub fn probe_source(path: &Path) -> Result<SourceInfo> {
    ensure_exists(path)?;

    if path.is_dir() {
        return ImageSequenceSource::from_dir(path).map(|s| s.info(path));
    }
    match extension_lower(path).as_deref() {
        Some("ser") => Ok(SerReader::open(path)?.source_info(path)),
        _ if is_image_path(path) => Ok(ImageSequenceSource::single(path).info(path)),
        _ => probe_video(path).map(|probe| probe.source_info(path)),
    }
}
