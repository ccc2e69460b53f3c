use serde::{Deserialize, Serialize};

use crate::consts::{
    COMPACT_MAX_FRAMES, COMPACT_SAMPLING_FPS, DEFAULT_MAX_FRAMES, DEFAULT_SAMPLING_FPS,
};
use crate::error::{FramegradeError, Result};
use crate::quality::scoring::Threshold;
use crate::quality::MetricKind;

/// Analyzer configuration, fixed for the lifetime of an [`Analyzer`](super::Analyzer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on frames processed per invocation.
    pub max_frames: usize,
    /// Target temporal sampling rate handed to frame sources.
    pub sampling_fps: f32,
    pub thresholds: ThresholdConfig,
    pub normalize: FrameNormalization,
    /// Emit one debug log line per frame and metric.
    pub log_frame_details: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            sampling_fps: DEFAULT_SAMPLING_FPS,
            thresholds: ThresholdConfig::default(),
            normalize: FrameNormalization::default(),
            log_frame_details: false,
        }
    }
}

impl AnalyzerConfig {
    /// Profile for resource-constrained hosts: few frames, coarse sampling,
    /// thresholds tuned for full-resolution mobile footage.
    pub fn compact() -> Self {
        Self {
            max_frames: COMPACT_MAX_FRAMES,
            sampling_fps: COMPACT_SAMPLING_FPS,
            thresholds: ThresholdConfig::compact(),
            normalize: FrameNormalization::default(),
            log_frame_details: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sampling_fps.is_finite() {
            return Err(FramegradeError::InvalidArgument(format!(
                "sampling_fps must be finite, got {}",
                self.sampling_fps
            )));
        }
        for kind in MetricKind::ALL {
            let threshold = self.thresholds.get(kind);
            if !threshold.is_finite() {
                return Err(FramegradeError::InvalidArgument(format!(
                    "threshold for {kind} must be finite, got good={} bad={}",
                    threshold.good, threshold.bad
                )));
            }
        }
        Ok(())
    }

    /// Sampling rate to request from a source; non-positive rates fall back
    /// to the default.
    pub fn effective_fps(&self) -> f32 {
        if self.sampling_fps > 0.0 {
            self.sampling_fps
        } else {
            DEFAULT_SAMPLING_FPS
        }
    }
}

/// One `(good, bad)` pair per metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub sharpness: Threshold,
    pub exposure: Threshold,
    pub motion_blur: Threshold,
    pub noise: Threshold,
    #[serde(rename = "person_blur")]
    pub subject_blur: Threshold,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sharpness: Threshold::new(20.0, 2.0),
            exposure: Threshold::new(0.002, 0.02),
            motion_blur: Threshold::new(0.2, 1.5),
            noise: Threshold::new(0.001, 0.01),
            subject_blur: Threshold::new(20.0, 2.0),
        }
    }
}

impl ThresholdConfig {
    pub fn compact() -> Self {
        Self {
            sharpness: Threshold::new(800.0, 50.0),
            exposure: Threshold::new(0.01, 0.2),
            motion_blur: Threshold::new(0.2, 1.5),
            noise: Threshold::new(0.02, 0.15),
            subject_blur: Threshold::new(800.0, 50.0),
        }
    }

    pub fn get(&self, kind: MetricKind) -> Threshold {
        match kind {
            MetricKind::Sharpness => self.sharpness,
            MetricKind::Exposure => self.exposure,
            MetricKind::MotionBlur => self.motion_blur,
            MetricKind::Noise => self.noise,
            MetricKind::SubjectBlur => self.subject_blur,
        }
    }

    pub fn set(&mut self, kind: MetricKind, threshold: Threshold) {
        match kind {
            MetricKind::Sharpness => self.sharpness = threshold,
            MetricKind::Exposure => self.exposure = threshold,
            MetricKind::MotionBlur => self.motion_blur = threshold,
            MetricKind::Noise => self.noise = threshold,
            MetricKind::SubjectBlur => self.subject_blur = threshold,
        }
    }
}

/// Optional downscale applied to canonical frames before scoring.
///
/// A bound of 0 is ignored. Frames are never enlarged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameNormalization {
    pub target_short_side: u32,
    pub target_long_side: u32,
}

impl FrameNormalization {
    pub fn is_enabled(&self) -> bool {
        self.target_short_side > 0 || self.target_long_side > 0
    }
}
