pub mod aggregate;
pub mod exposure;
pub mod gradient;
pub mod laplacian;
pub mod motion;
pub mod noise;
pub mod scoring;
pub mod subject;

use serde::{Deserialize, Serialize};

use crate::detection::Region;
use crate::frame::GrayFrame;

/// The five independent quality axes, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Sharpness,
    Exposure,
    MotionBlur,
    Noise,
    #[serde(rename = "person_blur")]
    SubjectBlur,
}

impl MetricKind {
    /// Every metric, in the fixed order reports list them.
    pub const ALL: [MetricKind; 5] = [
        Self::Sharpness,
        Self::Exposure,
        Self::MotionBlur,
        Self::Noise,
        Self::SubjectBlur,
    ];

    pub fn id(self) -> u32 {
        match self {
            Self::Sharpness => 0,
            Self::Exposure => 1,
            Self::MotionBlur => 2,
            Self::Noise => 3,
            Self::SubjectBlur => 4,
        }
    }

    /// Stable short name used in reports and host bindings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sharpness => "sharpness",
            Self::Exposure => "exposure",
            Self::MotionBlur => "motion_blur",
            Self::Noise => "noise",
            Self::SubjectBlur => "person_blur",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the metric compares against the previous frame.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::MotionBlur)
    }

    /// Compute the raw metric value for one frame.
    pub fn compute(self, input: &MetricInput<'_>) -> f64 {
        match self {
            Self::Sharpness => laplacian::laplacian_variance(input.frame),
            Self::Exposure => exposure::clipped_fraction(input.frame),
            Self::MotionBlur => motion::motion_blur(input.frame, input.previous),
            Self::Noise => noise::noise_estimate(input.frame),
            Self::SubjectBlur => subject::subject_blur(input.frame, input.regions),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a metric may look at for one frame.
#[derive(Clone, Copy, Debug)]
pub struct MetricInput<'a> {
    pub frame: &'a GrayFrame,
    /// The frame processed just before this one, if any.
    pub previous: Option<&'a GrayFrame>,
    /// Subject regions reported for this frame.
    pub regions: &'a [Region],
}

impl<'a> MetricInput<'a> {
    pub fn new(frame: &'a GrayFrame) -> Self {
        Self {
            frame,
            previous: None,
            regions: &[],
        }
    }
}
