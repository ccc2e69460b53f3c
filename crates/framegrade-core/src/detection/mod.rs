pub mod center;

pub use center::CenterRegionDetector;

use serde::{Deserialize, Serialize};

use crate::frame::GrayFrame;

/// Axis-aligned box in frame pixel coordinates.
///
/// Detectors may report boxes that overhang the frame; consumers clamp them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with a `frame_width` x `frame_height` frame.
    ///
    /// Returns `None` when nothing of the region lies inside the frame.
    pub fn clamp_to(&self, frame_width: usize, frame_height: usize) -> Option<Region> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(frame_width as i64);
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(frame_height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Source of subject regions for the subject-blur metric.
///
/// Implementations wrap whatever detector the host has available. An empty
/// result makes the metric fall back to whole-frame sharpness.
pub trait SubjectDetector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, frame: &GrayFrame) -> Vec<Region>;
}

/// Detector that never finds a subject.
pub struct NoSubjectDetector;

impl SubjectDetector for NoSubjectDetector {
    fn name(&self) -> &str {
        "none"
    }

    fn detect(&self, _frame: &GrayFrame) -> Vec<Region> {
        Vec::new()
    }
}
