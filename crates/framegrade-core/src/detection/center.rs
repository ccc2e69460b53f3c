use crate::consts::DEFAULT_CENTER_REGION_SCALE;
use crate::frame::GrayFrame;

use super::{Region, SubjectDetector};

/// Assumes the subject sits in a centred box covering `scale` of each
/// frame dimension.
///
/// Useful when no real detector is wired in: most hand-held footage keeps
/// its subject near the middle of the frame.
#[derive(Clone, Debug)]
pub struct CenterRegionDetector {
    pub scale: f32,
}

impl Default for CenterRegionDetector {
    fn default() -> Self {
        Self {
            scale: DEFAULT_CENTER_REGION_SCALE,
        }
    }
}

impl CenterRegionDetector {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    pub fn region_for(&self, width: usize, height: usize) -> Option<Region> {
        if width <= 2 || height <= 2 {
            return None;
        }
        let scale = self.scale.clamp(0.0, 1.0);
        let crop_w = ((width as f32 * scale).round() as usize).max(3).min(width);
        let crop_h = ((height as f32 * scale).round() as usize).max(3).min(height);
        let x0 = (width - crop_w) / 2;
        let y0 = (height - crop_h) / 2;
        Some(Region::new(x0 as i32, y0 as i32, crop_w as u32, crop_h as u32))
    }
}

impl SubjectDetector for CenterRegionDetector {
    fn name(&self) -> &str {
        "center"
    }

    fn detect(&self, frame: &GrayFrame) -> Vec<Region> {
        self.region_for(frame.width(), frame.height())
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_box_covers_sixty_percent() {
        let region = CenterRegionDetector::default().region_for(100, 50).unwrap();
        assert_eq!(region, Region::new(20, 10, 60, 30));
    }

    #[test]
    fn tiny_frames_have_no_region() {
        assert!(CenterRegionDetector::default().region_for(2, 10).is_none());
    }

    #[test]
    fn region_never_smaller_than_three_pixels() {
        let region = CenterRegionDetector::new(0.1).region_for(5, 5).unwrap();
        assert_eq!((region.width, region.height), (3, 3));
        assert_eq!((region.x, region.y), (1, 1));
    }
}
