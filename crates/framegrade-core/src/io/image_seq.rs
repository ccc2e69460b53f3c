use std::path::{Path, PathBuf};

use crate::error::{FramegradeError, Result};
use crate::frame::{FrameMetadata, GrayFrame};

use super::source::{FrameSource, SourceInfo};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load an image file and convert it to 8-bit luma.
pub fn load_gray(path: &Path) -> Result<GrayFrame> {
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    GrayFrame::from_raw(w as usize, h as usize, gray.into_raw())
}

/// Still images treated as consecutive frames, in file-name order.
///
/// Stills carry no timestamps, so every image is a sample.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next_index: usize,
}

impl ImageSequenceSource {
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_path(p))
            .collect();
        paths.sort();
        Ok(Self {
            paths,
            next_index: 0,
        })
    }

    pub fn single(path: &Path) -> Self {
        Self {
            paths: vec![path.to_path_buf()],
            next_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn info(&self, path: &Path) -> SourceInfo {
        let dims = self
            .paths
            .first()
            .and_then(|p| image::image_dimensions(p).ok());
        SourceInfo {
            path: path.to_path_buf(),
            kind: "images",
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            total_frames: Some(self.paths.len()),
            ..Default::default()
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn describe(&self) -> String {
        format!("image sequence ({} files)", self.paths.len())
    }

    fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        let Some(path) = self.paths.get(self.next_index) else {
            return Ok(None);
        };
        let index = self.next_index;
        self.next_index += 1;

        let frame = load_gray(path).map_err(|e| {
            FramegradeError::Decode(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(frame.with_metadata(FrameMetadata {
            frame_index: index,
            timestamp_us: None,
        })))
    }
}
