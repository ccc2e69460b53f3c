use image::{GrayImage, Luma, Rgb, RgbImage};

use framegrade_core::error::ErrorKind;
use framegrade_core::frame::{FrameMetadata, GrayFrame};
use framegrade_core::io::image_seq::{is_image_path, ImageSequenceSource};
use framegrade_core::io::{open_source, probe_source, FrameSource, MemorySource, TimeSampler};
use framegrade_core::pipeline::config::AnalyzerConfig;
use framegrade_core::pipeline::Analyzer;
use framegrade_core::quality::MetricKind;

mod common;

fn timed(index: usize, seconds: f64) -> GrayFrame {
    GrayFrame::filled(4, 4, index as u8).with_metadata(FrameMetadata {
        frame_index: index,
        timestamp_us: Some((seconds * 1_000_000.0).round() as u64),
    })
}

#[test]
fn test_sampler_admits_on_grid() {
    let mut sampler = TimeSampler::new(5.0);
    let admitted: Vec<bool> = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5]
        .iter()
        .map(|t| sampler.admit(Some(*t)))
        .collect();
    assert_eq!(admitted, vec![true, false, true, false, true, false]);
}

#[test]
fn test_sampler_tolerates_rounding() {
    let mut sampler = TimeSampler::new(10.0);
    assert!(sampler.admit(Some(0.0)));
    assert!(sampler.admit(Some(0.1 - 5e-7)));
}

#[test]
fn test_sampler_catches_up_one_interval_at_a_time() {
    // A gap in the stream does not skip sample slots.
    let mut sampler = TimeSampler::new(5.0);
    assert!(sampler.admit(Some(0.0)));
    assert!(sampler.admit(Some(1.0)));
    assert!(sampler.admit(Some(1.01)));
}

#[test]
fn test_sampler_untimed_frames_pass() {
    let mut sampler = TimeSampler::new(1.0);
    assert!(sampler.admit(None));
    assert!(sampler.admit(None));
}

#[test]
fn test_memory_source_sampling() {
    let frames: Vec<_> = (0..10).map(|i| timed(i, i as f64 / 30.0)).collect();
    let mut source = MemorySource::new(frames).with_sampling(10.0);
    let mut indices = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        indices.push(frame.metadata.frame_index);
    }
    assert_eq!(indices, vec![0, 3, 6, 9]);
}

#[test]
fn test_image_extensions() {
    assert!(is_image_path("a.png".as_ref()));
    assert!(is_image_path("B.JPG".as_ref()));
    assert!(is_image_path("c.tiff".as_ref()));
    assert!(!is_image_path("clip.mp4".as_ref()));
    assert!(!is_image_path("noext".as_ref()));
}

#[test]
fn test_image_directory_is_sorted_sequence() {
    let dir = tempfile::tempdir().unwrap();
    GrayImage::from_pixel(8, 6, Luma([200])).save(dir.path().join("b.png")).unwrap();
    GrayImage::from_pixel(8, 6, Luma([10])).save(dir.path().join("a.png")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut source = ImageSequenceSource::from_dir(dir.path()).unwrap();
    assert_eq!(source.len(), 2);

    let first = source.next_frame().unwrap().unwrap();
    assert_eq!(first.data[[0, 0]], 10);
    assert_eq!((first.width(), first.height()), (8, 6));
    let second = source.next_frame().unwrap().unwrap();
    assert_eq!(second.data[[0, 0]], 200);
    assert_eq!(second.metadata.frame_index, 1);
    assert!(source.next_frame().unwrap().is_none());

    let info = probe_source(dir.path()).unwrap();
    assert_eq!(info.kind, "images");
    assert_eq!(info.total_frames, Some(2));
    assert_eq!(info.width, Some(8));
}

#[test]
fn test_analyze_image_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("white.png");
    RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])).save(&path).unwrap();

    let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
    let report = analyzer.analyze_path(&path).unwrap();
    assert_eq!(report.frames_processed, 1);
    assert_eq!(report.mean_for(MetricKind::Exposure).unwrap().raw, 1.0);
}

#[test]
fn test_analyze_ser_path() {
    let frames: Vec<Vec<u8>> = (0..3).map(|_| vec![128u8; 16]).collect();
    let ser = common::build_ser_with_frames(4, 4, &frames);
    let tmp = common::write_test_ser(&ser);

    let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
    let report = analyzer.analyze_path(tmp.path()).unwrap();
    assert_eq!(report.frames_processed, 3);
    assert_eq!(report.mean_for(MetricKind::Noise).unwrap().score, 1.0);
}

#[test]
fn test_empty_directory_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
    let err = analyzer.analyze_path(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_missing_path_is_invalid_argument() {
    let config = AnalyzerConfig::default();
    let err = open_source("/definitely/not/here.mp4".as_ref(), &config)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_unreadable_image_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not really a png").unwrap();

    let mut source = ImageSequenceSource::single(&path);
    let err = source.next_frame().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}
