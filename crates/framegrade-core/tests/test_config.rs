use framegrade_core::pipeline::config::{AnalyzerConfig, FrameNormalization, ThresholdConfig};
use framegrade_core::quality::scoring::Threshold;
use framegrade_core::quality::MetricKind;

#[test]
fn test_default_values() {
    let config = AnalyzerConfig::default();
    assert_eq!(config.max_frames, 300);
    assert_eq!(config.sampling_fps, 5.0);
    assert!(!config.normalize.is_enabled());
    assert!(!config.log_frame_details);
    assert_eq!(config.thresholds.sharpness, Threshold::new(20.0, 2.0));
    assert_eq!(config.thresholds.get(MetricKind::Exposure), Threshold::new(0.002, 0.02));
    assert_eq!(config.thresholds.get(MetricKind::MotionBlur), Threshold::new(0.2, 1.5));
    assert_eq!(config.thresholds.get(MetricKind::Noise), Threshold::new(0.001, 0.01));
    assert_eq!(config.thresholds.get(MetricKind::SubjectBlur), Threshold::new(20.0, 2.0));
}

#[test]
fn test_compact_profile() {
    let config = AnalyzerConfig::compact();
    assert_eq!(config.max_frames, 16);
    assert_eq!(config.sampling_fps, 1.0);
    assert_eq!(config.thresholds, ThresholdConfig::compact());
    assert_eq!(config.thresholds.sharpness, Threshold::new(800.0, 50.0));
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_roundtrip() {
    let config = AnalyzerConfig {
        normalize: FrameNormalization {
            target_short_side: 360,
            target_long_side: 0,
        },
        ..AnalyzerConfig::compact()
    };
    let text = toml::to_string_pretty(&config).unwrap();
    assert!(text.contains("[thresholds.person_blur]"));
    let parsed: AnalyzerConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let text = r#"
max_frames = 10

[thresholds.sharpness]
good = 100.0
bad = 10.0
"#;
    let config: AnalyzerConfig = toml::from_str(text).unwrap();
    assert_eq!(config.max_frames, 10);
    assert_eq!(config.sampling_fps, 5.0);
    assert_eq!(config.thresholds.sharpness, Threshold::new(100.0, 10.0));
    assert_eq!(config.thresholds.noise, Threshold::new(0.001, 0.01));
}

#[test]
fn test_json_config() {
    let json = r#"{ "sampling_fps": 2.5, "normalize": { "target_short_side": 240 } }"#;
    let config: AnalyzerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.sampling_fps, 2.5);
    assert_eq!(config.normalize.target_short_side, 240);
    assert_eq!(config.normalize.target_long_side, 0);
    assert_eq!(config.max_frames, 300);
}

#[test]
fn test_non_positive_fps_falls_back() {
    let config = AnalyzerConfig {
        sampling_fps: 0.0,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.effective_fps(), 5.0);
}

#[test]
fn test_threshold_set_get() {
    let mut thresholds = ThresholdConfig::default();
    for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
        thresholds.set(kind, Threshold::new(i as f64, -1.0));
    }
    for (i, kind) in MetricKind::ALL.into_iter().enumerate() {
        assert_eq!(thresholds.get(kind).good, i as f64);
    }
}
