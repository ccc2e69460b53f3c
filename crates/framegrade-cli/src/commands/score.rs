use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use framegrade_core::detection::CenterRegionDetector;
use framegrade_core::error::FramegradeError;
use framegrade_core::pipeline::config::AnalyzerConfig;
use framegrade_core::pipeline::{AggregateReport, Analyzer};
use framegrade_core::quality::MetricKind;

use super::config::{load, ProfileArg};
use crate::summary::print_report;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WeightsArg {
    /// Even spread across all five metrics
    Balanced,
    /// Favors steady footage of people: motion and exposure dominate
    Person,
    /// Favors crisp landscapes: sharpness dominates
    Scenery,
}

impl WeightsArg {
    pub fn weights(self) -> &'static [(MetricKind, f64)] {
        match self {
            Self::Balanced => &[
                (MetricKind::Sharpness, 0.25),
                (MetricKind::Exposure, 0.25),
                (MetricKind::MotionBlur, 0.20),
                (MetricKind::Noise, 0.15),
                (MetricKind::SubjectBlur, 0.15),
            ],
            Self::Person => &[
                (MetricKind::Sharpness, 0.15),
                (MetricKind::MotionBlur, 0.45),
                (MetricKind::Exposure, 0.30),
                (MetricKind::Noise, 0.10),
            ],
            Self::Scenery => &[
                (MetricKind::Sharpness, 0.35),
                (MetricKind::MotionBlur, 0.20),
                (MetricKind::Exposure, 0.30),
                (MetricKind::Noise, 0.15),
            ],
        }
    }
}

/// Weighted mean score on a 0-100 scale, `None` if a weighted metric is
/// missing from the report.
pub fn weighted_score(report: &AggregateReport, weights: &[(MetricKind, f64)]) -> Option<u32> {
    let mut total = 0.0f64;
    for &(kind, weight) in weights {
        let score = report.mean_for(kind)?.score.clamp(0.0, 1.0);
        total += score * weight;
    }
    Some((total * 100.0).round() as u32)
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Input videos, SER files, images or image directories
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analyzer config TOML (overrides --profile)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Built-in configuration profile
    #[arg(long, value_enum, default_value = "default")]
    pub profile: ProfileArg,

    /// Maximum frames to score per input
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Temporal sampling rate in frames per second
    #[arg(long)]
    pub fps: Option<f32>,

    /// Weight profile for the overall score
    #[arg(long, value_enum, default_value = "balanced")]
    pub weights: WeightsArg,

    /// Treat the central 60% of each frame as the subject
    #[arg(long)]
    pub center_subject: bool,

    /// Log every frame's metric values (visible with --verbose)
    #[arg(long)]
    pub log_frames: bool,

    /// Print reports as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScoreOutput {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    weighted_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AggregateReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<i32>,
}

fn build_config(args: &ScoreArgs) -> Result<AnalyzerConfig> {
    let mut config = match args.config {
        Some(ref path) => load(path)?,
        None => args.profile.config(),
    };
    if let Some(max_frames) = args.max_frames {
        config.max_frames = max_frames;
    }
    if let Some(fps) = args.fps {
        config.sampling_fps = fps;
    }
    if args.log_frames {
        config.log_frame_details = true;
    }
    Ok(config)
}

pub fn run(args: &ScoreArgs) -> Result<()> {
    let config = build_config(args)?;
    let mut analyzer = Analyzer::new(config)?;
    if args.center_subject {
        analyzer = analyzer.with_detector(Arc::new(CenterRegionDetector::default()));
    }

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Scoring inputs");

    let results: Vec<(PathBuf, Result<AggregateReport, FramegradeError>)> = args
        .files
        .par_iter()
        .map(|path| {
            let result = analyzer.analyze_path(path);
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();
    pb.finish_and_clear();

    let weights = args.weights.weights();
    let mut outputs: Vec<ScoreOutput> = results
        .into_iter()
        .map(|(path, result)| match result {
            Ok(report) => ScoreOutput {
                weighted_score: weighted_score(&report, weights),
                path,
                report: Some(report),
                error: None,
                error_code: None,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Scoring failed");
                ScoreOutput {
                    path,
                    weighted_score: None,
                    report: None,
                    error_code: Some(e.kind().code()),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    // Best first; failed inputs last, in input order.
    outputs.sort_by(|a, b| b.weighted_score.cmp(&a.weighted_score));

    let failed = outputs.iter().filter(|o| o.error.is_some()).count();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        for output in &outputs {
            match (&output.report, &output.error) {
                (Some(report), _) => print_report(&output.path, report, output.weighted_score),
                (None, Some(error)) => println!("\n{}: {}", output.path.display(), error),
                (None, None) => {}
            }
        }
        if outputs.len() > 1 {
            crate::summary::print_ranking(
                outputs
                    .iter()
                    .filter_map(|o| o.weighted_score.map(|s| (o.path.as_path(), s))),
            );
        }
    }

    if failed > 0 {
        bail!("{} of {} inputs could not be scored", failed, outputs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrade_core::frame::GrayFrame;
    use framegrade_core::io::MemorySource;

    fn report_for(frames: Vec<GrayFrame>) -> AggregateReport {
        Analyzer::new(AnalyzerConfig::default())
            .unwrap()
            .analyze_source(&mut MemorySource::new(frames))
            .unwrap()
    }

    #[test]
    fn weight_profiles_sum_to_one() {
        for profile in [WeightsArg::Balanced, WeightsArg::Person, WeightsArg::Scenery] {
            let sum: f64 = profile.weights().iter().map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{profile:?} sums to {sum}");
        }
    }

    #[test]
    fn flat_grey_weighted_scores() {
        // Sharpness and subject score 0; exposure, motion and noise score 1.
        let report = report_for(vec![GrayFrame::filled(8, 8, 128)]);
        assert_eq!(weighted_score(&report, WeightsArg::Balanced.weights()), Some(60));
        assert_eq!(weighted_score(&report, WeightsArg::Person.weights()), Some(85));
        assert_eq!(weighted_score(&report, WeightsArg::Scenery.weights()), Some(65));
    }

    #[test]
    fn missing_metric_gives_no_score() {
        let mut report = report_for(vec![GrayFrame::filled(8, 8, 128)]);
        report.mean.retain(|e| e.name != "noise");
        assert_eq!(weighted_score(&report, WeightsArg::Scenery.weights()), None);
    }
}
