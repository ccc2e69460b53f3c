use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::color::to_gray_reusing;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::detection::{NoSubjectDetector, SubjectDetector};
use crate::error::{ErrorKind, FramegradeError, Result};
use crate::filters::resize::downscale_to_fit;
use crate::frame::{GrayFrame, InputFrame};
use crate::io::source::{open_source, FrameSource};
use crate::quality::aggregate::{MetricAggregate, Observation};
use crate::quality::scoring::{normalize, Threshold};
use crate::quality::{MetricInput, MetricKind};

use super::config::AnalyzerConfig;
use super::types::{AggregateReport, FrameObserver, MetricEntry, TracingObserver};

/// A registered metric: what to compute and how to score it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricDefinition {
    pub kind: MetricKind,
    pub threshold: Threshold,
}

/// Scores frame sequences against a fixed configuration.
///
/// An analyzer holds no per-invocation state, so one instance can serve any
/// number of runs, including concurrent ones.
pub struct Analyzer {
    config: AnalyzerConfig,
    metrics: Vec<MetricDefinition>,
    detector: Arc<dyn SubjectDetector>,
    observers: Vec<Arc<dyn FrameObserver>>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let metrics = MetricKind::ALL
            .into_iter()
            .map(|kind| MetricDefinition {
                kind,
                threshold: config.thresholds.get(kind),
            })
            .collect();

        let mut observers: Vec<Arc<dyn FrameObserver>> = Vec::new();
        if config.log_frame_details {
            observers.push(Arc::new(TracingObserver));
        }

        Ok(Self {
            config,
            metrics,
            detector: Arc::new(NoSubjectDetector),
            observers,
        })
    }

    pub fn with_detector(mut self, detector: Arc<dyn SubjectDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Register an additional observer.
    ///
    /// Observers are called in registration order. The debug-log observer
    /// enabled by `log_frame_details` stays active alongside any added here.
    pub fn with_observer(mut self, observer: Arc<dyn FrameObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    /// Begin a new invocation with fresh aggregates.
    pub fn start(&self) -> Run<'_> {
        Run {
            analyzer: self,
            aggregates: vec![MetricAggregate::new(); self.metrics.len()],
            previous: None,
            spare: Vec::new(),
            admitted: 0,
            failed: false,
        }
    }

    /// Score a caller-supplied array of frames.
    ///
    /// At most `max_frames` frames are processed, in array order.
    pub fn analyze_frames(&self, frames: &[InputFrame<'_>]) -> Result<AggregateReport> {
        if frames.is_empty() {
            return Err(FramegradeError::InvalidArgument(
                "no input frames supplied".into(),
            ));
        }
        let to_process = frames.len().min(self.config.max_frames);
        if to_process == 0 {
            return Err(FramegradeError::InvalidArgument(format!(
                "frame budget is zero (max_frames = {})",
                self.config.max_frames
            )));
        }

        info!(
            frames = to_process,
            available = frames.len(),
            "Analyzing frame array"
        );

        let mut run = self.start();
        for frame in &frames[..to_process] {
            run.push_input(frame)?;
        }
        run.finish()
    }

    /// Score frames pulled from a source until it ends or the frame cap is hit.
    ///
    /// A source that fails after delivering at least one frame is treated as
    /// a short sequence; the report covers the frames seen so far.
    pub fn analyze_source(&self, source: &mut dyn FrameSource) -> Result<AggregateReport> {
        info!(
            source = %source.describe(),
            max_frames = self.config.max_frames,
            fps = self.config.effective_fps(),
            "Analyzing frame source"
        );

        let mut run = self.start();
        while !run.is_full() {
            match source.next_frame() {
                Ok(Some(frame)) => run.push_gray(frame)?,
                Ok(None) => break,
                Err(e) if run.frames_processed() > 0 => {
                    warn!(
                        error = %e,
                        frames = run.frames_processed(),
                        "Frame source failed, scoring frames seen so far"
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        run.finish()
    }

    /// Open `path` with the matching frame source and score it.
    pub fn analyze_path(&self, path: &Path) -> Result<AggregateReport> {
        let mut source = open_source(path, &self.config)?;
        self.analyze_source(source.as_mut())
    }
}

/// One in-progress invocation of an [`Analyzer`].
///
/// Frames must be pushed in source order. The run owns its aggregates and
/// the previous frame; nothing is shared with other runs.
pub struct Run<'a> {
    analyzer: &'a Analyzer,
    aggregates: Vec<MetricAggregate>,
    previous: Option<GrayFrame>,
    /// Sample buffer of the frame before `previous`, recycled for the next
    /// adapted frame.
    spare: Vec<u8>,
    admitted: usize,
    failed: bool,
}

impl Run<'_> {
    /// Number of frames folded into the aggregates so far.
    pub fn frames_processed(&self) -> usize {
        self.admitted
    }

    /// Whether the configured frame cap has been reached.
    pub fn is_full(&self) -> bool {
        self.admitted >= self.analyzer.config.max_frames
    }

    /// Adapt a caller-owned frame to grayscale and score it.
    pub fn push_input(&mut self, input: &InputFrame<'_>) -> Result<()> {
        self.check_open()?;
        let buffer = std::mem::take(&mut self.spare);
        let frame = match to_gray_reusing(input, buffer) {
            Ok(frame) => frame,
            Err(e) if e.kind() == ErrorKind::Alloc => {
                self.failed = true;
                return Err(e);
            }
            Err(e) => {
                self.failed = true;
                return Err(FramegradeError::Unsupported(format!(
                    "frame {}: {e}",
                    self.admitted
                )));
            }
        };
        self.process(frame);
        Ok(())
    }

    /// Score a frame that is already in canonical form.
    pub fn push_gray(&mut self, frame: GrayFrame) -> Result<()> {
        self.check_open()?;
        if frame.width() == 0 || frame.height() == 0 {
            self.failed = true;
            return Err(FramegradeError::Unsupported(format!(
                "frame {}: empty {}x{} frame",
                self.admitted,
                frame.width(),
                frame.height()
            )));
        }
        self.process(frame);
        Ok(())
    }

    /// Close the run and produce its report.
    pub fn finish(self) -> Result<AggregateReport> {
        if self.failed {
            return Err(FramegradeError::InvalidArgument(
                "run was aborted by an earlier failure".into(),
            ));
        }
        if self.admitted == 0 {
            return Err(FramegradeError::Decode("no frames were processed".into()));
        }

        let metrics = &self.analyzer.metrics;
        let mut mean = Vec::with_capacity(metrics.len());
        let mut worst = Vec::with_capacity(metrics.len());
        for (metric, aggregate) in metrics.iter().zip(&self.aggregates) {
            if let (Some(m), Some(w)) = (aggregate.mean(), aggregate.worst()) {
                mean.push(MetricEntry::new(metric.kind, m));
                worst.push(MetricEntry::new(metric.kind, w));
            }
        }

        info!(frames = self.admitted, "Analysis complete");
        Ok(AggregateReport {
            item_count: mean.len(),
            frames_processed: self.admitted,
            mean,
            worst,
        })
    }

    fn check_open(&self) -> Result<()> {
        if self.failed {
            return Err(FramegradeError::InvalidArgument(
                "run was aborted by an earlier failure".into(),
            ));
        }
        if self.is_full() {
            return Err(FramegradeError::InvalidArgument(format!(
                "frame budget of {} exhausted",
                self.analyzer.config.max_frames
            )));
        }
        Ok(())
    }

    fn process(&mut self, frame: GrayFrame) {
        let analyzer = self.analyzer;
        let norm = &analyzer.config.normalize;
        let frame = if norm.is_enabled() {
            downscale_to_fit(&frame, norm).unwrap_or(frame)
        } else {
            frame
        };

        let regions = analyzer.detector.detect(&frame);
        let input = MetricInput {
            frame: &frame,
            previous: self.previous.as_ref(),
            regions: &regions,
        };

        let raws: Vec<f64> = if frame.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
            analyzer
                .metrics
                .par_iter()
                .map(|m| m.kind.compute(&input))
                .collect()
        } else {
            analyzer.metrics.iter().map(|m| m.kind.compute(&input)).collect()
        };

        for ((metric, aggregate), raw) in analyzer.metrics.iter().zip(&mut self.aggregates).zip(raws) {
            let score = normalize(raw, &metric.threshold);
            aggregate.update(raw, score);
            let observation = Observation { score, raw };
            for observer in &analyzer.observers {
                observer.on_metric(self.admitted, metric.kind, observation);
            }
        }

        self.admitted += 1;
        for observer in &analyzer.observers {
            observer.on_frame(self.admitted);
        }

        if let Some(old) = self.previous.replace(frame) {
            self.spare = old.into_samples();
        }
    }
}
