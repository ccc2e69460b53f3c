use serde::Serialize;
use tracing::debug;

use crate::quality::aggregate::Observation;
use crate::quality::MetricKind;

/// One metric's line in an [`AggregateReport`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricEntry {
    pub id: u32,
    pub name: &'static str,
    pub score: f64,
    pub raw: f64,
}

impl MetricEntry {
    pub fn new(kind: MetricKind, observation: Observation) -> Self {
        Self {
            id: kind.id(),
            name: kind.name(),
            score: observation.score,
            raw: observation.raw,
        }
    }

    pub fn kind(&self) -> Option<MetricKind> {
        MetricKind::from_name(self.name)
    }
}

/// Per-metric mean and worst statistics of one invocation.
///
/// `mean` and `worst` each hold `item_count` entries in metric order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateReport {
    pub item_count: usize,
    pub frames_processed: usize,
    pub mean: Vec<MetricEntry>,
    pub worst: Vec<MetricEntry>,
}

impl AggregateReport {
    pub fn mean_for(&self, kind: MetricKind) -> Option<&MetricEntry> {
        self.mean.iter().find(|e| e.id == kind.id())
    }

    pub fn worst_for(&self, kind: MetricKind) -> Option<&MetricEntry> {
        self.worst.iter().find(|e| e.id == kind.id())
    }
}

/// Diagnostics hook called by a run as it scores frames.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait FrameObserver: Send + Sync {
    /// One metric was computed for the frame at position `frame` of the run.
    fn on_metric(&self, _frame: usize, _kind: MetricKind, _observation: Observation) {}

    /// A frame was folded into the aggregates; `frames_done` counts it.
    fn on_frame(&self, _frames_done: usize) {}
}

/// Observer that ignores everything.
pub struct NoOpObserver;
impl FrameObserver for NoOpObserver {}

/// Observer that writes every metric observation to the debug log.
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn on_metric(&self, frame: usize, kind: MetricKind, observation: Observation) {
        debug!(
            frame,
            metric = kind.name(),
            score = observation.score,
            raw = observation.raw,
            "Frame metric"
        );
    }
}
