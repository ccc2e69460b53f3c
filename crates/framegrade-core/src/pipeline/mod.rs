pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{Analyzer, MetricDefinition, Run};
pub use types::{AggregateReport, FrameObserver, MetricEntry, NoOpObserver, TracingObserver};
