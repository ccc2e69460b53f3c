pub mod ffmpeg;
pub mod image_seq;
pub mod ser;
pub mod source;

pub use source::{open_source, probe_source, FrameSource, MemorySource, SourceInfo, TimeSampler};
