use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FramegradeError, Result};
use crate::frame::{FrameMetadata, GrayFrame};

use super::source::{FrameSource, SourceInfo, TimeSampler};

/// Stream geometry reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoProbe {
    /// Display width, after applying any rotation metadata.
    pub width: u32,
    /// Display height, after applying any rotation metadata.
    pub height: u32,
    pub frame_rate: Option<f64>,
    pub duration_s: Option<f64>,
    pub frame_count: Option<u64>,
}

impl VideoProbe {
    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            path: path.to_path_buf(),
            kind: "video",
            width: Some(self.width),
            height: Some(self.height),
            total_frames: self.frame_count.map(|n| n as usize),
            frame_rate: self.frame_rate,
            duration_s: self.duration_s,
            detail: None,
        }
    }
}

/// Run `ffprobe` on the first video stream of `path`.
pub fn probe_video(path: &Path) -> Result<VideoProbe> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,duration,nb_frames:stream_side_data=rotation:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| FramegradeError::Decode(format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(FramegradeError::Decode(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let json: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| FramegradeError::Decode(format!("unreadable ffprobe output: {e}")))?;
    parse_probe(&json)
}

/// Extract geometry from `ffprobe -of json` output.
pub fn parse_probe(json: &Value) -> Result<VideoProbe> {
    let stream = json["streams"]
        .get(0)
        .ok_or_else(|| FramegradeError::Decode("no video stream found".into()))?;

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;
    if width == 0 || height == 0 {
        return Err(FramegradeError::InvalidDimensions { width, height });
    }

    let rotation = stream["side_data_list"]
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|sd| sd["rotation"].as_i64())
        .unwrap_or(0);
    let (width, height) = if rotation.rem_euclid(180) == 90 {
        (height, width)
    } else {
        (width, height)
    };

    let frame_rate = stream["r_frame_rate"].as_str().and_then(parse_rational);
    let duration_s = stream["duration"]
        .as_str()
        .or_else(|| json["format"]["duration"].as_str())
        .and_then(|s| s.parse::<f64>().ok());
    let frame_count = stream["nb_frames"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok());

    Ok(VideoProbe {
        width,
        height,
        frame_rate,
        duration_s,
        frame_count,
    })
}

/// Parse an ffmpeg rational such as `"30000/1001"`.
fn parse_rational(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then(|| num / den)
}

/// Presentation time of one `showinfo` log line, in seconds.
pub fn parse_showinfo_pts(line: &str) -> Option<f64> {
    if !line.contains("Parsed_showinfo") {
        return None;
    }
    let rest = &line[line.find("pts_time:")? + "pts_time:".len()..];
    rest.split_whitespace().next()?.parse().ok()
}

/// Fixed-size gray planes read back to back, each paired with the next
/// timestamp from `timestamps` and kept only if the sampler admits it.
pub(crate) struct RawGrayStream<R> {
    reader: R,
    timestamps: Receiver<f64>,
    width: usize,
    height: usize,
    sampler: TimeSampler,
    decoded: usize,
}

impl<R: Read> RawGrayStream<R> {
    pub(crate) fn new(
        reader: R,
        timestamps: Receiver<f64>,
        width: usize,
        height: usize,
        fps: f32,
    ) -> Self {
        Self {
            reader,
            timestamps,
            width,
            height,
            sampler: TimeSampler::new(fps),
            decoded: 0,
        }
    }

    /// Frames decoded so far, sampled or not.
    pub(crate) fn decoded(&self) -> usize {
        self.decoded
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        let frame_bytes = self.width * self.height;
        let mut buf = Vec::new();
        buf.try_reserve_exact(frame_bytes)
            .map_err(|_| FramegradeError::Alloc { bytes: frame_bytes })?;
        buf.resize(frame_bytes, 0);

        loop {
            match self.reader.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => {
                    return Err(FramegradeError::Decode(format!(
                        "reading ffmpeg output: {e}"
                    )))
                }
            }

            let index = self.decoded;
            self.decoded += 1;
            // A missing timestamp means the log stream ended early; such
            // frames are admitted like untimed stills.
            let pts = self.timestamps.recv().ok();
            if !self.sampler.admit(pts) {
                continue;
            }

            let frame = GrayFrame::from_raw(self.width, self.height, buf)?;
            return Ok(Some(frame.with_metadata(FrameMetadata {
                frame_index: index,
                timestamp_us: pts.map(|t| (t.max(0.0) * 1_000_000.0).round() as u64),
            })));
        }
    }
}

/// Decodes a video through an `ffmpeg` child process.
///
/// ffmpeg passes every decoded frame through unchanged in rate and converts
/// it to 8-bit gray; `showinfo` reports each frame's presentation time on
/// stderr, and frames are time-sampled here rather than resampled by ffmpeg.
pub struct FfmpegSource {
    path: PathBuf,
    child: Child,
    stream: RawGrayStream<BufReader<ChildStdout>>,
    log_reader: Option<JoinHandle<()>>,
    width: usize,
    height: usize,
    fps: f32,
    max_frames: usize,
    admitted: usize,
}

impl FfmpegSource {
    pub fn open(path: &Path, fps: f32, max_frames: usize) -> Result<Self> {
        let probe = probe_video(path)?;
        debug!(
            width = probe.width,
            height = probe.height,
            rate = ?probe.frame_rate,
            "Probed video stream"
        );

        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "info", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-an", "-vf", "showinfo"])
            .args(["-fps_mode", "passthrough"])
            .args(["-f", "rawvideo", "-pix_fmt", "gray", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FramegradeError::Decode(format!("failed to start ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FramegradeError::Decode("ffmpeg stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FramegradeError::Decode("ffmpeg stderr unavailable".into()))?;

        let (tx, rx) = mpsc::channel();
        let log_reader = thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                match parse_showinfo_pts(&line) {
                    Some(pts) => {
                        if tx.send(pts).is_err() {
                            break;
                        }
                    }
                    None if line.contains("Error") || line.contains("error") => {
                        warn!(line = %line, "ffmpeg reported an error");
                    }
                    None => {}
                }
            }
        });

        let (width, height) = (probe.width as usize, probe.height as usize);
        Ok(Self {
            path: path.to_path_buf(),
            child,
            stream: RawGrayStream::new(BufReader::new(stdout), rx, width, height, fps),
            log_reader: Some(log_reader),
            width,
            height,
            fps,
            max_frames,
            admitted: 0,
        })
    }
}

impl FrameSource for FfmpegSource {
    fn describe(&self) -> String {
        format!(
            "ffmpeg {} ({}x{}, sampled at {} fps)",
            self.path.display(),
            self.width,
            self.height,
            self.fps
        )
    }

    fn next_frame(&mut self) -> Result<Option<GrayFrame>> {
        if self.admitted >= self.max_frames {
            return Ok(None);
        }
        let frame = self.stream.next_frame()?;
        match frame {
            Some(_) => self.admitted += 1,
            None if self.stream.decoded() == 0 => {
                warn!(path = %self.path.display(), "ffmpeg produced no frames");
            }
            None => {}
        }
        Ok(frame)
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        // ffmpeg may still be decoding when the frame cap is reached.
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(handle) = self.log_reader.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_frame_rates() {
        assert_eq!(parse_rational("30/1"), Some(30.0));
        assert!((parse_rational("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_rational("0/0"), None);
        assert_eq!(parse_rational("25"), None);
    }

    #[test]
    fn probe_swaps_dimensions_for_portrait_rotation() {
        let json: Value = serde_json::json!({
            "streams": [{
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30/1",
                "nb_frames": "300",
                "side_data_list": [{ "rotation": -90 }]
            }],
            "format": { "duration": "10.000000" }
        });
        let probe = parse_probe(&json).unwrap();
        assert_eq!((probe.width, probe.height), (1080, 1920));
        assert_eq!(probe.frame_rate, Some(30.0));
        assert_eq!(probe.duration_s, Some(10.0));
        assert_eq!(probe.frame_count, Some(300));
    }

    #[test]
    fn showinfo_lines_yield_pts() {
        let line = "[Parsed_showinfo_0 @ 0x55d0c8a1b2c0] n:   3 pts:  12288 pt:  12288 \
                    pts_time:0.96    duration:  512 fmt:yuv420p";
        assert_eq!(parse_showinfo_pts(line), Some(0.96));
        assert_eq!(parse_showinfo_pts("[Parsed_showinfo_0 @ 0x1] config in time_base: 1/12800"), None);
        assert_eq!(parse_showinfo_pts("frame=  10 fps=0.0 q=-0.0 size=N/A time=00:00:00.40"), None);
    }

    fn raw_stream(times: &[f64], fps: f32) -> RawGrayStream<std::io::Cursor<Vec<u8>>> {
        let planes: Vec<u8> = (0..times.len()).flat_map(|i| vec![i as u8; 4]).collect();
        let (tx, rx) = mpsc::channel();
        for t in times {
            tx.send(*t).unwrap();
        }
        RawGrayStream::new(std::io::Cursor::new(planes), rx, 2, 2, fps)
    }

    fn drain(stream: &mut RawGrayStream<std::io::Cursor<Vec<u8>>>) -> Vec<GrayFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = stream.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn slow_source_is_not_padded_with_duplicates() {
        // A 2 fps timelapse sampled at 5 fps keeps each real frame once.
        let mut stream = raw_stream(&[0.0, 0.5, 1.0, 1.5, 2.0], 5.0);
        let frames = drain(&mut stream);
        let indices: Vec<usize> = frames.iter().map(|f| f.metadata.frame_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(frames[3].metadata.timestamp_us, Some(1_500_000));
        assert_eq!(frames[3].data[[0, 0]], 3);
    }

    #[test]
    fn fast_source_is_sampled_by_pts() {
        let times: Vec<f64> = (0..10).map(|i| i as f64 / 30.0).collect();
        let mut stream = raw_stream(&times, 10.0);
        let frames = drain(&mut stream);
        let indices: Vec<usize> = frames.iter().map(|f| f.metadata.frame_index).collect();
        assert_eq!(indices, vec![0, 3, 6, 9]);
        assert_eq!(frames[1].data[[1, 1]], 3);
        assert_eq!(stream.decoded(), 10);
    }

    #[test]
    fn frames_without_pts_are_kept() {
        let mut stream = raw_stream(&[0.0], 1.0);
        // Second plane has no timestamp: the log ended early.
        stream.reader.get_mut().extend_from_slice(&[7u8; 4]);
        let frames = drain(&mut stream);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].metadata.timestamp_us, None);
    }

    #[test]
    fn probe_without_streams_is_a_decode_error() {
        let json: Value = serde_json::json!({ "streams": [] });
        let err = parse_probe(&json).unwrap_err();
        assert!(matches!(err, FramegradeError::Decode(_)));
    }
}
