/// Minimum pixel count (h*w) to fan the per-frame metrics out over Rayon.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Integer luma weight for the red channel (ITU-R BT.601, per mille).
pub const LUMA_WEIGHT_R: u32 = 299;

/// Integer luma weight for the green channel (ITU-R BT.601, per mille).
pub const LUMA_WEIGHT_G: u32 = 587;

/// Integer luma weight for the blue channel (ITU-R BT.601, per mille).
pub const LUMA_WEIGHT_B: u32 = 114;

/// Divisor applied to the weighted channel sum.
pub const LUMA_WEIGHT_SUM: u32 = 1000;

/// Pixels at or below this value count as crushed shadows.
pub const EXPOSURE_CLIP_LOW: u8 = 5;

/// Pixels at or above this value count as blown highlights.
pub const EXPOSURE_CLIP_HIGH: u8 = 250;

/// Added to the edge strength before dividing in the motion-blur ratio.
pub const MOTION_BLUR_EPSILON: f64 = 1e-5;

/// Full scale of an 8-bit sample, used to normalize intensity differences.
pub const SAMPLE_MAX: f64 = 255.0;

/// Frame cap of the decode-driven profile.
pub const DEFAULT_MAX_FRAMES: usize = 300;

/// Sampling rate of the decode-driven profile (frames per second).
pub const DEFAULT_SAMPLING_FPS: f32 = 5.0;

/// Frame cap of the resource-constrained profile.
pub const COMPACT_MAX_FRAMES: usize = 16;

/// Sampling rate of the resource-constrained profile.
pub const COMPACT_SAMPLING_FPS: f32 = 1.0;

/// A decoded frame is admitted when its timestamp is within this many
/// seconds of the next sample time.
pub const SAMPLE_TIME_TOLERANCE_S: f64 = 1e-6;

/// Fraction of each frame dimension covered by the centre subject region.
pub const DEFAULT_CENTER_REGION_SCALE: f32 = 0.6;

/// SER trailer timestamps are counted in 100 ns ticks.
pub const SER_TICKS_PER_SECOND: f64 = 10_000_000.0;
