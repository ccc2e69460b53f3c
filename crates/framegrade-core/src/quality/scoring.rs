use serde::{Deserialize, Serialize};

/// Raw-value anchors of the linear score mapping.
///
/// `good` maps to 1.0 and `bad` to 0.0. Either may be the larger value:
/// for metrics where a lower raw value is better, `good < bad`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub good: f64,
    pub bad: f64,
}

impl Threshold {
    pub const fn new(good: f64, bad: f64) -> Self {
        Self { good, bad }
    }

    /// A threshold with equal anchors cannot rank anything.
    pub fn is_degenerate(&self) -> bool {
        self.good == self.bad
    }

    pub fn is_finite(&self) -> bool {
        self.good.is_finite() && self.bad.is_finite()
    }
}

/// Map a raw metric value to a score in [0, 1], 1.0 being best.
///
/// Degenerate thresholds always score 0.
pub fn normalize(raw: f64, threshold: &Threshold) -> f64 {
    if threshold.is_degenerate() {
        return 0.0;
    }
    let t = (raw - threshold.bad) / (threshold.good - threshold.bad);
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}
