/// One (score, raw) pair reported for a metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub score: f64,
    pub raw: f64,
}

/// Running mean and worst observation of one metric across a sequence.
#[derive(Clone, Debug, Default)]
pub struct MetricAggregate {
    sum_raw: f64,
    sum_score: f64,
    min_score: f64,
    raw_at_min_score: f64,
    count: usize,
}

impl MetricAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame's observation in.
    ///
    /// The worst entry only moves on a strictly lower score, so among equal
    /// minima the earliest frame wins.
    pub fn update(&mut self, raw: f64, score: f64) {
        self.sum_raw += raw;
        self.sum_score += score;
        if self.count == 0 || score < self.min_score {
            self.min_score = score;
            self.raw_at_min_score = raw;
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean score and mean raw value, `None` before any observation.
    pub fn mean(&self) -> Option<Observation> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Observation {
            score: self.sum_score / n,
            raw: self.sum_raw / n,
        })
    }

    /// Lowest-scoring observation, `None` before any observation.
    pub fn worst(&self) -> Option<Observation> {
        if self.count == 0 {
            return None;
        }
        Some(Observation {
            score: self.min_score,
            raw: self.raw_at_min_score,
        })
    }
}
