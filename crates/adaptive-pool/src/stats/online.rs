//! Streaming mean and standard deviation

/// Streaming estimator of the mean and (population) standard deviation of a
/// sequence of values, computed without storing the values.
///
/// The estimator can cap its effective sample count with
/// [`set_max_n`](Self::set_max_n). Once the cap is reached every new value
/// weighs `1 / max_n`, so older values fade out exponentially. This keeps the
/// estimate following seasonal changes in the data instead of settling on the
/// whole history.
///
/// # Example
/// ```
/// use nebula_adaptive_pool::OnlineStats;
///
/// let mut stats = OnlineStats::new();
/// stats.push(10.0);
/// assert_eq!(stats.mean(), 10.0);
/// assert!(stats.std_dev().is_nan()); // not enough data yet
///
/// stats.push(20.0);
/// assert_eq!(stats.mean(), 15.0);
/// assert_eq!(stats.std_dev(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnlineStats {
    n: f64,
    actual_n: f64,
    max_n: f64,
    mean: f64,
    sum_sq: f64,
}

impl OnlineStats {
    /// Create an empty estimator with the cap disabled
    pub const fn new() -> Self {
        Self {
            n: 0.0,
            actual_n: 0.0,
            max_n: 0.0,
            mean: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Create an empty estimator capped at `max_n`
    pub fn with_max_n(max_n: f64) -> Self {
        let mut stats = Self::new();
        stats.set_max_n(max_n);
        stats
    }

    /// Add a value to the sample
    pub fn push(&mut self, value: f64) {
        let saturated = self.max_n >= 1.0 && self.n >= self.max_n;
        if !saturated {
            self.n += 1.0;
        }
        self.actual_n += 1.0;

        if self.actual_n > 1.0 {
            let old_mean = self.mean;
            let mean = old_mean.mul_add(self.n - 1.0, value) / self.n;
            if saturated {
                // the oldest share of the weight leaves the window
                self.sum_sq *= (self.n - 1.0) / self.n;
            }
            // both deltas share a sign, abs keeps rounding from going negative
            self.sum_sq = (value - old_mean)
                .abs()
                .mul_add((value - mean).abs(), self.sum_sq);
            self.mean = mean;
        } else {
            self.mean = value;
        }
    }

    /// Clear all the data, including the cap
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Effective number of observations, never above [`max_n`](Self::max_n)
    /// while the cap is enabled
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Number of values pushed since construction or the last reset
    pub fn actual_n(&self) -> f64 {
        self.actual_n
    }

    /// Cap on [`n`](Self::n), or 0 if disabled
    pub fn max_n(&self) -> f64 {
        self.max_n.round()
    }

    /// Prevent [`n`](Self::n) from growing beyond `max_n`.
    ///
    /// Values below 1 (and NaN) disable the cap, others are rounded to the
    /// nearest integer. If `n` is already above the new cap it is lowered to
    /// it immediately, leaving the mean and std dev unchanged.
    pub fn set_max_n(&mut self, max_n: f64) {
        self.max_n = if max_n >= 1.0 { max_n.round() } else { 0.0 };
        if self.max_n >= 1.0 && self.n > self.max_n {
            // keep sum_sq / n, and so the std dev, unchanged
            self.sum_sq *= self.max_n / self.n;
            self.n = self.max_n;
        }
    }

    /// Arithmetic mean of the pushed values, 0 if there are none
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the pushed values.
    ///
    /// NaN if less than 2 values were pushed. All-equal values give 0.
    pub fn std_dev(&self) -> f64 {
        if self.actual_n > 1.0 {
            (self.sum_sq / self.n).sqrt()
        } else {
            f64::NAN
        }
    }
}
