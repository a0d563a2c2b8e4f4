//! Published views of the pool statistics

use core::sync::atomic::{AtomicU64, Ordering};

use super::OnlineStats;

/// Copy of the pool statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    /// Effective number of observations
    pub n: f64,
    /// Number of released items measured since the last reset
    pub actual_n: f64,
    /// Mean item size
    pub mean: f64,
    /// Standard deviation of item sizes, NaN with less than 2 observations.
    /// Serialized as `null` while NaN.
    #[cfg_attr(feature = "serde", serde(with = "nan_as_null"))]
    pub std_dev: f64,
}

#[cfg(feature = "serde")]
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = if value.is_nan() { None } else { Some(*value) };
        value.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl From<&OnlineStats> for StatsSnapshot {
    fn from(stats: &OnlineStats) -> Self {
        Self {
            n: stats.n(),
            actual_n: stats.actual_n(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

/// Lock-free single-word publication of the latest `(mean, std_dev)` pair.
///
/// Both values are stored as `f32` halves of one `AtomicU64`, so a reader
/// always sees a pair written together. The pair may lag behind a concurrent
/// writer.
#[derive(Debug)]
pub struct AtomicSnapshot(AtomicU64);

impl AtomicSnapshot {
    /// Snapshot of empty statistics: mean 0, std dev NaN
    pub fn new() -> Self {
        Self(AtomicU64::new(encode(0.0, f32::NAN)))
    }

    /// Publish a new pair
    #[inline]
    pub fn store(&self, mean: f32, std_dev: f32) {
        self.0.store(encode(mean, std_dev), Ordering::Release);
    }

    /// Read the latest published pair
    #[inline]
    pub fn load(&self) -> (f32, f32) {
        decode(self.0.load(Ordering::Acquire))
    }
}

impl Default for AtomicSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn encode(lo: f32, hi: f32) -> u64 {
    u64::from(lo.to_bits()) | (u64::from(hi.to_bits()) << 32)
}

#[inline]
fn decode(word: u64) -> (f32, f32) {
    (
        f32::from_bits((word & u64::from(u32::MAX)) as u32),
        f32::from_bits((word >> 32) as u32),
    )
}
