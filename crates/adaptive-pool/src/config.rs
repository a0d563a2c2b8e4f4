//! Configuration for adaptive pools and the reference size policies

use crate::error::{PoolError, PoolResult};

/// Default number of idle items a bounded free list keeps
pub const DEFAULT_FREE_LIST_CAPACITY: usize = 1024;

/// Adaptation window recommended for workloads that can tolerate it.
///
/// Values much lower than this make the statistics jumpy, values much higher
/// make the pool slow to follow seasonal changes. Around 100 is a reasonable
/// floor.
pub const RECOMMENDED_ADAPTATION_WINDOW: f64 = 500.0;

/// Storage strategy for idle items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FreeListConfig {
    /// Keep at most this many idle items, dropping the rest
    Bounded(usize),
    /// Keep every accepted item
    Unbounded,
}

impl Default for FreeListConfig {
    fn default() -> Self {
        Self::Bounded(DEFAULT_FREE_LIST_CAPACITY)
    }
}

/// Configuration for [`AdaptivePool`](crate::AdaptivePool)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdaptivePoolConfig {
    /// Cap on the effective sample count of the statistics.
    ///
    /// Values below 1 disable the cap. See
    /// [`OnlineStats::set_max_n`](crate::OnlineStats::set_max_n).
    pub adaptation_window: f64,

    /// How idle items are stored
    pub free_list: FreeListConfig,
}

impl Default for AdaptivePoolConfig {
    fn default() -> Self {
        Self {
            adaptation_window: 0.0,
            free_list: FreeListConfig::default(),
        }
    }
}

impl AdaptivePoolConfig {
    /// Configuration biased towards recent observations
    pub fn seasonal() -> Self {
        Self {
            adaptation_window: RECOMMENDED_ADAPTATION_WINDOW,
            ..Default::default()
        }
    }

    /// Set the adaptation window
    pub fn with_adaptation_window(mut self, window: f64) -> Self {
        self.adaptation_window = window;
        self
    }

    /// Set the free list strategy
    pub fn with_free_list(mut self, free_list: FreeListConfig) -> Self {
        self.free_list = free_list;
        self
    }

    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> PoolResult<()> {
        if !self.adaptation_window.is_finite() {
            return Err(PoolError::invalid_config(format!(
                "adaptation_window must be finite, got {}",
                self.adaptation_window
            )));
        }
        if self.free_list == FreeListConfig::Bounded(0) {
            return Err(PoolError::invalid_config(
                "bounded free list capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Parameters shared by the normal-distribution size policies
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalConfig {
    /// Width of the accepted band, in standard deviations
    pub threshold: f64,

    /// Smallest capacity a newly created item gets
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_size: usize,
}

impl NormalConfig {
    /// Create a configuration with no minimum size
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            min_size: 0,
        }
    }

    /// Set the minimum size of created items
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Validate policy configuration, returning an error if invalid.
    pub fn validate(&self) -> PoolResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(PoolError::invalid_config(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
