//! Size policies deciding how items are created and which ones are reused

use core::fmt;
use core::marker::PhantomData;

use bytes::BytesMut;

use crate::config::NormalConfig;
use crate::error::PoolResult;

/// Item type-specific operations and reuse policy for an
/// [`AdaptivePool`](super::AdaptivePool).
///
/// Implementations must handle `std_dev` being NaN, which means fewer than two
/// items have been measured.
///
/// # Example
/// ```
/// use nebula_adaptive_pool::SizePolicy;
///
/// /// Strings, kept only while shorter than a hard limit
/// struct ShortStrings;
///
/// impl SizePolicy<String> for ShortStrings {
///     fn size_of(&self, item: &String) -> f64 {
///         item.len() as f64
///     }
///
///     fn create(&self, mean: f64, _std_dev: f64) -> String {
///         String::with_capacity(mean as usize)
///     }
///
///     fn accept(&self, _mean: f64, _std_dev: f64, item_size: f64) -> bool {
///         item_size < 4096.0
///     }
/// }
/// ```
pub trait SizePolicy<T>: Send + Sync {
    /// Measure an item. The measurement feeds the pool statistics.
    fn size_of(&self, item: &T) -> f64;

    /// Create a new item, pre-sized from the current statistics
    fn create(&self, mean: f64, std_dev: f64) -> T;

    /// Whether an item of `item_size` should be kept for reuse rather than
    /// dropped.
    ///
    /// `mean` and `std_dev` are the values published for [`create`](Self::create),
    /// rounded to `f32` precision; `item_size` is exact.
    fn accept(&self, mean: f64, std_dev: f64, item_size: f64) -> bool;
}

/// Capacity for a new item under the normal-distribution assumption:
/// `mean + threshold * std_dev`, or `mean` when `std_dev` is NaN, never below
/// `min_size`.
pub fn normal_create_size(mean: f64, std_dev: f64, threshold: f64, min_size: usize) -> usize {
    let size = if std_dev.is_nan() {
        mean
    } else {
        threshold.mul_add(std_dev, mean)
    };
    // `as` saturates negatives and NaN to 0
    (size.round() as usize).max(min_size)
}

/// Whether `item_size` lies in the inclusive band `mean ± threshold * std_dev`.
/// Always true when `std_dev` is NaN.
pub fn normal_accept(mean: f64, std_dev: f64, threshold: f64, item_size: f64) -> bool {
    if std_dev.is_nan() {
        return true;
    }
    let spread = threshold * std_dev;
    mean - spread <= item_size && item_size <= mean + spread
}

/// Policy for `Vec<T>` items whose `len` follows a normal distribution
pub struct NormalVec<T> {
    config: NormalConfig,
    _item: PhantomData<fn() -> T>,
}

impl<T> NormalVec<T> {
    /// Create a policy accepting items within `threshold` standard deviations
    pub fn new(threshold: f64) -> PoolResult<Self> {
        Self::with_config(NormalConfig::new(threshold))
    }

    /// Create a policy from a full configuration
    pub fn with_config(config: NormalConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            _item: PhantomData,
        })
    }

    /// Set the minimum capacity of created vectors
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.config.min_size = min_size;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &NormalConfig {
        &self.config
    }
}

impl<T> SizePolicy<Vec<T>> for NormalVec<T> {
    fn size_of(&self, item: &Vec<T>) -> f64 {
        item.len() as f64
    }

    fn create(&self, mean: f64, std_dev: f64) -> Vec<T> {
        Vec::with_capacity(normal_create_size(
            mean,
            std_dev,
            self.config.threshold,
            self.config.min_size,
        ))
    }

    fn accept(&self, mean: f64, std_dev: f64, item_size: f64) -> bool {
        normal_accept(mean, std_dev, self.config.threshold, item_size)
    }
}

impl<T> Clone for NormalVec<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for NormalVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalVec").field("config", &self.config).finish()
    }
}

/// Policy for growable [`BytesMut`] buffers whose `len` follows a normal
/// distribution
#[derive(Debug, Clone)]
pub struct NormalBytes {
    config: NormalConfig,
}

impl NormalBytes {
    /// Create a policy accepting buffers within `threshold` standard deviations
    pub fn new(threshold: f64) -> PoolResult<Self> {
        Self::with_config(NormalConfig::new(threshold))
    }

    /// Create a policy from a full configuration
    pub fn with_config(config: NormalConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Set the minimum capacity of created buffers
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.config.min_size = min_size;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &NormalConfig {
        &self.config
    }
}

impl SizePolicy<BytesMut> for NormalBytes {
    fn size_of(&self, item: &BytesMut) -> f64 {
        item.len() as f64
    }

    fn create(&self, mean: f64, std_dev: f64) -> BytesMut {
        BytesMut::with_capacity(normal_create_size(
            mean,
            std_dev,
            self.config.threshold,
            self.config.min_size,
        ))
    }

    fn accept(&self, mean: f64, std_dev: f64, item_size: f64) -> bool {
        normal_accept(mean, std_dev, self.config.threshold, item_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_size() {
        assert_eq!(normal_create_size(42.0, f64::NAN, 0.0, 0), 42);
        assert_eq!(normal_create_size(42.0, f64::NAN, 7.0, 0), 42);
        assert_eq!(normal_create_size(42.0, 0.0, 3.0, 0), 42);
        assert_eq!(normal_create_size(3.0, 5.0, 7.0, 0), 38);
        assert_eq!(normal_create_size(15.0, 5.0, 1.0, 0), 20);
    }

    #[test]
    fn test_create_size_floor() {
        assert_eq!(normal_create_size(0.0, f64::NAN, 1.0, 512), 512);
        assert_eq!(normal_create_size(100.0, 10.0, 2.0, 64), 120);
        assert_eq!(normal_create_size(-4.0, 1.0, 1.0, 0), 0);
    }

    #[test]
    fn test_accept_band() {
        for size in 7..=13 {
            assert!(normal_accept(10.0, 3.0, 1.0, f64::from(size)), "size {size}");
        }
        assert!(!normal_accept(10.0, 3.0, 1.0, 6.99));
        assert!(!normal_accept(10.0, 3.0, 1.0, 13.01));
        assert!(!normal_accept(10.0, 3.0, 1.0, 0.0));
    }

    #[test]
    fn test_accept_without_history() {
        assert!(normal_accept(0.0, f64::NAN, 0.0, 0.0));
        assert!(normal_accept(10.0, f64::NAN, 1.0, 1_000_000.0));
    }

    #[test]
    fn test_zero_threshold_accepts_only_mean() {
        assert!(normal_accept(10.0, 3.0, 0.0, 10.0));
        assert!(!normal_accept(10.0, 3.0, 0.0, 10.5));
    }

    #[test]
    fn test_normal_vec() {
        let policy = NormalVec::<u32>::new(1.0).unwrap().with_min_size(4);
        let item = policy.create(15.0, 5.0);
        assert!(item.is_empty());
        assert!(item.capacity() >= 20);
        assert!(policy.create(0.0, f64::NAN).capacity() >= 4);
        assert_eq!(policy.size_of(&vec![0; 9]), 9.0);
        assert!(policy.accept(10.0, 3.0, 13.0));
        assert!(!policy.accept(10.0, 3.0, 14.0));
    }

    #[test]
    fn test_normal_bytes() {
        let policy = NormalBytes::new(2.5).unwrap();
        let buf = policy.create(100.0, 4.0);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 110);
        assert_eq!(policy.size_of(&BytesMut::from(&b"hello"[..])), 5.0);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(NormalVec::<u8>::new(-1.0).is_err());
        assert!(NormalBytes::new(-1.0).is_err());
    }
}
