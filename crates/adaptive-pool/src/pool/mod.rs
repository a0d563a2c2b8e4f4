//! Adaptive object pooling
//!
//! This module composes the pieces of an adaptive free list:
//! - `SizePolicy`: measures, creates and accepts items (`NormalVec`, `NormalBytes`)
//! - `FreeList`: raw storage of idle items (`QueueFreeList`)
//! - `AdaptivePool`: updates size statistics on every release and asks the
//!   policy whether to keep the item
//! - `Pooled`: RAII checkout returning the item on drop
//!
//! # Concurrency
//!
//! The statistics are guarded by a mutex held only for one
//! [`OnlineStats::push`] plus publishing the new `(mean, std_dev)` pair to an
//! [`AtomicSnapshot`]. Policy calls and free list operations run outside the
//! lock, and `acquire` never locks. Concurrent releases are serialized in lock
//! acquisition order, so statistics are not reproducible bit-for-bit across
//! multi-threaded runs, only up to floating point error.

mod free_list;
mod guard;
mod policy;

use core::fmt;
use core::marker::PhantomData;

use parking_lot::Mutex;
#[cfg(feature = "logging")]
use tracing::{debug, trace};

pub use free_list::{FreeList, QueueFreeList};
pub use guard::Pooled;
pub use policy::{NormalBytes, NormalVec, SizePolicy, normal_accept, normal_create_size};

use crate::config::AdaptivePoolConfig;
use crate::error::PoolResult;
use crate::stats::{AtomicSnapshot, OnlineStats, StatsSnapshot};

/// Free list that decides, for every released item, whether to keep it for
/// reuse based on running statistics of item sizes.
///
/// Statistics are updated on each [`release`](Self::release), whether or not
/// the item is kept. As with any free list, the pool can be seeded by
/// releasing items into it, which seeds the statistics too.
///
/// # Example
/// ```
/// use nebula_adaptive_pool::{AdaptivePool, NormalVec};
///
/// let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::new(NormalVec::new(2.0)?)?;
///
/// let mut buf = pool.acquire();
/// buf.extend_from_slice(b"payload");
/// pool.release(buf);
///
/// let stats = pool.stats();
/// assert_eq!(stats.n, 1.0);
/// assert_eq!(stats.mean, 7.0);
/// # Ok::<(), nebula_adaptive_pool::PoolError>(())
/// ```
pub struct AdaptivePool<T, P, L = QueueFreeList<T>>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    free_list: L,
    policy: P,
    // lock-free read side, f32 mean and std dev packed in one word
    snapshot: AtomicSnapshot,
    stats: Mutex<OnlineStats>,
    _item: PhantomData<fn(T) -> T>,
}

impl<T, P> AdaptivePool<T, P>
where
    T: Send,
    P: SizePolicy<T>,
{
    /// Create a pool with the default configuration
    pub fn new(policy: P) -> PoolResult<Self> {
        Self::with_config(policy, AdaptivePoolConfig::default())
    }

    /// Create a pool with a custom configuration
    pub fn with_config(policy: P, config: AdaptivePoolConfig) -> PoolResult<Self> {
        config.validate()?;
        let free_list = QueueFreeList::from_config(config.free_list)?;
        Ok(Self::with_free_list(
            policy,
            free_list,
            config.adaptation_window,
        ))
    }
}

impl<T, P, L> AdaptivePool<T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    /// Create a pool over a caller-supplied free list.
    ///
    /// See [`OnlineStats::set_max_n`] for `adaptation_window`.
    pub fn with_free_list(policy: P, free_list: L, adaptation_window: f64) -> Self {
        let stats = OnlineStats::with_max_n(adaptation_window);

        #[cfg(feature = "logging")]
        debug!(
            item = core::any::type_name::<T>(),
            policy = core::any::type_name::<P>(),
            free_list = core::any::type_name::<L>(),
            adaptation_window = stats.max_n(),
            "created adaptive pool"
        );

        Self {
            free_list,
            policy,
            snapshot: AtomicSnapshot::new(),
            stats: Mutex::new(stats),
            _item: PhantomData,
        }
    }

    /// Get an idle item, or create one sized from the latest statistics.
    ///
    /// Never blocks on the statistics lock.
    pub fn acquire(&self) -> T {
        self.free_list.acquire_or_else(|| self.fabricate())
    }

    /// Get an item that is released back to the pool when dropped
    pub fn checkout(&self) -> Pooled<'_, T, P, L> {
        Pooled::new(self.acquire(), self)
    }

    /// Measure an item, update the statistics with it, and keep it for reuse
    /// if the policy accepts it. Otherwise the item is dropped.
    ///
    /// `None` is a no-op.
    ///
    /// The policy sees the mean and std dev at `f32` precision. Sizes above
    /// 2^24 are not exactly representable there, so a constant stream of
    /// such items gets a zero-width band that excludes their own size.
    pub fn release(&self, item: impl Into<Option<T>>) {
        let Some(item) = item.into() else {
            return;
        };

        let size = self.policy.size_of(&item);
        let (mean, std_dev) = self.push_and_publish(size);
        let accepted = self.policy.accept(mean, std_dev, size);

        #[cfg(feature = "logging")]
        trace!(size, mean, std_dev, accepted, "released pool item");

        if accepted {
            self.free_list.release(item);
        }
    }

    /// Copy of the current statistics, at full precision
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::from(&*self.stats.lock())
    }

    /// Forget all observed sizes, keeping the adaptation window
    pub fn reset_stats(&self) {
        let mut stats = self.stats.lock();
        let window = stats.max_n();
        stats.reset();
        stats.set_max_n(window);
        self.publish(&stats);

        #[cfg(feature = "logging")]
        debug!(adaptation_window = window, "reset adaptive pool statistics");
    }

    /// Change the adaptation window. Values below 1 disable it.
    pub fn set_adaptation_window(&self, window: f64) {
        let mut stats = self.stats.lock();
        stats.set_max_n(window);
        self.publish(&stats);

        #[cfg(feature = "logging")]
        debug!(
            adaptation_window = stats.max_n(),
            n = stats.n(),
            "changed adaptation window"
        );
    }

    /// Current adaptation window, 0 if disabled
    pub fn adaptation_window(&self) -> f64 {
        self.stats.lock().max_n()
    }

    /// The size policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The underlying free list
    pub fn free_list(&self) -> &L {
        &self.free_list
    }

    /// Returns the published pair at the reduced precision used by
    /// [`SizePolicy::create`], so accept and create decisions agree.
    fn push_and_publish(&self, size: f64) -> (f64, f64) {
        let mut stats = self.stats.lock();
        stats.push(size);
        let (mean, std_dev) = self.publish(&stats);
        (f64::from(mean), f64::from(std_dev))
    }

    // must be called with the stats lock held
    fn publish(&self, stats: &OnlineStats) -> (f32, f32) {
        let mean = stats.mean() as f32;
        let std_dev = stats.std_dev() as f32;
        self.snapshot.store(mean, std_dev);
        (mean, std_dev)
    }

    fn fabricate(&self) -> T {
        let (mean, std_dev) = self.snapshot.load();

        #[cfg(feature = "logging")]
        trace!(mean, std_dev, "creating pool item");

        self.policy.create(f64::from(mean), f64::from(std_dev))
    }
}

impl<T, P, L> fmt::Debug for AdaptivePool<T, P, L>
where
    P: SizePolicy<T> + fmt::Debug,
    L: FreeList<T> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptivePool")
            .field("policy", &self.policy)
            .field("free_list", &self.free_list)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::FreeListConfig;

    /// Always creates, counts releases and drops them
    #[derive(Default)]
    struct CountingFreeList {
        releases: AtomicUsize,
    }

    impl<T> FreeList<T> for CountingFreeList {
        fn acquire_or_else<F: FnOnce() -> T>(&self, create: F) -> T {
            create()
        }

        fn release(&self, _item: T) {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn counting_pool(threshold: f64) -> AdaptivePool<Vec<u8>, NormalVec<u8>, CountingFreeList> {
        AdaptivePool::with_free_list(
            NormalVec::new(threshold).unwrap(),
            CountingFreeList::default(),
            0.0,
        )
    }

    #[test]
    fn test_fresh_pool() {
        let pool = counting_pool(1.0);
        let stats = pool.stats();
        assert_eq!(stats.n, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert!(stats.std_dev.is_nan());
        assert_eq!(pool.acquire().capacity(), 0);
    }

    #[test]
    fn test_first_release_is_accepted() {
        let pool = counting_pool(1.0);
        pool.release(vec![0u8; 10]);
        assert_eq!(pool.free_list().releases.load(Ordering::Relaxed), 1);
        assert!(pool.acquire().capacity() >= 10);
    }

    #[test]
    fn test_outlier_dropped() {
        let pool = counting_pool(1.0);
        for _ in 0..10 {
            pool.release(vec![0u8; 100]);
        }
        let before = pool.free_list().releases.load(Ordering::Relaxed);
        pool.release(vec![0u8; 5000]);
        assert_eq!(pool.free_list().releases.load(Ordering::Relaxed), before);
        assert_eq!(pool.stats().actual_n, 11.0);
    }

    #[test]
    fn test_sizes_beyond_f32_precision_are_dropped() {
        let pool = counting_pool(1.0);
        let size = (1 << 24) + 1;
        for _ in 0..3 {
            pool.release(vec![0u8; size]);
        }
        // only the first release, judged without a std dev, is kept
        assert_eq!(pool.free_list().releases.load(Ordering::Relaxed), 1);
        let stats = pool.stats();
        assert_eq!(stats.mean, size as f64);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_none_is_noop() {
        let pool = counting_pool(1.0);
        pool.release(None::<Vec<u8>>);
        assert_eq!(pool.stats().n, 0.0);
        assert_eq!(pool.free_list().releases.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_checkout_releases_on_drop() {
        let pool = counting_pool(1.0);
        {
            let mut buf = pool.checkout();
            buf.extend_from_slice(b"abc");
            assert_eq!(buf.as_ref().len(), 3);
        }
        assert_eq!(pool.stats().mean, 3.0);
        assert_eq!(pool.free_list().releases.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_pooled_accessors() {
        let pool = counting_pool(1.0);
        let mut buf = pool.checkout();
        buf.as_mut().push(1);
        buf.push(2);
        assert_eq!(*buf, vec![1, 2]);
        assert_eq!(buf.as_ref(), &vec![1, 2]);
        assert!(core::ptr::eq(buf.pool(), &pool));
        assert_eq!(format!("{buf:?}"), "Pooled(Some([1, 2]))");
        drop(buf);
        assert_eq!(pool.stats().mean, 2.0);
    }

    #[test]
    fn test_detach_skips_release() {
        let pool = counting_pool(1.0);
        let mut buf = pool.checkout();
        buf.push(1);
        let owned = buf.detach();
        assert_eq!(owned, vec![1]);
        assert_eq!(pool.stats().n, 0.0);
    }

    #[test]
    fn test_reset_keeps_window() {
        let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::with_config(
            NormalVec::new(1.0).unwrap(),
            AdaptivePoolConfig::default().with_adaptation_window(3.0),
        )
        .unwrap();
        for size in [4, 8, 12, 16] {
            pool.release(vec![0u8; size]);
        }
        assert_eq!(pool.stats().n, 3.0);

        pool.reset_stats();
        let stats = pool.stats();
        assert_eq!(stats.n, 0.0);
        assert!(stats.std_dev.is_nan());
        assert_eq!(pool.adaptation_window(), 3.0);
    }

    #[test]
    fn test_set_adaptation_window_truncates() {
        let pool = counting_pool(1.0);
        for _ in 0..10 {
            pool.release(vec![0u8; 8]);
        }
        pool.set_adaptation_window(4.0);
        assert_eq!(pool.stats().n, 4.0);
        assert_eq!(pool.adaptation_window(), 4.0);

        pool.set_adaptation_window(0.0);
        assert_eq!(pool.adaptation_window(), 0.0);
    }

    #[test]
    fn test_queue_backed_pool_reuses_items() {
        let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::with_config(
            NormalVec::new(1.0).unwrap(),
            AdaptivePoolConfig::default().with_free_list(FreeListConfig::Bounded(4)),
        )
        .unwrap();
        let mut buf = pool.acquire();
        buf.extend_from_slice(&[7; 32]);
        let ptr = buf.as_ptr();
        pool.release(buf);

        assert_eq!(pool.free_list().idle(), 1);
        let reused = pool.acquire();
        assert_eq!(reused.as_ptr(), ptr);
        assert!(pool.free_list().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result: PoolResult<AdaptivePool<Vec<u8>, _>> = AdaptivePool::with_config(
            NormalVec::new(1.0).unwrap(),
            AdaptivePoolConfig::default().with_adaptation_window(f64::INFINITY),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_output() {
        let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::new(NormalVec::new(1.0).unwrap()).unwrap();
        let debug = format!("{pool:?}");
        assert!(debug.contains("AdaptivePool"));
        assert!(debug.contains("NormalVec"));
    }
}
