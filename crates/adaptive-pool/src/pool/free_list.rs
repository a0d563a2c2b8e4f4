//! Raw free lists storing idle items

use core::fmt;

use crossbeam_queue::{ArrayQueue, SegQueue};

use crate::config::FreeListConfig;
use crate::error::{PoolError, PoolResult};

/// Thread-safe storage for idle items.
///
/// A free list may drop released items at will (for example when full); the
/// adaptive pool tolerates that. Tests can substitute a deterministic fake.
pub trait FreeList<T>: Send + Sync {
    /// Take an idle item, or build one with `create` if there is none
    fn acquire_or_else<F>(&self, create: F) -> T
    where
        F: FnOnce() -> T;

    /// Store an item for later reuse
    fn release(&self, item: T);
}

enum Queue<T> {
    Bounded(ArrayQueue<T>),
    Unbounded(SegQueue<T>),
}

/// Lock-free free list on top of `crossbeam-queue`.
///
/// Bounded lists drop released items once full.
///
/// # Example
/// ```
/// use nebula_adaptive_pool::{FreeList, QueueFreeList};
///
/// let list = QueueFreeList::bounded(1).unwrap();
/// list.release(vec![1u8]);
/// list.release(vec![2u8]); // dropped, the list is full
///
/// assert_eq!(list.acquire_or_else(Vec::new), vec![1u8]);
/// assert_eq!(list.acquire_or_else(Vec::new), Vec::<u8>::new());
/// ```
pub struct QueueFreeList<T> {
    queue: Queue<T>,
}

impl<T> QueueFreeList<T> {
    /// Keep at most `capacity` idle items
    pub fn bounded(capacity: usize) -> PoolResult<Self> {
        if capacity == 0 {
            return Err(PoolError::invalid_config(
                "bounded free list capacity must be greater than 0",
            ));
        }
        Ok(Self {
            queue: Queue::Bounded(ArrayQueue::new(capacity)),
        })
    }

    /// Keep every released item
    pub fn unbounded() -> Self {
        Self {
            queue: Queue::Unbounded(SegQueue::new()),
        }
    }

    /// Build from configuration
    pub fn from_config(config: FreeListConfig) -> PoolResult<Self> {
        match config {
            FreeListConfig::Bounded(capacity) => Self::bounded(capacity),
            FreeListConfig::Unbounded => Ok(Self::unbounded()),
        }
    }

    /// Number of idle items
    pub fn idle(&self) -> usize {
        match &self.queue {
            Queue::Bounded(queue) => queue.len(),
            Queue::Unbounded(queue) => queue.len(),
        }
    }

    /// Whether there are no idle items
    pub fn is_empty(&self) -> bool {
        self.idle() == 0
    }

    /// Maximum number of idle items, `None` if unbounded
    pub fn capacity(&self) -> Option<usize> {
        match &self.queue {
            Queue::Bounded(queue) => Some(queue.capacity()),
            Queue::Unbounded(_) => None,
        }
    }
}

impl<T: Send> FreeList<T> for QueueFreeList<T> {
    fn acquire_or_else<F>(&self, create: F) -> T
    where
        F: FnOnce() -> T,
    {
        let idle = match &self.queue {
            Queue::Bounded(queue) => queue.pop(),
            Queue::Unbounded(queue) => queue.pop(),
        };
        idle.unwrap_or_else(create)
    }

    fn release(&self, item: T) {
        match &self.queue {
            Queue::Bounded(queue) => {
                // full: the item is dropped
                let _ = queue.push(item);
            },
            Queue::Unbounded(queue) => queue.push(item),
        }
    }
}

impl<T> fmt::Debug for QueueFreeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueFreeList")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity())
            .finish()
    }
}
