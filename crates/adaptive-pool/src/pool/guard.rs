//! RAII checkout of pooled items

use core::fmt;
use core::ops::{Deref, DerefMut};

use super::{AdaptivePool, FreeList, SizePolicy};

/// Item checked out of an [`AdaptivePool`], released back when dropped
pub struct Pooled<'a, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    // Some until dropped or detached
    item: Option<T>,
    pool: &'a AdaptivePool<T, P, L>,
}

impl<'a, T, P, L> Pooled<'a, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    pub(super) fn new(item: T, pool: &'a AdaptivePool<T, P, L>) -> Self {
        Self {
            item: Some(item),
            pool,
        }
    }

    /// Detach the item from the pool; it will not be measured or reused
    pub fn detach(mut self) -> T {
        match self.item.take() {
            Some(item) => item,
            None => taken(),
        }
    }

    /// Pool the item came from
    pub fn pool(&self) -> &AdaptivePool<T, P, L> {
        self.pool
    }
}

// `item` is only emptied by `detach` and `drop`, which consume the guard
#[cold]
fn taken() -> ! {
    unreachable!("pooled item taken before drop")
}

impl<T, P, L> Deref for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().unwrap_or_else(|| taken())
    }
}

impl<T, P, L> DerefMut for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| taken())
    }
}

impl<T, P, L> AsRef<T> for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T, P, L> AsMut<T> for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<T, P, L> Drop for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    fn drop(&mut self) {
        self.pool.release(self.item.take());
    }
}

impl<T: fmt::Debug, P, L> fmt::Debug for Pooled<'_, T, P, L>
where
    P: SizePolicy<T>,
    L: FreeList<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.item).finish()
    }
}
