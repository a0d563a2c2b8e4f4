//! # nebula-adaptive-pool
//!
//! Statistically adaptive free list for the Nebula workflow automation
//! ecosystem.
//!
//! A plain free list reuses whatever is returned to it, so a single huge
//! buffer can stay pinned in memory long after the burst that needed it. An
//! [`AdaptivePool`] instead keeps running statistics of the sizes of released
//! items and only reuses items that fit the observed distribution:
//! - [`OnlineStats`]: streaming mean and standard deviation, optionally
//!   biased towards recent samples
//! - [`SizePolicy`]: measures, creates and accepts items
//!   ([`NormalVec`], [`NormalBytes`])
//! - [`AdaptivePool`]: the free list itself, sizing new items from the
//!   latest statistics
//! - [`ReaderBufferer`]: reads whole streams into pooled buffers
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_adaptive_pool::prelude::*;
//!
//! // Keep buffers within 2 standard deviations of the mean length,
//! // weighting roughly the last 500 releases.
//! let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::with_config(
//!     NormalVec::new(2.0)?,
//!     AdaptivePoolConfig::seasonal(),
//! )?;
//!
//! {
//!     let mut buf = pool.checkout();
//!     buf.extend_from_slice(b"request body");
//!     // measured and returned to the pool when dropped
//! }
//!
//! assert_eq!(pool.stats().mean, 12.0);
//! # Ok::<(), PoolError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): Structured logging of pool decisions via `tracing`
//! - `serde`: Serialize/deserialize configuration and statistics snapshots

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod pool;
pub mod reader;
pub mod stats;

pub use crate::config::{AdaptivePoolConfig, FreeListConfig, NormalConfig};
pub use crate::error::{PoolError, PoolResult};
pub use crate::pool::{
    AdaptivePool, FreeList, NormalBytes, NormalVec, Pooled, QueueFreeList, SizePolicy,
};
pub use crate::reader::{BufferedReader, ReaderBufferer};
pub use crate::stats::{AtomicSnapshot, OnlineStats, StatsSnapshot};

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::{AdaptivePoolConfig, FreeListConfig, NormalConfig};
    pub use crate::error::{PoolError, PoolResult};
    pub use crate::pool::{
        AdaptivePool, FreeList, NormalBytes, NormalVec, Pooled, QueueFreeList, SizePolicy,
    };
    pub use crate::reader::{BufferedReader, ReaderBufferer};
    pub use crate::stats::{OnlineStats, StatsSnapshot};
}
