//! Size statistics for adaptive pools
//!
//! - `OnlineStats`: streaming mean/std dev with an optional adaptation window
//! - `StatsSnapshot`: full-precision copy for monitoring
//! - `AtomicSnapshot`: reduced-precision pair read without locking

mod online;
mod snapshot;

pub use online::OnlineStats;
pub use snapshot::{AtomicSnapshot, StatsSnapshot};
