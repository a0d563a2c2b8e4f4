//! Standalone error types for nebula-adaptive-pool
//!
//! Uses thiserror for clean, idiomatic Rust error definitions. Only
//! construction and stream buffering can fail; `acquire`, `release` and
//! `stats` are total.

use std::io;

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::warn;

// ============================================================================
// Main Error Types
// ============================================================================

/// Adaptive pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    // --- Configuration Errors ---
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Buffering Errors ---
    #[error("Buffering reader failed after {bytes_read} bytes: {source}")]
    Read {
        bytes_read: usize,
        #[source]
        source: io::Error,
    },
}

impl PoolError {
    /// Check if error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidConfig { .. } => false,
            Self::Read { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
        }
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "POOL:CONFIG:INVALID",
            Self::Read { .. } => "POOL:READ:FAILED",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        let reason = reason.into();

        #[cfg(feature = "logging")]
        warn!(%reason, "rejected adaptive pool configuration");

        Self::InvalidConfig { reason }
    }

    /// Create read failed error
    pub fn read_failed(bytes_read: usize, source: io::Error) -> Self {
        #[cfg(feature = "logging")]
        warn!(bytes_read, error = %source, "failed to buffer reader");

        Self::Read { bytes_read, source }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for adaptive pool operations
pub type PoolResult<T> = Result<T, PoolError>;

// ============================================================================
// Tests
// ============================================================================
