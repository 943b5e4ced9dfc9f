/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Role a caller holds (or claims to hold) on a reader-writer lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockRole {
    Reader,
    Writer,
}

impl fmt::Display for LockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockRole::Reader => f.write_str("reader"),
            LockRole::Writer => f.write_str("writer"),
        }
    }
}

/// Synchronization errors with serialization support
///
/// There is no transient class here: blocking is resolved by waiting,
/// never by failing and retrying. Only `TimedOut` is recoverable.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(sync::invalid_argument),
        help("Capacity must be at least 1 and every worker pool needs at least one thread.")
    )]
    InvalidArgument(String),

    #[error("Protocol violation: {role} release without a matching acquire ({detail})")]
    #[diagnostic(
        code(sync::protocol_violation),
        help("Each release must pair with an acquire of the same role on the same lock.")
    )]
    ProtocolViolation { role: LockRole, detail: String },

    #[error("Operation timed out after {elapsed_ms}ms (timeout: {timeout_ms}ms)")]
    #[diagnostic(
        code(sync::timed_out),
        help("State was left unchanged. Retry or give up according to caller policy.")
    )]
    TimedOut { elapsed_ms: u64, timeout_ms: u64 },

    #[error("Buffer allocation failed: {0}")]
    #[diagnostic(
        code(sync::allocation_failed),
        help("System may be low on memory. Reduce the queue capacity.")
    )]
    AllocationFailed(String),
}

impl SyncError {
    /// Build a `TimedOut` error from the requested timeout and the time actually waited
    pub fn timed_out(timeout: Duration, elapsed: Duration) -> Self {
        SyncError::TimedOut {
            elapsed_ms: elapsed.as_millis() as u64,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Whether the caller may retry the same operation
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SyncError::TimedOut { .. })
    }
}
