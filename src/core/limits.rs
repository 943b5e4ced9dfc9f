/*!
 * Limits and Constants
 *
 * Centralized location for workload defaults.
 */

use std::time::Duration;

// =============================================================================
// READER/WRITER WORKLOAD DEFAULTS
// =============================================================================

/// Reader threads in the default mixed workload
pub const DEFAULT_RW_READERS: usize = 3;

/// Writer threads in the default mixed workload
pub const DEFAULT_RW_WRITERS: usize = 2;

/// Total lock operations in the default mixed workload
pub const DEFAULT_RW_OPERATIONS: usize = 1000;

/// Upper bound on how long a workload thread holds its role
/// [PERF] Kept short so the default run finishes well under a second
pub const MAX_RW_HOLD: Duration = Duration::from_micros(200);
