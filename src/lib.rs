/*!
 * sync-coord
 *
 * Two blocking coordination primitives for OS threads:
 * - `queue::BoundedQueue`: bounded producer/consumer buffer with a shared
 *   production target
 * - `rwlock::ReaderWriterLock`: shared/exclusive gate with writer preference
 *
 * plus the workloads and tracing setup used by the `sync-coord` binary.
 */

pub mod core;
pub mod monitoring;
pub mod queue;
pub mod rwlock;
pub mod workload;

// Re-exports
pub use crate::core::errors::{LockRole, SyncError, SyncResult};
pub use monitoring::init_tracing;
pub use queue::{BoundedQueue, ConsumeOutcome, EventKind, ProduceOutcome, QueueConfig, Reporter};
pub use rwlock::{LockConfig, LockState, Preference, ReaderWriterLock};
