/*!
 * Reader-Writer Lock
 *
 * Shared/exclusive access gate with a write-waiter counter that gives
 * waiting writers priority over newly arriving readers.
 *
 * State machine per lock: Idle -> Reading(n) -> Idle, Idle -> Writing -> Idle.
 * Transitions whose guard is false are queued (the caller parks), never
 * rejected.
 */

mod guard;
mod lock;
mod types;

pub use guard::{ReadGuard, WriteGuard};
pub use lock::ReaderWriterLock;
pub use types::{LockConfig, LockState, LockStats, Preference};
