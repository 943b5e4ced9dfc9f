/*!
 * Synchronization Primitives
 *
 * Monitor building block shared by the bounded queue and the
 * reader-writer lock:
 * - `Monitor<S>`: a mutex owning the shared state
 * - `Condition`: a named condvar whose waits re-check a guard predicate
 *
 * # Use Cases
 *
 * - **Bounded buffers**: park producers while full, consumers while empty
 * - **Reader-writer locks**: park readers and writers on separate conditions
 */

mod monitor;
mod traits;

pub use monitor::{Condition, Monitor, MonitorGuard};
pub use traits::{WaitOutcome, WakeResult};
