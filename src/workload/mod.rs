/*!
 * Workloads
 *
 * Thread orchestration around the primitives: spawning, counting and
 * joining workers. Everything here goes through the public queue and lock
 * operations only.
 */

pub mod master_worker;
pub mod rw_mix;

pub use master_worker::{MasterWorkerConfig, RunSummary};
pub use rw_mix::{RwMixConfig, RwMixSummary};
