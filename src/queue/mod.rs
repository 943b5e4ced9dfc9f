/*!
 * Bounded Producer/Consumer Queue
 *
 * Fixed-capacity buffer coordinating any number of producers and consumers
 * around a shared production target. Producers park while the buffer is
 * full, consumers while it is empty; both stop once the target is reached.
 */

mod bounded;
mod reporter;
mod types;

pub use bounded::BoundedQueue;
pub use reporter::{EventKind, NoopReporter, QueueEvent, RecordingReporter, Reporter, TracingReporter};
pub use types::{ActorId, ConsumeOutcome, Discipline, Item, ProduceOutcome, QueueConfig, QueueStats};
