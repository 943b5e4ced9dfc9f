/*!
 * Queue Event Reporting
 *
 * The queue performs no I/O itself. Every successful produce or consume is
 * handed to an injected `Reporter` while the queue lock is still held, so
 * the reported sequence is a linearization of buffer states.
 */

use super::types::{ActorId, Item};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of queue event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Produced,
    Consumed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Produced => f.write_str("Produced"),
            EventKind::Consumed => f.write_str("Consumed"),
        }
    }
}

/// One reported queue event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub kind: EventKind,
    pub item: Item,
    pub actor: ActorId,
}

/// Receiver of queue events
///
/// Called with the queue lock held: implementations must be quick and must
/// not call back into the queue that reports to them.
pub trait Reporter: Send + Sync {
    fn report(&self, kind: EventKind, item: Item, actor: ActorId);
}

impl<F> Reporter for F
where
    F: Fn(EventKind, Item, ActorId) + Send + Sync,
{
    #[inline]
    fn report(&self, kind: EventKind, item: Item, actor: ActorId) {
        self(kind, item, actor)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    #[inline(always)]
    fn report(&self, _kind: EventKind, _item: Item, _actor: ActorId) {}
}

/// Emits every event as a `tracing` event at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, kind: EventKind, item: Item, actor: ActorId) {
        tracing::debug!(kind = %kind, item, actor, "queue event");
    }
}

/// Records every event in order
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<QueueEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far
    pub fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn into_events(self) -> Vec<QueueEvent> {
        self.events.into_inner()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, kind: EventKind, item: Item, actor: ActorId) {
        self.events.lock().push(QueueEvent { kind, item, actor });
    }
}
