/*!
 * Queue Types
 * Items, outcomes, configuration and stats for the bounded queue
 */

use crate::core::errors::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};

/// Value carried through the queue (the sequential production index)
pub type Item = u64;

/// Identifier a producer or consumer passes with each call
pub type ActorId = usize;

/// Result of [`BoundedQueue::try_produce`](super::BoundedQueue::try_produce)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum ProduceOutcome {
    Produced(Item),
    /// The production target was reached; the producer should stop
    Done,
}

impl ProduceOutcome {
    #[inline]
    pub fn item(self) -> Option<Item> {
        match self {
            ProduceOutcome::Produced(item) => Some(item),
            ProduceOutcome::Done => None,
        }
    }

    #[inline]
    pub fn is_done(self) -> bool {
        matches!(self, ProduceOutcome::Done)
    }
}

/// Result of [`BoundedQueue::try_consume`](super::BoundedQueue::try_consume)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum ConsumeOutcome {
    Consumed(Item),
    /// Every item has been consumed; the consumer should stop
    Done,
}

impl ConsumeOutcome {
    #[inline]
    pub fn item(self) -> Option<Item> {
        match self {
            ConsumeOutcome::Consumed(item) => Some(item),
            ConsumeOutcome::Done => None,
        }
    }

    #[inline]
    pub fn is_done(self) -> bool {
        matches!(self, ConsumeOutcome::Done)
    }
}

/// Which end consumers take items from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Take from the end producers append to (stack order)
    #[default]
    Lifo,
    /// Take from the front (arrival order)
    Fifo,
}

/// Bounded queue configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of buffered items
    pub capacity: usize,
    /// Items to produce (and consume) over the queue's lifetime
    pub total_items: u64,
    /// Removal end
    #[serde(default)]
    pub discipline: Discipline,
}

impl QueueConfig {
    pub const fn new(capacity: usize, total_items: u64) -> Self {
        Self {
            capacity,
            total_items,
            discipline: Discipline::Lifo,
        }
    }

    /// Same configuration with arrival-order removal
    pub const fn fifo(self) -> Self {
        Self {
            discipline: Discipline::Fifo,
            ..self
        }
    }

    /// Only a zero capacity is rejected here; oversized buffers surface as
    /// `AllocationFailed` when the queue reserves its slots
    pub fn validate(&self) -> SyncResult<()> {
        if self.capacity == 0 {
            return Err(SyncError::InvalidArgument(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of a queue, sampled under its lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub capacity: usize,
    pub total_items: u64,
    pub len: usize,
    pub produced: u64,
    pub consumed: u64,
    /// Largest buffer length ever observed
    pub peak_len: usize,
    /// Times a producer parked on a full buffer
    pub producer_parks: u64,
    /// Times a consumer parked on an empty buffer
    pub consumer_parks: u64,
}

impl QueueStats {
    /// Whether every item has been produced and consumed
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.consumed >= self.total_items
    }
}
