/*!
 * Bounded Queue
 * Fixed-capacity buffer shared by producer and consumer threads
 *
 * Termination is driven by a production target fixed at construction:
 * producers stop once `total_items` have been produced, consumers once
 * `total_items` have been consumed. Both checks run before parking and
 * again after every wake.
 */

use super::reporter::{EventKind, NoopReporter, Reporter};
use super::types::{ActorId, ConsumeOutcome, Discipline, Item, ProduceOutcome, QueueConfig, QueueStats};
use crate::core::errors::{SyncError, SyncResult};
use crate::core::sync::{Condition, Monitor, MonitorGuard, WaitOutcome};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// State guarded by the queue monitor
#[derive(Debug)]
struct QueueState {
    slots: VecDeque<Item>,
    produced: u64,
    consumed: u64,
    peak_len: usize,
    producer_parks: u64,
    consumer_parks: u64,
}

/// Multi-producer, multi-consumer bounded buffer
///
/// # Invariants
///
/// - `0 <= len <= capacity`
/// - `consumed <= produced <= total_items`
///
/// # Examples
///
/// ```
/// use sync_coord::queue::{BoundedQueue, ConsumeOutcome, ProduceOutcome};
///
/// let queue = BoundedQueue::new(2, 1).unwrap();
/// assert_eq!(queue.try_produce(0), ProduceOutcome::Produced(0));
/// assert_eq!(queue.try_produce(0), ProduceOutcome::Done);
/// assert_eq!(queue.try_consume(0), ConsumeOutcome::Consumed(0));
/// assert_eq!(queue.try_consume(0), ConsumeOutcome::Done);
/// ```
pub struct BoundedQueue<R: Reporter = NoopReporter> {
    config: QueueConfig,
    monitor: Monitor<QueueState>,
    /// Producers park here while the buffer is full
    can_fill: Condition,
    /// Consumers park here while the buffer is empty
    can_take: Condition,
    reporter: R,
}

impl BoundedQueue<NoopReporter> {
    /// Create a queue that reports nothing
    pub fn new(capacity: usize, total_items: u64) -> SyncResult<Self> {
        Self::with_config(QueueConfig::new(capacity, total_items))
    }

    pub fn with_config(config: QueueConfig) -> SyncResult<Self> {
        Self::with_reporter(config, NoopReporter)
    }
}

impl<R: Reporter> BoundedQueue<R> {
    /// Create a queue that hands every event to `reporter`
    ///
    /// Slot storage is reserved here, so an allocation failure surfaces
    /// before any worker starts.
    pub fn with_reporter(config: QueueConfig, reporter: R) -> SyncResult<Self> {
        config.validate()?;

        let mut slots = VecDeque::new();
        slots.try_reserve_exact(config.capacity).map_err(|e| {
            SyncError::AllocationFailed(format!("{} slots: {}", config.capacity, e))
        })?;

        debug!(
            capacity = config.capacity,
            total_items = config.total_items,
            discipline = ?config.discipline,
            "Bounded queue created"
        );

        Ok(Self {
            config,
            monitor: Monitor::new(QueueState {
                slots,
                produced: 0,
                consumed: 0,
                peak_len: 0,
                producer_parks: 0,
                consumer_parks: 0,
            }),
            can_fill: Condition::new("can_fill"),
            can_take: Condition::new("can_take"),
            reporter,
        })
    }

    /// Claim and append the next item, blocking while the buffer is full
    ///
    /// Returns `Done` once the production target has been reached, whether
    /// that is observed on entry or after waking.
    pub fn try_produce(&self, producer: ActorId) -> ProduceOutcome {
        let mut state = self.monitor.lock();
        if state.produced >= self.config.total_items {
            return ProduceOutcome::Done;
        }

        let (capacity, total) = (self.config.capacity, self.config.total_items);
        let parks = self
            .can_fill
            .wait_while(&mut state, |s| s.slots.len() >= capacity && s.produced < total);
        state.producer_parks += u64::from(parks);

        self.produce_locked(&mut state, producer)
    }

    /// [`try_produce`](Self::try_produce) that gives up after `timeout`
    ///
    /// On timeout nothing is claimed and no counter changes.
    pub fn try_produce_timeout(
        &self,
        producer: ActorId,
        timeout: Duration,
    ) -> SyncResult<ProduceOutcome> {
        let start = Instant::now();
        let mut state = self.monitor.lock();
        if state.produced >= self.config.total_items {
            return Ok(ProduceOutcome::Done);
        }

        let (capacity, total) = (self.config.capacity, self.config.total_items);
        match self.can_fill.wait_while_for(&mut state, timeout, |s| {
            s.slots.len() >= capacity && s.produced < total
        }) {
            WaitOutcome::Ready { parks } => {
                state.producer_parks += u64::from(parks);
                Ok(self.produce_locked(&mut state, producer))
            }
            WaitOutcome::TimedOut => {
                warn!(producer, timeout_ms = timeout.as_millis() as u64, "Produce timed out");
                Err(SyncError::timed_out(timeout, start.elapsed()))
            }
        }
    }

    /// Remove one item, blocking while the buffer is empty
    ///
    /// Returns `Done` once every item has been consumed.
    pub fn try_consume(&self, consumer: ActorId) -> ConsumeOutcome {
        let mut state = self.monitor.lock();
        if state.consumed >= self.config.total_items {
            return ConsumeOutcome::Done;
        }

        let total = self.config.total_items;
        let parks = self
            .can_take
            .wait_while(&mut state, |s| s.slots.is_empty() && s.consumed < total);
        state.consumer_parks += u64::from(parks);

        self.consume_locked(&mut state, consumer)
    }

    /// [`try_consume`](Self::try_consume) that gives up after `timeout`
    pub fn try_consume_timeout(
        &self,
        consumer: ActorId,
        timeout: Duration,
    ) -> SyncResult<ConsumeOutcome> {
        let start = Instant::now();
        let mut state = self.monitor.lock();
        if state.consumed >= self.config.total_items {
            return Ok(ConsumeOutcome::Done);
        }

        let total = self.config.total_items;
        match self
            .can_take
            .wait_while_for(&mut state, timeout, |s| s.slots.is_empty() && s.consumed < total)
        {
            WaitOutcome::Ready { parks } => {
                state.consumer_parks += u64::from(parks);
                Ok(self.consume_locked(&mut state, consumer))
            }
            WaitOutcome::TimedOut => {
                warn!(consumer, timeout_ms = timeout.as_millis() as u64, "Consume timed out");
                Err(SyncError::timed_out(timeout, start.elapsed()))
            }
        }
    }

    fn produce_locked(&self, state: &mut MonitorGuard<'_, QueueState>, producer: ActorId) -> ProduceOutcome {
        // Another producer may have finished the run while we were parked
        if state.produced >= self.config.total_items {
            return ProduceOutcome::Done;
        }
        debug_assert!(state.slots.len() < self.config.capacity);

        let item = state.produced;
        state.slots.push_back(item);
        state.produced += 1;
        state.peak_len = state.peak_len.max(state.slots.len());

        self.reporter.report(EventKind::Produced, item, producer);
        trace!(producer, item, len = state.slots.len(), "Produced");

        if state.produced == self.config.total_items {
            // Producers parked on a full buffer would otherwise wait for a
            // consume that may never come
            let woken = self.can_fill.wake_all();
            debug!(producer, woken = woken.count(), "Production target reached");
        }
        self.can_take.wake_one();

        ProduceOutcome::Produced(item)
    }

    fn consume_locked(&self, state: &mut MonitorGuard<'_, QueueState>, consumer: ActorId) -> ConsumeOutcome {
        if state.consumed >= self.config.total_items {
            return ConsumeOutcome::Done;
        }

        let taken = match self.config.discipline {
            Discipline::Lifo => state.slots.pop_back(),
            Discipline::Fifo => state.slots.pop_front(),
        };
        // The wait guard only clears on a non-empty buffer or a finished run
        let Some(item) = taken else {
            return ConsumeOutcome::Done;
        };
        state.consumed += 1;
        debug_assert!(state.consumed <= state.produced);

        self.reporter.report(EventKind::Consumed, item, consumer);
        trace!(consumer, item, len = state.slots.len(), "Consumed");

        if state.consumed == self.config.total_items {
            let woken = self.can_take.wake_all();
            debug!(consumer, woken = woken.count(), "Consumption target reached");
        }
        self.can_fill.wake_one();

        ConsumeOutcome::Consumed(item)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    #[inline]
    pub fn total_items(&self) -> u64 {
        self.config.total_items
    }

    #[inline]
    pub fn discipline(&self) -> Discipline {
        self.config.discipline
    }

    /// Current number of buffered items
    pub fn len(&self) -> usize {
        self.monitor.with(|s| s.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every item has been produced and consumed
    pub fn is_finished(&self) -> bool {
        self.monitor.with(|s| s.consumed >= self.config.total_items)
    }

    /// Consistent snapshot of the queue, sampled under its lock
    pub fn stats(&self) -> QueueStats {
        self.monitor.with(|s| QueueStats {
            capacity: self.config.capacity,
            total_items: self.config.total_items,
            len: s.slots.len(),
            produced: s.produced,
            consumed: s.consumed,
            peak_len: s.peak_len,
            producer_parks: s.producer_parks,
            consumer_parks: s.consumer_parks,
        })
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }
}

impl<R: Reporter> fmt::Debug for BoundedQueue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
