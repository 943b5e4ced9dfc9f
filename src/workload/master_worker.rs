/*!
 * Master/Worker Run
 *
 * Producer ("master") and consumer ("worker") thread pools around one
 * bounded queue. Every thread loops on its queue operation until it sees
 * `Done`; the run ends when all threads have been joined.
 */

use crate::core::errors::{SyncError, SyncResult};
use crate::queue::{
    ActorId, BoundedQueue, ConsumeOutcome, Discipline, ProduceOutcome, QueueConfig, QueueStats,
    Reporter,
};
use serde::{Deserialize, Serialize};
use std::panic;
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Parameters of a master/worker run
///
/// Field order mirrors the command line:
/// `<total_items> <capacity> <num_workers> <num_masters>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterWorkerConfig {
    pub total_items: u64,
    pub capacity: usize,
    /// Consumer threads
    pub num_workers: usize,
    /// Producer threads
    pub num_masters: usize,
    #[serde(default)]
    pub discipline: Discipline,
}

impl MasterWorkerConfig {
    pub const fn new(total_items: u64, capacity: usize, num_workers: usize, num_masters: usize) -> Self {
        Self {
            total_items,
            capacity,
            num_workers,
            num_masters,
            discipline: Discipline::Lifo,
        }
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            capacity: self.capacity,
            total_items: self.total_items,
            discipline: self.discipline,
        }
    }

    /// Reject runs that could never finish
    pub fn validate(&self) -> SyncResult<()> {
        self.queue_config().validate()?;
        if self.total_items > 0 && self.num_masters == 0 {
            return Err(SyncError::InvalidArgument(
                "at least one master is needed to produce items".to_string(),
            ));
        }
        if self.total_items > 0 && self.num_workers == 0 {
            return Err(SyncError::InvalidArgument(
                "at least one worker is needed to consume items".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Items produced by each master, indexed by master id
    pub produced_by: Vec<u64>,
    /// Items consumed by each worker, indexed by worker id
    pub consumed_by: Vec<u64>,
    pub stats: QueueStats,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn total_produced(&self) -> u64 {
        self.produced_by.iter().sum()
    }

    pub fn total_consumed(&self) -> u64 {
        self.consumed_by.iter().sum()
    }

    /// One line per actor: `master <id> produced <n>`, then `worker <id> consumed <n>`
    pub fn actor_lines(&self) -> Vec<String> {
        let masters = self
            .produced_by
            .iter()
            .enumerate()
            .map(|(id, n)| format!("master {} produced {}", id, n));
        let workers = self
            .consumed_by
            .iter()
            .enumerate()
            .map(|(id, n)| format!("worker {} consumed {}", id, n));
        masters.chain(workers).collect()
    }
}

/// Run the producer and consumer pools to completion
///
/// The queue, and with it every allocation, is set up before the first
/// thread starts. Masters are joined first, then workers.
pub fn run<R: Reporter>(config: MasterWorkerConfig, reporter: R) -> SyncResult<RunSummary> {
    config.validate()?;
    let queue = BoundedQueue::with_reporter(config.queue_config(), reporter)?;

    info!(
        total_items = config.total_items,
        capacity = config.capacity,
        masters = config.num_masters,
        workers = config.num_workers,
        "Starting master/worker run"
    );
    let start = Instant::now();

    let (produced_by, consumed_by) = thread::scope(|scope| {
        let queue = &queue;
        let masters: Vec<_> = (0..config.num_masters)
            .map(|id| scope.spawn(move || produce_loop(queue, id)))
            .collect();
        let workers: Vec<_> = (0..config.num_workers)
            .map(|id| scope.spawn(move || consume_loop(queue, id)))
            .collect();

        let produced_by = join_all(masters, "master");
        let consumed_by = join_all(workers, "worker");
        (produced_by, consumed_by)
    });

    let summary = RunSummary {
        produced_by,
        consumed_by,
        stats: queue.stats(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        produced = summary.stats.produced,
        consumed = summary.stats.consumed,
        peak_len = summary.stats.peak_len,
        elapsed_ms = summary.elapsed_ms,
        "Master/worker run complete"
    );
    Ok(summary)
}

fn produce_loop<R: Reporter>(queue: &BoundedQueue<R>, master: ActorId) -> u64 {
    let _span = info_span!("master", id = master).entered();
    let mut produced = 0;
    while let ProduceOutcome::Produced(_) = queue.try_produce(master) {
        produced += 1;
    }
    debug!(produced, "Master done");
    produced
}

fn consume_loop<R: Reporter>(queue: &BoundedQueue<R>, worker: ActorId) -> u64 {
    let _span = info_span!("worker", id = worker).entered();
    let mut consumed = 0;
    while let ConsumeOutcome::Consumed(_) = queue.try_consume(worker) {
        consumed += 1;
    }
    debug!(consumed, "Worker done");
    consumed
}

fn join_all(handles: Vec<ScopedJoinHandle<'_, u64>>, role: &'static str) -> Vec<u64> {
    handles
        .into_iter()
        .enumerate()
        .map(|(id, handle)| {
            // Re-raise a worker panic on the orchestrating thread
            let count = handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload));
            info!(role, id, count, "{} {} joined", role, id);
            count
        })
        .collect()
}
