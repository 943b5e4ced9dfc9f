/*!
 * Mixed Reader/Writer Workload
 *
 * A fixed pool of reader and writer threads hammering one lock in a seeded
 * random order. Each thread checks mutual exclusion against atomics kept
 * outside the lock, so a broken lock shows up as counted violations rather
 * than as silent corruption.
 */

use crate::core::errors::{SyncError, SyncResult};
use crate::core::limits::{DEFAULT_RW_OPERATIONS, DEFAULT_RW_READERS, DEFAULT_RW_WRITERS, MAX_RW_HOLD};
use crate::rwlock::{LockConfig, LockStats, Preference, ReaderWriterLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::panic;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// Parameters of a mixed workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RwMixConfig {
    pub readers: usize,
    pub writers: usize,
    /// Lock operations across all threads
    pub operations: usize,
    pub seed: u64,
    /// Upper bound on how long a role is held
    pub max_hold: Duration,
    #[serde(default)]
    pub preference: Preference,
}

impl Default for RwMixConfig {
    fn default() -> Self {
        Self {
            readers: DEFAULT_RW_READERS,
            writers: DEFAULT_RW_WRITERS,
            operations: DEFAULT_RW_OPERATIONS,
            seed: 0,
            max_hold: MAX_RW_HOLD,
            preference: Preference::WriterPreferred,
        }
    }
}

impl RwMixConfig {
    pub fn validate(&self) -> SyncResult<()> {
        match self.readers.checked_add(self.writers) {
            None => Err(SyncError::InvalidArgument(format!(
                "{} readers plus {} writers overflows the thread count",
                self.readers, self.writers
            ))),
            Some(0) => Err(SyncError::InvalidArgument(
                "workload needs at least one reader or writer".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Only meaningful once `validate` has passed
    fn threads(&self) -> usize {
        self.readers.saturating_add(self.writers)
    }

    /// Operations assigned to thread `index`, spreading the remainder
    fn operations_for(&self, index: usize) -> usize {
        let threads = self.threads();
        self.operations / threads + usize::from(index < self.operations % threads)
    }
}

/// Outcome of a finished workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RwMixSummary {
    pub reads: u64,
    pub writes: u64,
    /// Observed mutual-exclusion breaks (zero for a correct lock)
    pub violations: u64,
    pub stats: LockStats,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Reader,
    Writer,
}

/// Occupancy tracked independently of the lock under test
#[derive(Debug, Default)]
struct Occupancy {
    readers_inside: AtomicUsize,
    writers_inside: AtomicUsize,
    violations: AtomicU64,
}

impl Occupancy {
    fn enter_read(&self) {
        self.readers_inside.fetch_add(1, Ordering::SeqCst);
        if self.writers_inside.load(Ordering::SeqCst) != 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn exit_read(&self) {
        self.readers_inside.fetch_sub(1, Ordering::SeqCst);
    }

    fn enter_write(&self) {
        let writers = self.writers_inside.fetch_add(1, Ordering::SeqCst);
        if writers != 0 || self.readers_inside.load(Ordering::SeqCst) != 0 {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn exit_write(&self) {
        self.writers_inside.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run the workload to completion
pub fn run(config: RwMixConfig) -> SyncResult<RwMixSummary> {
    config.validate()?;
    let lock = ReaderWriterLock::with_config(LockConfig {
        preference: config.preference,
    });
    let occupancy = Occupancy::default();

    info!(
        readers = config.readers,
        writers = config.writers,
        operations = config.operations,
        seed = config.seed,
        "Starting reader/writer workload"
    );
    let start = Instant::now();

    let results: Vec<SyncResult<u64>> = thread::scope(|scope| {
        let (lock, occupancy) = (&lock, &occupancy);
        let handles: Vec<_> = (0..config.threads())
            .map(|index| {
                let role = if index < config.readers { Role::Reader } else { Role::Writer };
                scope.spawn(move || run_thread(lock, occupancy, &config, index, role))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    let mut reads = 0;
    let mut writes = 0;
    for (index, result) in results.into_iter().enumerate() {
        if index < config.readers {
            reads += result?;
        } else {
            writes += result?;
        }
    }

    let violations = occupancy.violations.load(Ordering::SeqCst);
    if violations > 0 {
        warn!(violations, "Mutual exclusion violated");
    }

    let summary = RwMixSummary {
        reads,
        writes,
        violations,
        stats: lock.stats(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        reads,
        writes,
        violations,
        peak_readers = summary.stats.peak_readers,
        elapsed_ms = summary.elapsed_ms,
        "Reader/writer workload complete"
    );
    Ok(summary)
}

fn run_thread(
    lock: &ReaderWriterLock,
    occupancy: &Occupancy,
    config: &RwMixConfig,
    index: usize,
    role: Role,
) -> SyncResult<u64> {
    let _span = info_span!("rw_thread", index, role = ?role).entered();
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let max_hold_us = config.max_hold.as_micros() as u64;
    let operations = config.operations_for(index);

    for _ in 0..operations {
        // Shuffle arrival order between threads
        if rng.gen_bool(0.5) {
            thread::yield_now();
        }
        let hold = Duration::from_micros(rng.gen_range(0..=max_hold_us));

        match role {
            Role::Reader => {
                lock.acquire_read();
                occupancy.enter_read();
                hold_for(hold);
                occupancy.exit_read();
                lock.release_read()?;
            }
            Role::Writer => {
                lock.acquire_write();
                occupancy.enter_write();
                hold_for(hold);
                occupancy.exit_write();
                lock.release_write()?;
            }
        }
    }

    debug!(operations, "Thread done");
    Ok(operations as u64)
}

fn hold_for(hold: Duration) {
    if hold.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(hold);
    }
}
