/*!
 * Reader-Writer Lock
 *
 * Many concurrent readers or one exclusive writer. The lock only gates
 * access: the protected resource stays owned by the caller.
 *
 * # Writer Preference
 *
 * A writer announces itself in `waiting_writers` before parking. Newly
 * arriving readers park while any writer waits or is active, so a steady
 * stream of readers cannot starve a writer: once the readers already inside
 * drain, the writer gets in.
 */

use super::guard::{ReadGuard, WriteGuard};
use super::types::{LockConfig, LockState, LockStats, Preference};
use crate::core::errors::{LockRole, SyncError, SyncResult};
use crate::core::sync::{Condition, Monitor, MonitorGuard, WaitOutcome};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};

/// Reader-writer lock with configurable admission policy
///
/// # Examples
///
/// ```
/// use sync_coord::rwlock::{LockState, ReaderWriterLock};
///
/// let lock = ReaderWriterLock::new();
/// lock.acquire_read();
/// lock.acquire_read();
/// assert_eq!(lock.state(), LockState::Reading(2));
/// lock.release_read().unwrap();
/// lock.release_read().unwrap();
///
/// lock.acquire_write();
/// assert_eq!(lock.state(), LockState::Writing);
/// lock.release_write().unwrap();
/// assert!(lock.release_write().is_err());
/// ```
pub struct ReaderWriterLock {
    config: LockConfig,
    monitor: Monitor<LockStats>,
    /// Readers park here while admission is closed to them
    readers: Condition,
    /// Writers park here while anyone is inside
    writers: Condition,
}

impl ReaderWriterLock {
    /// Create a writer-preferring lock
    pub fn new() -> Self {
        Self::with_config(LockConfig::default())
    }

    pub fn with_config(config: LockConfig) -> Self {
        Self {
            config,
            monitor: Monitor::new(LockStats::default()),
            readers: Condition::new("readers"),
            writers: Condition::new("writers"),
        }
    }

    #[inline]
    pub fn preference(&self) -> Preference {
        self.config.preference
    }

    fn reader_blocked(preference: Preference, counters: &LockStats) -> bool {
        match preference {
            Preference::WriterPreferred => {
                counters.active_writers > 0 || counters.waiting_writers > 0
            }
            Preference::ReaderPreferred => counters.active_writers > 0,
        }
    }

    fn writer_blocked(counters: &LockStats) -> bool {
        counters.active_readers > 0 || counters.active_writers > 0
    }

    /// Enter as a reader, blocking while a writer is active or waiting
    pub fn acquire_read(&self) {
        let preference = self.config.preference;
        let mut counters = self.monitor.lock();
        self.readers
            .wait_while(&mut counters, |c| Self::reader_blocked(preference, c));
        Self::admit_reader(&mut counters);
    }

    /// [`acquire_read`](Self::acquire_read) that gives up after `timeout`
    ///
    /// A timed-out reader leaves no trace in the lock's counters (apart
    /// from the `timeouts` statistic).
    pub fn acquire_read_timeout(&self, timeout: Duration) -> SyncResult<()> {
        let start = Instant::now();
        let preference = self.config.preference;
        let mut counters = self.monitor.lock();
        match self
            .readers
            .wait_while_for(&mut counters, timeout, |c| Self::reader_blocked(preference, c))
        {
            WaitOutcome::Ready { .. } => {
                Self::admit_reader(&mut counters);
                Ok(())
            }
            WaitOutcome::TimedOut => {
                counters.timeouts += 1;
                warn!(role = %LockRole::Reader, timeout_ms = timeout.as_millis() as u64, "Acquire timed out");
                Err(SyncError::timed_out(timeout, start.elapsed()))
            }
        }
    }

    fn admit_reader(counters: &mut MonitorGuard<'_, LockStats>) {
        debug_assert_eq!(counters.active_writers, 0);
        counters.active_readers += 1;
        counters.read_acquisitions += 1;
        counters.peak_readers = counters.peak_readers.max(counters.active_readers);
        trace!(active_readers = counters.active_readers, "Reader admitted");
    }

    /// Leave as a reader
    ///
    /// The last reader out hands the lock to one waiting writer.
    pub fn release_read(&self) -> SyncResult<()> {
        let mut counters = self.monitor.lock();
        if counters.active_readers == 0 {
            return Err(Self::violation(LockRole::Reader, "no active reader"));
        }

        counters.active_readers -= 1;
        trace!(active_readers = counters.active_readers, "Reader released");

        if counters.active_readers == 0 && counters.waiting_writers > 0 {
            self.writers.wake_one();
        }
        Ok(())
    }

    /// Enter as the exclusive writer
    pub fn acquire_write(&self) {
        let mut counters = self.monitor.lock();
        counters.waiting_writers += 1;
        self.writers.wait_while(&mut counters, Self::writer_blocked);
        counters.waiting_writers -= 1;
        Self::admit_writer(&mut counters);
    }

    /// [`acquire_write`](Self::acquire_write) that gives up after `timeout`
    ///
    /// A timed-out writer withdraws its waiting entry; if it was the last
    /// waiting writer and no writer is active, the readers it was holding
    /// back are released.
    pub fn acquire_write_timeout(&self, timeout: Duration) -> SyncResult<()> {
        let start = Instant::now();
        let mut counters = self.monitor.lock();
        counters.waiting_writers += 1;

        let outcome = self
            .writers
            .wait_while_for(&mut counters, timeout, Self::writer_blocked);
        counters.waiting_writers -= 1;

        match outcome {
            WaitOutcome::Ready { .. } => {
                Self::admit_writer(&mut counters);
                Ok(())
            }
            WaitOutcome::TimedOut => {
                counters.timeouts += 1;
                if counters.waiting_writers == 0 && counters.active_writers == 0 {
                    self.readers.wake_all();
                }
                warn!(role = %LockRole::Writer, timeout_ms = timeout.as_millis() as u64, "Acquire timed out");
                Err(SyncError::timed_out(timeout, start.elapsed()))
            }
        }
    }

    fn admit_writer(counters: &mut MonitorGuard<'_, LockStats>) {
        debug_assert_eq!(counters.active_readers, 0);
        debug_assert_eq!(counters.active_writers, 0);
        counters.active_writers = 1;
        counters.write_acquisitions += 1;
        trace!(waiting_writers = counters.waiting_writers, "Writer admitted");
    }

    /// Leave as the writer
    ///
    /// Hands the lock to one waiting writer if there is one, otherwise
    /// releases every parked reader at once.
    pub fn release_write(&self) -> SyncResult<()> {
        let mut counters = self.monitor.lock();
        if counters.active_writers == 0 {
            return Err(Self::violation(LockRole::Writer, "no active writer"));
        }

        counters.active_writers -= 1;
        trace!(waiting_writers = counters.waiting_writers, "Writer released");

        match self.config.preference {
            Preference::WriterPreferred => {
                if counters.waiting_writers > 0 {
                    self.writers.wake_one();
                } else {
                    let woken = self.readers.wake_all();
                    debug!(woken = woken.count(), "Readers released after write");
                }
            }
            Preference::ReaderPreferred => {
                // Readers are never held back by waiting writers here
                self.readers.wake_all();
                if counters.waiting_writers > 0 {
                    self.writers.wake_one();
                }
            }
        }
        Ok(())
    }

    fn violation(role: LockRole, detail: &str) -> SyncError {
        error!(role = %role, detail, "Release without matching acquire");
        SyncError::ProtocolViolation {
            role,
            detail: detail.to_string(),
        }
    }

    /// Acquire read access for the lifetime of the returned guard
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard::new(self)
    }

    pub fn read_timeout(&self, timeout: Duration) -> SyncResult<ReadGuard<'_>> {
        self.acquire_read_timeout(timeout)?;
        Ok(ReadGuard::new(self))
    }

    /// Acquire write access for the lifetime of the returned guard
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard::new(self)
    }

    pub fn write_timeout(&self, timeout: Duration) -> SyncResult<WriteGuard<'_>> {
        self.acquire_write_timeout(timeout)?;
        Ok(WriteGuard::new(self))
    }

    /// Current state (Idle, Reading(n) or Writing)
    pub fn state(&self) -> LockState {
        self.monitor.with(|c| c.state())
    }

    /// Consistent snapshot of the counters
    pub fn stats(&self) -> LockStats {
        self.monitor.with(|c| *c)
    }
}

impl Default for ReaderWriterLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReaderWriterLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderWriterLock")
            .field("preference", &self.config.preference)
            .field("stats", &self.stats())
            .finish()
    }
}
