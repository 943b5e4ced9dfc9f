/*!
 * Reader-Writer Lock Types
 * Admission policy, configuration, observable state and stats
 */

use serde::{Deserialize, Serialize};

/// Admission policy when readers and writers contend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// A waiting writer blocks newly arriving readers (no writer starvation)
    #[default]
    WriterPreferred,
    /// Readers are only blocked by an active writer; writers can starve
    ReaderPreferred,
}

/// Reader-writer lock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default)]
    pub preference: Preference,
}

impl LockConfig {
    pub const fn writer_preferred() -> Self {
        Self {
            preference: Preference::WriterPreferred,
        }
    }

    pub const fn reader_preferred() -> Self {
        Self {
            preference: Preference::ReaderPreferred,
        }
    }
}

/// Observable lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "readers", rename_all = "snake_case")]
pub enum LockState {
    Idle,
    /// `n > 0` readers inside
    Reading(usize),
    Writing,
}

/// Snapshot of a lock's counters, sampled under its internal mutex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockStats {
    pub active_readers: usize,
    pub active_writers: usize,
    pub waiting_writers: usize,
    /// Most readers ever inside at once
    pub peak_readers: usize,
    pub read_acquisitions: u64,
    pub write_acquisitions: u64,
    /// Timed acquires that gave up
    pub timeouts: u64,
}

impl LockStats {
    pub fn state(&self) -> LockState {
        if self.active_writers > 0 {
            LockState::Writing
        } else if self.active_readers > 0 {
            LockState::Reading(self.active_readers)
        } else {
            LockState::Idle
        }
    }
}
