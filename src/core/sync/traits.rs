/*!
 * Synchronization Outcomes
 *
 * Small result types shared by the monitor and its conditions.
 */

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    #[inline]
    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }

    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// Result of a guarded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The guard became false; the caller holds the lock and may proceed
    Ready {
        /// Number of times the waiter parked before the guard cleared
        parks: u32,
    },
    /// The deadline passed with the guard still true
    TimedOut,
}

impl WaitOutcome {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }

    /// Number of parks before the guard cleared (0 on timeout)
    #[inline]
    pub fn parks(&self) -> u32 {
        match self {
            WaitOutcome::Ready { parks } => *parks,
            WaitOutcome::TimedOut => 0,
        }
    }
}
