/*!
 * Monitor
 *
 * One exclusion primitive paired with named conditions. Waiting on a
 * condition releases the lock atomically with parking and reacquires it on
 * wake; the guard predicate is always re-checked in a loop, so spurious and
 * stolen wakeups are harmless.
 *
 * Built on parking_lot's Mutex/Condvar: no poisoning, and `notify_*`
 * report how many threads they actually woke.
 */

use super::traits::{WaitOutcome, WakeResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::time::{Duration, Instant};

/// Guard returned by [`Monitor::lock`]
pub type MonitorGuard<'a, S> = MutexGuard<'a, S>;

/// Owner of some shared state `S`, mutated only while locked
pub struct Monitor<S> {
    state: Mutex<S>,
}

impl<S> Monitor<S> {
    pub const fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Enter the monitor
    #[inline]
    pub fn lock(&self) -> MonitorGuard<'_, S> {
        self.state.lock()
    }

    /// Run `f` with exclusive access to the state
    #[inline]
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let mut guard = self.state.lock();
        f(&mut *guard)
    }

    pub fn into_inner(self) -> S {
        self.state.into_inner()
    }
}

impl<S: Default> Default for Monitor<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for Monitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_lock() {
            Some(state) => f.debug_struct("Monitor").field("state", &*state).finish(),
            None => f.debug_struct("Monitor").field("state", &"<locked>").finish(),
        }
    }
}

/// A named condition threads wait on inside a [`Monitor`]
///
/// A condition must only ever be used with guards of one monitor.
pub struct Condition {
    name: &'static str,
    condvar: Condvar,
}

impl Condition {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            condvar: Condvar::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Park while `blocked` holds
    ///
    /// Returns the number of times the caller parked (0 if the guard was
    /// already clear on entry).
    pub fn wait_while<S, F>(&self, guard: &mut MonitorGuard<'_, S>, mut blocked: F) -> u32
    where
        F: FnMut(&S) -> bool,
    {
        let mut parks = 0;
        while blocked(&**guard) {
            parks += 1;
            self.condvar.wait(guard);
        }
        parks
    }

    /// Park while `blocked` holds, giving up at `deadline`
    ///
    /// The guard is evaluated once more after a timed-out park: a waiter
    /// whose guard cleared right at the deadline still proceeds.
    pub fn wait_while_until<S, F>(
        &self,
        guard: &mut MonitorGuard<'_, S>,
        deadline: Instant,
        mut blocked: F,
    ) -> WaitOutcome
    where
        F: FnMut(&S) -> bool,
    {
        let mut parks = 0;
        while blocked(&**guard) {
            parks += 1;
            if self.condvar.wait_until(guard, deadline).timed_out() {
                if blocked(&**guard) {
                    return WaitOutcome::TimedOut;
                }
                break;
            }
        }
        WaitOutcome::Ready { parks }
    }

    /// Convenience wrapper over [`Condition::wait_while_until`]
    #[inline]
    pub fn wait_while_for<S, F>(
        &self,
        guard: &mut MonitorGuard<'_, S>,
        timeout: Duration,
        blocked: F,
    ) -> WaitOutcome
    where
        F: FnMut(&S) -> bool,
    {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_while_until(guard, deadline, blocked),
            None => WaitOutcome::Ready {
                parks: self.wait_while(guard, blocked),
            },
        }
    }

    /// Wake one waiter
    #[inline]
    pub fn wake_one(&self) -> WakeResult {
        WakeResult::from_count(usize::from(self.condvar.notify_one()))
    }

    /// Wake every waiter
    #[inline]
    pub fn wake_all(&self) -> WakeResult {
        WakeResult::from_count(self.condvar.notify_all())
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("name", &self.name).finish()
    }
}
