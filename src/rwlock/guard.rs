/*!
 * Lock Guards
 *
 * RAII guards pairing every acquire with exactly one release.
 */

use super::lock::ReaderWriterLock;
use std::fmt;

/// Read access held until drop
#[must_use = "read access is released as soon as the guard is dropped"]
pub struct ReadGuard<'a> {
    lock: &'a ReaderWriterLock,
}

impl<'a> ReadGuard<'a> {
    pub(super) fn new(lock: &'a ReaderWriterLock) -> Self {
        Self { lock }
    }

    /// The lock this guard holds
    pub fn lock(&self) -> &'a ReaderWriterLock {
        self.lock
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        // A failure here means someone released our share through the raw
        // API; release_read has already logged it
        let _ = self.lock.release_read();
    }
}

impl fmt::Debug for ReadGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadGuard").finish_non_exhaustive()
    }
}

/// Exclusive write access held until drop
#[must_use = "write access is released as soon as the guard is dropped"]
pub struct WriteGuard<'a> {
    lock: &'a ReaderWriterLock,
}

impl<'a> WriteGuard<'a> {
    pub(super) fn new(lock: &'a ReaderWriterLock) -> Self {
        Self { lock }
    }

    pub fn lock(&self) -> &'a ReaderWriterLock {
        self.lock
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        let _ = self.lock.release_write();
    }
}

impl fmt::Debug for WriteGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard").finish_non_exhaustive()
    }
}
