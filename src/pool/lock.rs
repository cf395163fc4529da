//! Per-pool entry lock with same-thread reentrancy detection.
//!
//! Flash swaps hand control to caller code mid-operation. If that code
//! calls back into the same pool's mutating surface on the same thread,
//! blocking on a plain mutex would deadlock; the correct answer is an
//! immediate error. Cross-thread contention is ordinary and simply
//! waits.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::error::{AmmError, Result};

// 0 is reserved for "no holder", so thread ids start at 1.
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// Serializes a pool's mutating operations.
#[derive(Debug, Default)]
pub(crate) struct EntryLock {
    mutex: Mutex<()>,
    holder: AtomicU64,
}

/// RAII witness that the entry lock is held.
pub(crate) struct EntryGuard<'a> {
    lock: &'a EntryLock,
    _guard: MutexGuard<'a, ()>,
}

impl EntryLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, or fails if this thread already holds it.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Reentrancy`] on same-thread re-acquisition.
    pub(crate) fn enter(&self) -> Result<EntryGuard<'_>> {
        let me = current_thread_id();
        if self.holder.load(Ordering::Acquire) == me {
            return Err(AmmError::Reentrancy);
        }
        let guard = self.mutex.lock();
        self.holder.store(me, Ordering::Release);
        Ok(EntryGuard {
            lock: self,
            _guard: guard,
        })
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.lock.holder.store(0, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn reacquire_on_same_thread_fails() {
        let lock = EntryLock::new();
        let Ok(_guard) = lock.enter() else {
            panic!("first acquisition");
        };
        assert!(matches!(lock.enter(), Err(AmmError::Reentrancy)));
    }

    #[test]
    fn release_allows_reacquisition() {
        let lock = EntryLock::new();
        {
            let Ok(_guard) = lock.enter() else {
                panic!("first acquisition");
            };
        }
        let Ok(_guard) = lock.enter() else {
            panic!("second acquisition");
        };
    }

    #[test]
    fn other_thread_waits_instead_of_failing() {
        use std::sync::Arc;

        let lock = Arc::new(EntryLock::new());
        let Ok(guard) = lock.enter() else {
            panic!("acquisition");
        };
        let other = Arc::clone(&lock);
        let handle = std::thread::spawn(move || other.enter().is_ok());
        // Give the spawned thread a moment to block on the mutex.
        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(guard);
        let Ok(acquired) = handle.join() else {
            panic!("join");
        };
        assert!(acquired);
    }
}
