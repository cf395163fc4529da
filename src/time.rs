//! Clock abstraction.
//!
//! Pools read time once per mutating operation (for the cumulative
//! price update) and routers read it once per request (for the deadline
//! check). Both go through [`Clock`] so tests can drive `dt` precisely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant, whole seconds.
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by [`SystemTime`], UNIX epoch origin.
///
/// A clock reading before the epoch (a badly misconfigured host) maps
/// to zero rather than failing; `Timestamp` differences saturate, so
/// the engine degrades to zero-length intervals instead of panicking.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp::from_secs(secs)
    }
}

/// Settable clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    /// Creates a clock starting at the given second.
    #[must_use]
    pub fn starting_at(secs: u64) -> Self {
        Self(AtomicU64::new(secs))
    }

    /// Sets the clock to an absolute second.
    pub fn set(&self, secs: u64) {
        self.0.store(secs, Ordering::SeqCst);
    }

    /// Advances the clock by the given seconds.
    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.0.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::starting_at(100);
        assert_eq!(clock.now(), Timestamp::from_secs(100));
        clock.advance(30);
        assert_eq!(clock.now(), Timestamp::from_secs(130));
        clock.set(7);
        assert_eq!(clock.now(), Timestamp::from_secs(7));
    }

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now() > Timestamp::ZERO);
    }
}
