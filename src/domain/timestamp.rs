//! Seconds-resolution timestamp.

use core::fmt;

/// A point in time, in whole seconds.
///
/// Only differences matter to the engine: the cumulative-price update
/// multiplies the spot price by the elapsed seconds since the previous
/// reserve store. `elapsed_since` saturates, so a clock that steps
/// backwards yields a zero interval rather than a huge one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Epoch origin.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the timestamp in whole seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub const fn elapsed_since(&self, earlier: &Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
