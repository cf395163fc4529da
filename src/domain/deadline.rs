//! Operation deadline with explicit zero rejection.

use core::fmt;

use super::Timestamp;
use crate::error::{AmmError, Result};

/// A caller-supplied expiry for a mutating operation.
///
/// A zero deadline is rejected outright — not treated as "no deadline" —
/// so a caller can never accidentally submit an unprotected request by
/// leaving the field defaulted. Expiry is checked once at operation
/// entry; there is no mid-operation re-check and no retry.
///
/// # Examples
///
/// ```
/// use cpamm::domain::{Deadline, Timestamp};
///
/// let d = Deadline::at(Timestamp::from_secs(100));
/// assert!(d.check(Timestamp::from_secs(100)).is_ok());
/// assert!(d.check(Timestamp::from_secs(101)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deadline(Timestamp);

impl Deadline {
    /// Wraps a timestamp as a deadline. Validity is judged at
    /// [`check`](Self::check) time, where the current clock is known.
    #[must_use]
    pub const fn at(instant: Timestamp) -> Self {
        Self(instant)
    }

    /// Returns the wrapped instant.
    #[must_use]
    pub const fn instant(&self) -> Timestamp {
        self.0
    }

    /// Fails unless the deadline is non-zero and not yet passed.
    ///
    /// The operation is still valid in the second the deadline names:
    /// expiry requires `now` strictly after the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DeadlineExpired`] for a zero deadline or one
    /// earlier than `now`.
    pub const fn check(&self, now: Timestamp) -> Result<()> {
        if self.0.as_secs() == 0 {
            return Err(AmmError::DeadlineExpired);
        }
        if self.0.as_secs() < now.as_secs() {
            return Err(AmmError::DeadlineExpired);
        }
        Ok(())
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deadline {}", self.0)
    }
}
