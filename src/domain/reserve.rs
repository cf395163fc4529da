//! Bounded pool reserve of fixed width.

use core::fmt;

use super::Amount;
use crate::error::{AmmError, Result};

/// A pool reserve bounded to a fixed 64-bit width.
///
/// Reserves are deliberately narrower than [`Amount`] so that the
/// constant-product `k = reserve_a × reserve_b` and the Q64.64 price
/// ratio both fit a `u128` exactly, with no widening tricks. A custody
/// balance that no longer fits the reserve width is an explicit
/// [`AmmError::Overflow`] — never a silent wraparound.
///
/// # Examples
///
/// ```
/// use cpamm::domain::{Amount, Reserve};
///
/// let r = Reserve::try_from_amount(Amount::new(1_000_000)).expect("fits");
/// assert_eq!(r.get(), 1_000_000);
/// assert!(Reserve::try_from_amount(Amount::MAX).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Reserve(u64);

impl Reserve {
    /// Empty reserve.
    pub const ZERO: Self = Self(0);

    /// Maximum reserve the fixed width can hold.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a reserve from a raw `u64` value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying `u64` value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns `true` if the reserve is empty.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Widens the reserve to an [`Amount`]. Infallible.
    pub const fn as_amount(&self) -> Amount {
        Amount::new(self.0 as u128)
    }

    /// Narrows an [`Amount`] to the reserve width.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the amount exceeds the fixed
    /// reserve width.
    pub fn try_from_amount(amount: Amount) -> Result<Self> {
        u64::try_from(amount.get())
            .map(Self)
            .map_err(|_| AmmError::Overflow("balance exceeds reserve width"))
    }

    /// Constant product of two reserves.
    ///
    /// Cannot overflow: `u64 × u64` always fits `u128`.
    #[must_use]
    pub const fn product(&self, other: &Self) -> u128 {
        (self.0 as u128) * (other.0 as u128)
    }
}

impl fmt::Display for Reserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
