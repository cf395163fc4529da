//! Pool ownership share units.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::{AmmError, Result};

/// Fungible units representing proportional ownership of a pool's
/// reserves.
///
/// Distinct from [`Amount`] because shares measure a claim on the pool,
/// not a quantity of either underlying token. Shares are minted on
/// deposit, destroyed on redemption, and a minimum floor is permanently
/// locked on the very first deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Shares(u128);

impl Shares {
    /// No shares.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Shares` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if no shares.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] on overflow.
    pub fn safe_add(&self, other: &Self, ctx: &'static str) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow(ctx))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] on underflow.
    pub fn safe_sub(&self, other: &Self, ctx: &'static str) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(AmmError::Underflow(ctx))
    }

    /// Pro-rata claim: `self × balance / total`, with explicit rounding.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Overflow`] if the intermediate product overflows.
    /// - [`AmmError::DivisionByZero`] if `total` is zero.
    pub fn pro_rata(&self, balance: &Amount, total: &Self, rounding: Rounding) -> Result<Amount> {
        Amount::new(self.0).mul_div(balance, &Amount::new(total.0), rounding)
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
