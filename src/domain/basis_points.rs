//! Basis-point fee rate.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::{AmmError, Result};

/// Basis-point denominator (10 000 = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A fee rate expressed in basis points (1 bp = 0.01%).
///
/// Rates at or above 100% are rejected at construction, so downstream
/// fee complements (`10 000 − bps`) never reach zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// Zero fee.
    pub const ZERO: Self = Self(0);

    /// Creates a new `BasisPoints` rate.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `value` is 10 000 or
    /// more (a 100% fee makes every swap impossible).
    pub const fn new(value: u16) -> Result<Self> {
        if value as u128 >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidQuantity("fee must be below 100%"));
        }
        Ok(Self(value))
    }

    /// Returns the raw basis-point value.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Returns `true` for a zero fee.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The fee portion of `amount`: `amount × bps / 10 000`, rounded up
    /// so the fee is never undercharged by truncation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the intermediate product
    /// overflows.
    pub fn fee_of(&self, amount: &Amount) -> Result<Amount> {
        amount.mul_div(
            &Amount::new(u128::from(self.0)),
            &Amount::new(BPS_DENOMINATOR),
            Rounding::Up,
        )
    }

    /// The complement `10 000 − bps`, always non-zero.
    #[must_use]
    pub const fn complement(&self) -> u128 {
        BPS_DENOMINATOR - self.0 as u128
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_valid() {
        let Ok(bps) = BasisPoints::new(30) else {
            panic!("expected Ok");
        };
        assert_eq!(bps.get(), 30);
    }

    #[test]
    fn rejects_full_fee() {
        assert!(BasisPoints::new(10_000).is_err());
        assert!(BasisPoints::new(u16::MAX).is_err());
    }

    #[test]
    fn just_below_full_fee_allowed() {
        assert!(BasisPoints::new(9_999).is_ok());
    }

    #[test]
    fn fee_of_rounds_up() {
        let Ok(bps) = BasisPoints::new(30) else {
            panic!("expected Ok");
        };
        // ceil(1000 * 30 / 10000) = 3
        let Ok(fee) = bps.fee_of(&Amount::new(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(fee, Amount::new(3));
        // ceil(1 * 30 / 10000) = 1, never zero for non-zero input
        let Ok(min_fee) = bps.fee_of(&Amount::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(min_fee, Amount::new(1));
    }

    #[test]
    fn zero_fee_of_anything_is_zero() {
        let Ok(fee) = BasisPoints::ZERO.fee_of(&Amount::new(1_000_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(fee, Amount::ZERO);
    }

    #[test]
    fn complement_is_nonzero() {
        let Ok(bps) = BasisPoints::new(9_999) else {
            panic!("expected Ok");
        };
        assert_eq!(bps.complement(), 1);
        assert_eq!(BasisPoints::ZERO.complement(), BPS_DENOMINATOR);
    }

    #[test]
    fn display() {
        let Ok(bps) = BasisPoints::new(30) else {
            panic!("expected Ok");
        };
        assert_eq!(format!("{bps}"), "30bps");
    }
}
