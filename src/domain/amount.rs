//! Raw token amount with checked arithmetic.

use core::fmt;

use super::Rounding;
use crate::error::{AmmError, Result};

/// A raw token amount in the smallest unit.
///
/// `Amount` carries no decimal interpretation. All `u128` values are
/// valid amounts; boundedness is enforced only where an amount becomes a
/// pool reserve (see [`Reserve`](super::Reserve)).
///
/// Arithmetic is checked: operations return `None` (or an error via the
/// `safe_*` helpers) on overflow, underflow, or division by zero instead
/// of panicking.
///
/// # Examples
///
/// ```
/// use cpamm::domain::{Amount, Rounding};
///
/// let a = Amount::new(100);
/// let b = Amount::new(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::new(300)));
/// assert_eq!(b.checked_sub(&a), Some(Amount::new(100)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked division with explicit rounding direction.
    ///
    /// Returns `None` if `divisor` is zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        if divisor.0 == 0 {
            return None;
        }
        match rounding {
            Rounding::Down => Some(Self(self.0 / divisor.0)),
            Rounding::Up => {
                let q = self.0 / divisor.0;
                let r = self.0 % divisor.0;
                // q + 1 cannot overflow: r != 0 implies self.0 < u128::MAX
                // or divisor.0 > 1, either way q < u128::MAX.
                if r != 0 {
                    Some(Self(q + 1))
                } else {
                    Some(Self(q))
                }
            }
        }
    }

    /// Saturating subtraction; clamps at zero.
    #[must_use]
    pub const fn saturating_sub(&self, other: &Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked `self × other / divisor` with explicit rounding.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Overflow`] if the intermediate product exceeds `u128`.
    /// - [`AmmError::DivisionByZero`] if `divisor` is zero.
    pub fn mul_div(&self, other: &Self, divisor: &Self, rounding: Rounding) -> Result<Self> {
        let product = self
            .checked_mul(other)
            .ok_or(AmmError::Overflow("mul_div intermediate product"))?;
        product
            .checked_div(divisor, rounding)
            .ok_or(AmmError::DivisionByZero)
    }

    /// Checked addition returning an error on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] with the given context.
    pub fn safe_add(&self, other: &Self, ctx: &'static str) -> Result<Self> {
        self.checked_add(other).ok_or(AmmError::Overflow(ctx))
    }

    /// Checked subtraction returning an error on underflow.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] with the given context.
    pub fn safe_sub(&self, other: &Self, ctx: &'static str) -> Result<Self> {
        self.checked_sub(other).ok_or(AmmError::Underflow(ctx))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Construction & accessors -------------------------------------------

    #[test]
    fn new_and_get() {
        assert_eq!(Amount::new(42).get(), 42);
    }

    #[test]
    fn constants() {
        assert_eq!(Amount::ZERO.get(), 0);
        assert_eq!(Amount::MAX.get(), u128::MAX);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn is_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::new(1).is_zero());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::new(1_000_000)), "1000000");
    }

    // -- checked_add / checked_sub ------------------------------------------

    #[test]
    fn add_normal() {
        assert_eq!(
            Amount::new(100).checked_add(&Amount::new(200)),
            Some(Amount::new(300))
        );
    }

    #[test]
    fn add_overflow() {
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
    }

    #[test]
    fn sub_normal() {
        assert_eq!(
            Amount::new(300).checked_sub(&Amount::new(100)),
            Some(Amount::new(200))
        );
    }

    #[test]
    fn sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(&Amount::new(2)), None);
    }

    #[test]
    fn saturating_sub_clamps() {
        assert_eq!(
            Amount::new(1).saturating_sub(&Amount::new(5)),
            Amount::ZERO
        );
        assert_eq!(
            Amount::new(5).saturating_sub(&Amount::new(1)),
            Amount::new(4)
        );
    }

    // -- checked_mul / checked_div ------------------------------------------

    #[test]
    fn mul_normal() {
        assert_eq!(
            Amount::new(100).checked_mul(&Amount::new(200)),
            Some(Amount::new(20_000))
        );
    }

    #[test]
    fn mul_overflow() {
        assert_eq!(Amount::MAX.checked_mul(&Amount::new(2)), None);
    }

    #[test]
    fn div_remainder_round_down() {
        assert_eq!(
            Amount::new(10).checked_div(&Amount::new(3), Rounding::Down),
            Some(Amount::new(3))
        );
    }

    #[test]
    fn div_remainder_round_up() {
        assert_eq!(
            Amount::new(10).checked_div(&Amount::new(3), Rounding::Up),
            Some(Amount::new(4))
        );
    }

    #[test]
    fn div_exact_both_directions() {
        let a = Amount::new(100);
        let d = Amount::new(10);
        assert_eq!(a.checked_div(&d, Rounding::Down), Some(Amount::new(10)));
        assert_eq!(a.checked_div(&d, Rounding::Up), Some(Amount::new(10)));
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(
            Amount::new(100).checked_div(&Amount::ZERO, Rounding::Down),
            None
        );
    }

    #[test]
    fn div_max_round_up() {
        // r != 0 near the top of the range must not overflow in q + 1.
        let floor = Amount::MAX.checked_div(&Amount::new(2), Rounding::Down);
        let ceil = Amount::MAX.checked_div(&Amount::new(2), Rounding::Up);
        let Some(f) = floor else {
            panic!("expected Some");
        };
        assert_eq!(ceil, Some(Amount::new(f.get() + 1)));
    }

    // -- mul_div -------------------------------------------------------------

    #[test]
    fn mul_div_down() {
        let Ok(r) = Amount::new(1_000_000).mul_div(
            &Amount::new(1_000),
            &Amount::new(1_001_000),
            Rounding::Down,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(r, Amount::new(999));
    }

    #[test]
    fn mul_div_up() {
        let Ok(r) = Amount::new(10).mul_div(&Amount::new(10), &Amount::new(3), Rounding::Up)
        else {
            panic!("expected Ok");
        };
        assert_eq!(r, Amount::new(34));
    }

    #[test]
    fn mul_div_overflow() {
        let r = Amount::MAX.mul_div(&Amount::new(2), &Amount::new(2), Rounding::Down);
        assert!(matches!(r, Err(AmmError::Overflow(_))));
    }

    #[test]
    fn mul_div_zero_divisor() {
        let r = Amount::new(1).mul_div(&Amount::new(1), &Amount::ZERO, Rounding::Down);
        assert_eq!(r, Err(AmmError::DivisionByZero));
    }

    // -- safe helpers ---------------------------------------------------------

    #[test]
    fn safe_add_context() {
        let r = Amount::MAX.safe_add(&Amount::new(1), "test site");
        assert_eq!(r, Err(AmmError::Overflow("test site")));
    }

    #[test]
    fn safe_sub_context() {
        let r = Amount::ZERO.safe_sub(&Amount::new(1), "test site");
        assert_eq!(r, Err(AmmError::Underflow("test site")));
    }
}
