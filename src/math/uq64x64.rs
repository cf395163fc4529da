//! Q64.64 fixed-point prices and wrapping cumulative accumulators.
//!
//! The cumulative price counters are the raw material for time-weighted
//! average prices: a consumer samples an accumulator at two instants and
//! divides the (wrapping) difference by the elapsed seconds. Wrapping is
//! deliberate and conventional for this kind of counter — only
//! differences are meaningful, and differences survive a wraparound as
//! long as the sampling window is sane.

use core::fmt;

use fixed::types::U64F64;

use crate::domain::Reserve;
use crate::error::{AmmError, Result};

/// An unsigned 64.64 fixed-point price (token-B units per token-A unit,
/// or vice versa).
///
/// Backed by [`U64F64`] from the `fixed` crate: 64 integer bits, 64
/// fractional bits, bit-for-bit deterministic across platforms. Because
/// reserves are 64-bit, any reserve ratio is representable without
/// overflow: the numerator shifted into Q64.64 form is at most
/// `2^128 − 2^64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uq64x64(U64F64);

impl Uq64x64 {
    /// Zero price.
    pub const ZERO: Self = Self(U64F64::ZERO);

    /// Encodes the ratio `numerator / denominator` in Q64.64.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] for a zero denominator.
    pub fn from_ratio(numerator: Reserve, denominator: Reserve) -> Result<Self> {
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        let bits = (u128::from(numerator.get()) << 64) / u128::from(denominator.get());
        Ok(Self(U64F64::from_bits(bits)))
    }

    /// Reconstructs a price from raw Q64.64 bits.
    #[must_use]
    pub const fn from_bits(bits: u128) -> Self {
        Self(U64F64::from_bits(bits))
    }

    /// The raw Q64.64 bit pattern.
    #[must_use]
    pub const fn to_bits(&self) -> u128 {
        self.0.to_bits()
    }

    /// Lossy conversion for display and diagnostics only.
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_num::<f64>()
    }
}

impl fmt::Display for Uq64x64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wrapping cumulative price counter.
///
/// Accumulates `price × elapsed_seconds` in raw Q64.64 bits with
/// wrapping arithmetic (overflow by design, see the module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PriceAccumulator(u128);

impl PriceAccumulator {
    /// Fresh counter.
    pub const ZERO: Self = Self(0);

    /// Adds `price × dt` to the counter, wrapping on overflow.
    #[must_use]
    pub const fn accumulate(&self, price: Uq64x64, dt: u64) -> Self {
        Self(self.0.wrapping_add(price.to_bits().wrapping_mul(dt as u128)))
    }

    /// The raw accumulated Q64.64 bits.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Time-weighted average price between two samples of the same
    /// counter, `dt` seconds apart. Uses wrapping subtraction so a
    /// counter wraparound between the samples still yields the correct
    /// difference.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] for a zero window.
    pub fn average_since(&self, earlier: &Self, dt: u64) -> Result<Uq64x64> {
        if dt == 0 {
            return Err(AmmError::DivisionByZero);
        }
        let delta = self.0.wrapping_sub(earlier.0);
        Ok(Uq64x64::from_bits(delta / u128::from(dt)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_equal_reserves_is_one() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::new(1_000), Reserve::new(1_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(p.to_bits(), 1u128 << 64);
    }

    #[test]
    fn ratio_two_to_one() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::new(2_000_000), Reserve::new(1_000_000)) else {
            panic!("expected Ok");
        };
        assert_eq!(p.to_bits(), 2u128 << 64);
    }

    #[test]
    fn fractional_ratio_floors() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::new(1), Reserve::new(3)) else {
            panic!("expected Ok");
        };
        assert_eq!(p.to_bits(), (1u128 << 64) / 3);
    }

    #[test]
    fn zero_denominator_rejected() {
        let r = Uq64x64::from_ratio(Reserve::new(1), Reserve::ZERO);
        assert_eq!(r, Err(AmmError::DivisionByZero));
    }

    #[test]
    fn max_reserve_ratio_fits() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::MAX, Reserve::new(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(p.to_bits(), u128::from(u64::MAX) << 64);
    }

    #[test]
    fn accumulate_multiplies_by_dt() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::new(2), Reserve::new(1)) else {
            panic!("expected Ok");
        };
        let acc = PriceAccumulator::ZERO.accumulate(p, 10);
        assert_eq!(acc.get(), (2u128 << 64) * 10);
    }

    #[test]
    fn accumulate_wraps() {
        let near_max = PriceAccumulator(u128::MAX);
        let wrapped = near_max.accumulate(Uq64x64::from_bits(2), 1);
        assert_eq!(wrapped.get(), 1);
    }

    #[test]
    fn average_recovers_constant_price() {
        let Ok(p) = Uq64x64::from_ratio(Reserve::new(3), Reserve::new(1)) else {
            panic!("expected Ok");
        };
        let start = PriceAccumulator::ZERO;
        let end = start.accumulate(p, 100);
        let Ok(avg) = end.average_since(&start, 100) else {
            panic!("expected Ok");
        };
        assert_eq!(avg, p);
    }

    #[test]
    fn average_across_wraparound() {
        let start = PriceAccumulator(u128::MAX - 5);
        let end = start.accumulate(Uq64x64::from_bits(2), 5); // +10, wraps
        let Ok(avg) = end.average_since(&start, 5) else {
            panic!("expected Ok");
        };
        assert_eq!(avg.to_bits(), 2);
    }

    #[test]
    fn average_zero_window_rejected() {
        let r = PriceAccumulator::ZERO.average_since(&PriceAccumulator::ZERO, 0);
        assert_eq!(r, Err(AmmError::DivisionByZero));
    }
}
