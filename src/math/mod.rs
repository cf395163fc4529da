//! Arithmetic utilities for the exchange engine.
//!
//! Deterministic multiply-divide lives on
//! [`Amount::mul_div`](crate::domain::Amount::mul_div); this module adds
//! the integer square root used for first-deposit share pricing and the
//! Q64.64 fixed-point machinery behind the cumulative price counters.

mod isqrt;
mod uq64x64;

pub use isqrt::isqrt;
pub use uq64x64::{PriceAccumulator, Uq64x64};
