//! Integer square root.

/// Integer square root via Newton's method.
///
/// Returns `floor(sqrt(n))`. Converges for all `u128` inputs; the
/// initial guess `n` is always at or above the true root, and each step
/// strictly decreases until the fixed point.
#[must_use]
pub const fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = n.div_ceil(2);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
