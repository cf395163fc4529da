//! Explicit rounding direction for integer division.

/// Specifies the rounding direction for division on domain types.
///
/// All division in this crate takes an explicit `Rounding` parameter so
/// that precision loss is always a visible, audited choice: quotes round
/// in the pool's favour, caller commitments round against the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}
