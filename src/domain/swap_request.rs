//! Validated multi-hop swap request.

use super::{AccountId, Amount, Deadline};
use crate::error::{AmmError, Result};

/// The constraint side of a swap request: exactly one of input or output
/// is fixed, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapBound {
    /// Fixed input; the caller demands at least `min_out` back.
    ExactIn {
        /// The fixed input amount (non-zero).
        amount_in: Amount,
        /// Minimum acceptable final output (non-zero).
        min_out: Amount,
    },
    /// Fixed output; the caller commits at most `max_in`.
    ExactOut {
        /// The required output amount (non-zero).
        amount_out: Amount,
        /// Maximum input the caller will fund (non-zero).
        max_in: Amount,
    },
}

/// A fully validated swap request, scoped to a single route execution.
///
/// Construction enforces the precondition class of checks (non-zero
/// amounts, a real recipient); the deadline is checked against the
/// clock at execution entry, and the route is validated separately by
/// [`Route`](super::Route).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    bound: SwapBound,
    recipient: AccountId,
    deadline: Deadline,
}

impl SwapRequest {
    /// Builds an exact-input request.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] for a zero input or zero minimum.
    /// - [`AmmError::InvalidRecipient`] for the null account.
    pub fn exact_in(
        amount_in: Amount,
        min_out: Amount,
        recipient: AccountId,
        deadline: Deadline,
    ) -> Result<Self> {
        if amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("swap input must be non-zero"));
        }
        if min_out.is_zero() {
            return Err(AmmError::InvalidQuantity(
                "minimum output must be non-zero",
            ));
        }
        Self::with_recipient(SwapBound::ExactIn { amount_in, min_out }, recipient, deadline)
    }

    /// Builds an exact-output request.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] for a zero output or zero maximum.
    /// - [`AmmError::InvalidRecipient`] for the null account.
    pub fn exact_out(
        amount_out: Amount,
        max_in: Amount,
        recipient: AccountId,
        deadline: Deadline,
    ) -> Result<Self> {
        if amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("swap output must be non-zero"));
        }
        if max_in.is_zero() {
            return Err(AmmError::InvalidQuantity("maximum input must be non-zero"));
        }
        Self::with_recipient(SwapBound::ExactOut { amount_out, max_in }, recipient, deadline)
    }

    fn with_recipient(bound: SwapBound, recipient: AccountId, deadline: Deadline) -> Result<Self> {
        if recipient.is_null() {
            return Err(AmmError::InvalidRecipient("recipient must not be null"));
        }
        Ok(Self {
            bound,
            recipient,
            deadline,
        })
    }

    /// The constraint side.
    #[must_use]
    pub const fn bound(&self) -> SwapBound {
        self.bound
    }

    /// The final-hop recipient.
    #[must_use]
    pub const fn recipient(&self) -> AccountId {
        self.recipient
    }

    /// The request deadline.
    #[must_use]
    pub const fn deadline(&self) -> Deadline {
        self.deadline
    }
}
