//! Custody account identifier.

use core::fmt;

use super::TokenPair;

/// Identifies an account that can hold token balances and pool shares.
///
/// Accounts are plain 32-byte identifiers; the engine does not model
/// signatures or allowances. The all-zero account is reserved as the
/// "null" recipient and is rejected wherever a real recipient is
/// required. [`AccountId::burn_sink`] is the unspendable account the
/// minimum-liquidity floor is locked to on a pool's first deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Creates an `AccountId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The all-zero "null" account. Invalid as a recipient.
    #[must_use]
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// The unspendable sink permanently holding minimum liquidity.
    ///
    /// No private key or code path can ever move balances out of this
    /// account; the engine simply never issues transfers from it.
    #[must_use]
    pub const fn burn_sink() -> Self {
        Self([0xffu8; 32])
    }

    /// Returns `true` for the all-zero account.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Derives the custody account for a pool over the given pair.
    ///
    /// Deterministic: the same pair always maps to the same custody
    /// account, built from both token identifiers under a fixed tag so
    /// it cannot collide with either token's own id.
    #[must_use]
    pub fn pool_custody(pair: &TokenPair) -> Self {
        let a = pair.first().as_bytes();
        let b = pair.second().as_bytes();
        let mut out = [0u8; 32];
        // Tag byte keeps pool custody ids out of the token-id space.
        out[0] = 0x50; // 'P'
        for i in 1..32 {
            out[i] = a[i].wrapping_mul(31).wrapping_add(b[i]).wrapping_add(i as u8);
        }
        Self(out)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}…",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::TokenId;

    fn pair() -> TokenPair {
        let a = TokenId::from_bytes([1u8; 32]);
        let b = TokenId::from_bytes([2u8; 32]);
        let Ok(p) = TokenPair::new(a, b) else {
            panic!("valid pair");
        };
        p
    }

    #[test]
    fn null_is_null() {
        assert!(AccountId::null().is_null());
        assert!(!AccountId::burn_sink().is_null());
    }

    #[test]
    fn burn_sink_is_stable() {
        assert_eq!(AccountId::burn_sink(), AccountId::burn_sink());
    }

    #[test]
    fn pool_custody_is_deterministic() {
        assert_eq!(AccountId::pool_custody(&pair()), AccountId::pool_custody(&pair()));
    }

    #[test]
    fn pool_custody_differs_per_pair() {
        let a = TokenId::from_bytes([1u8; 32]);
        let c = TokenId::from_bytes([3u8; 32]);
        let Ok(other) = TokenPair::new(a, c) else {
            panic!("valid pair");
        };
        assert_ne!(
            AccountId::pool_custody(&pair()),
            AccountId::pool_custody(&other)
        );
    }

    #[test]
    fn pool_custody_is_order_independent() {
        let a = TokenId::from_bytes([1u8; 32]);
        let b = TokenId::from_bytes([2u8; 32]);
        let (Ok(p1), Ok(p2)) = (TokenPair::new(a, b), TokenPair::new(b, a)) else {
            panic!("valid pairs");
        };
        assert_eq!(AccountId::pool_custody(&p1), AccountId::pool_custody(&p2));
    }
}
