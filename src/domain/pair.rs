//! Ordered pair of distinct tokens.

use core::fmt;

use super::TokenId;
use crate::error::{AmmError, Result};

/// An ordered pair of distinct tokens, canonically sorted by identifier.
///
/// The canonical ordering guarantees `first() < second()`, preventing
/// duplicate pairs such as `(A, B)` and `(B, A)` from mapping to
/// different pools. The pair is set exactly once at pool creation and is
/// immutable thereafter.
///
/// # Examples
///
/// ```
/// use cpamm::domain::{TokenId, TokenPair};
///
/// let a = TokenId::from_bytes([1u8; 32]);
/// let b = TokenId::from_bytes([2u8; 32]);
///
/// // Order is enforced automatically:
/// let pair = TokenPair::new(b, a).expect("distinct tokens");
/// assert_eq!(pair.first(), a);
/// assert_eq!(pair.second(), b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenPair {
    token_a: TokenId,
    token_b: TokenId,
}

impl TokenPair {
    /// Creates a new canonically-ordered `TokenPair`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if both tokens are identical.
    pub fn new(token1: TokenId, token2: TokenId) -> Result<Self> {
        if token1 == token2 {
            return Err(AmmError::InvalidToken(
                "token pair requires two distinct identifiers",
            ));
        }

        let (token_a, token_b) = if token1 < token2 {
            (token1, token2)
        } else {
            (token2, token1)
        };

        Ok(Self { token_a, token_b })
    }

    /// Returns the first token (lower identifier).
    #[must_use]
    pub const fn first(&self) -> TokenId {
        self.token_a
    }

    /// Returns the second token (higher identifier).
    #[must_use]
    pub const fn second(&self) -> TokenId {
        self.token_b
    }

    /// Returns `true` if the given token is part of this pair.
    #[must_use]
    pub fn contains(&self, token: &TokenId) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    /// Returns the counterpart of `token` in this pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not in the pair.
    pub fn other(&self, token: &TokenId) -> Result<TokenId> {
        if *token == self.token_a {
            Ok(self.token_b)
        } else if *token == self.token_b {
            Ok(self.token_a)
        } else {
            Err(AmmError::InvalidToken("token is not part of this pair"))
        }
    }

    /// Returns `true` if `token` is the pair's first (lower) token.
    ///
    /// Used to orient caller-supplied `(in, out)` directions onto the
    /// pair's canonical `(a, b)` storage order.
    #[must_use]
    pub fn is_first(&self, token: &TokenId) -> bool {
        self.token_a == *token
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_a, self.token_b)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tok(byte: u8) -> TokenId {
        TokenId::from_bytes([byte; 32])
    }

    #[test]
    fn valid_pair_preserves_order() {
        let Ok(pair) = TokenPair::new(tok(1), tok(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.first(), tok(1));
        assert_eq!(pair.second(), tok(2));
    }

    #[test]
    fn auto_sorts_reversed_input() {
        let Ok(pair) = TokenPair::new(tok(2), tok(1)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.first(), tok(1));
        assert_eq!(pair.second(), tok(2));
    }

    #[test]
    fn rejects_identical_tokens() {
        let Err(e) = TokenPair::new(tok(1), tok(1)) else {
            panic!("expected Err");
        };
        assert!(matches!(e, AmmError::InvalidToken(_)));
    }

    #[test]
    fn contains_both_members_only() {
        let Ok(pair) = TokenPair::new(tok(1), tok(2)) else {
            panic!("expected Ok");
        };
        assert!(pair.contains(&tok(1)));
        assert!(pair.contains(&tok(2)));
        assert!(!pair.contains(&tok(3)));
    }

    #[test]
    fn other_returns_counterpart() {
        let Ok(pair) = TokenPair::new(tok(1), tok(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(pair.other(&tok(1)), Ok(tok(2)));
        assert_eq!(pair.other(&tok(2)), Ok(tok(1)));
        assert!(pair.other(&tok(3)).is_err());
    }

    #[test]
    fn is_first_orients_direction() {
        let Ok(pair) = TokenPair::new(tok(2), tok(1)) else {
            panic!("expected Ok");
        };
        assert!(pair.is_first(&tok(1)));
        assert!(!pair.is_first(&tok(2)));
    }

    #[test]
    fn equality_of_pairs_ignores_argument_order() {
        let (Ok(p1), Ok(p2)) = (TokenPair::new(tok(1), tok(2)), TokenPair::new(tok(2), tok(1)))
        else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
    }
}
