//! Chain-agnostic token identifier.

use core::fmt;

/// A generic, chain-agnostic identifier for a token.
///
/// Wraps a fixed-size `[u8; 32]` byte array. All 32-byte sequences are
/// valid identifiers, so construction is infallible. The `Ord`
/// implementation is lexicographic over the bytes and is what
/// [`TokenPair`](super::TokenPair) uses for canonical ordering.
///
/// # Examples
///
/// ```
/// use cpamm::domain::TokenId;
///
/// let id = TokenId::from_bytes([1u8; 32]);
/// assert_eq!(id.as_bytes(), [1u8; 32]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// Creates a `TokenId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for TokenId {
    /// Hex of the first four bytes; enough to tell tokens apart in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}…",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}
