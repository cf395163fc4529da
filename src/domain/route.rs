//! Swap routes and per-hop quotes.

use core::fmt;

use super::{Amount, TokenId, TokenPair};
use crate::error::{AmmError, Result};

/// An ordered sequence of two or more token identifiers.
///
/// Each adjacent pair is one hop and must resolve to an existing pool
/// via the registry. Adjacent tokens must be distinct (a hop from a
/// token to itself is meaningless); non-adjacent repetition is allowed —
/// a route may legitimately pass through a token twice.
///
/// Routes are ephemeral: validated once at construction and scoped to a
/// single quote or execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route(Vec<TokenId>);

impl Route {
    /// Validates and wraps a token sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPath`] if fewer than two tokens are
    /// given or any adjacent pair repeats a token.
    pub fn new(tokens: Vec<TokenId>) -> Result<Self> {
        if tokens.len() < 2 {
            return Err(AmmError::InvalidPath("route needs at least two tokens"));
        }
        for window in tokens.windows(2) {
            if window[0] == window[1] {
                return Err(AmmError::InvalidPath("route repeats a token across a hop"));
            }
        }
        Ok(Self(tokens))
    }

    /// Returns the token sequence.
    #[must_use]
    pub fn tokens(&self) -> &[TokenId] {
        &self.0
    }

    /// Number of hops (`tokens − 1`).
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// The route's input token.
    #[must_use]
    pub fn input(&self) -> TokenId {
        self.0[0]
    }

    /// The route's output token.
    #[must_use]
    pub fn output(&self) -> TokenId {
        self.0[self.0.len() - 1]
    }

    /// Iterates the route's hops as `(token_in, token_out)` pairs.
    pub fn hops(&self) -> impl Iterator<Item = (TokenId, TokenId)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    /// The canonical pairs this route touches, one per hop.
    ///
    /// # Errors
    ///
    /// Cannot fail for a validated route; kept fallible because
    /// [`TokenPair::new`] is.
    pub fn pairs(&self) -> Result<Vec<TokenPair>> {
        self.hops()
            .map(|(a, b)| TokenPair::new(a, b))
            .collect::<Result<Vec<_>>>()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.0 {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "{token}")?;
            first = false;
        }
        Ok(())
    }
}

/// Per-hop amounts for a route, computed by the same formula the pools
/// enforce.
///
/// `amounts()[0]` is the route input; the last element is the final
/// output. Like [`Route`], a quote is ephemeral and meaningful only
/// against the reserve snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote(Vec<Amount>);

impl Quote {
    /// Wraps per-hop amounts. The length must be the route's token
    /// count; the router upholds this.
    pub(crate) fn new(amounts: Vec<Amount>) -> Self {
        Self(amounts)
    }

    /// All per-hop amounts, input first.
    #[must_use]
    pub fn amounts(&self) -> &[Amount] {
        &self.0
    }

    /// The route input amount.
    #[must_use]
    pub fn input(&self) -> Amount {
        self.0.first().copied().unwrap_or(Amount::ZERO)
    }

    /// The final output amount.
    #[must_use]
    pub fn output(&self) -> Amount {
        self.0.last().copied().unwrap_or(Amount::ZERO)
    }
}
