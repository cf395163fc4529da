//! Unified error types for the constant-product exchange engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type. The variants fall into four classes:
//!
//! - **Precondition violations** — zero amounts, bad recipients, short
//!   paths, missing pools. Synchronous, never retried.
//! - **Invariant violations** — a reserve-product decrease or an overflow
//!   past the reserve width. These signal either a malicious token or an
//!   implementation defect and are never silently tolerated.
//! - **Guard violations** — reentrant entry into a locked pool, or a
//!   caller presenting a foreign registry key.
//! - **Economic-protection violations** — output below minimum, input
//!   above maximum, expired deadline, first deposit below the
//!   anti-inflation floor. Expected, caller-recoverable outcomes.
//!
//! Every error aborts the entire atomic operation it occurred in,
//! including any transfers already performed within it.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Unified error enum for pool, registry and router operations.
///
/// Variants that benefit from context carry a `&'static str` payload
/// describing the failing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    /// A mutating pool entry point was called with a key that was not
    /// issued by the pool's own registry.
    #[error("caller is not the pool's registry")]
    Unauthorized,

    /// A mutating pool entry point was re-entered by the thread that
    /// already holds the pool's entry lock.
    #[error("reentrant call into a locked pool")]
    Reentrancy,

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A core numeric invariant did not hold after an operation.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),

    /// A token identifier was invalid in context.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// A swap path was malformed.
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),

    /// A recipient account was invalid in context.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(&'static str),

    /// A quantity was invalid in context (zero where non-zero required).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// No pool exists for the requested token pair.
    #[error("pool does not exist for the requested pair")]
    PoolNotFound,

    /// A pool already exists for the requested token pair.
    #[error("pool already exists for the requested pair")]
    PoolAlreadyExists,

    /// The first deposit's `sqrt(amount_a × amount_b)` was at or below
    /// the configured minimum-liquidity floor.
    #[error("first deposit below the minimum-liquidity floor")]
    InitialDepositTooSmall,

    /// A deposit would mint zero shares.
    #[error("deposit too small to mint shares")]
    InsufficientLiquidityMinted,

    /// A redemption would return zero of at least one token.
    #[error("redemption too small to return both tokens")]
    InsufficientLiquidityBurned,

    /// Pool reserves cannot satisfy the requested amounts.
    #[error("insufficient liquidity in pool")]
    InsufficientLiquidity,

    /// A swap delivered no input to the pool.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// Realized output fell below the caller's minimum.
    #[error("output below the caller's minimum")]
    InsufficientOutputAmount,

    /// The first token's deposit fell below the caller's minimum.
    #[error("token-A amount below the caller's minimum")]
    InsufficientAAmount,

    /// The second token's deposit fell below the caller's minimum.
    #[error("token-B amount below the caller's minimum")]
    InsufficientBAmount,

    /// Required input exceeded the caller's maximum.
    #[error("input above the caller's maximum")]
    ExcessiveInputAmount,

    /// The operation's deadline was zero or already in the past.
    #[error("deadline expired or zero")]
    DeadlineExpired,

    /// A ledger account lacked the balance for a transfer.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(&'static str),

    /// Non-empty callback data was supplied without a callback.
    #[error("callback data supplied without a callback")]
    CallbackRequired,
}
