//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use cpamm::prelude::*;
//! ```

// Re-export domain types
pub use crate::domain::{
    AccountId, Amount, BasisPoints, Deadline, Quote, Reserve, Rounding, Route, Shares, SwapBound,
    SwapRequest, Timestamp, TokenId, TokenPair,
};

// Re-export the custody and time seams
pub use crate::ledger::{InMemoryLedger, TokenLedger};
pub use crate::time::{Clock, ManualClock, SystemClock};

// Re-export the engine surface
pub use crate::pool::{Pool, SwapCallback};
pub use crate::registry::{Registry, RegistryConfig};
pub use crate::router::Router;

// Re-export error types
pub use crate::error::{AmmError, Result};
