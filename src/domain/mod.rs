//! Fundamental domain value types for the exchange engine.
//!
//! Tokens, amounts, bounded reserves, ownership shares, deadlines,
//! routes and swap requests. All types are newtypes with validated
//! constructors; arithmetic is checked and rounding is always explicit.

mod account;
mod amount;
mod basis_points;
mod deadline;
mod pair;
mod reserve;
mod rounding;
mod route;
mod shares;
mod swap_request;
mod timestamp;
mod token;

pub use account::AccountId;
pub use amount::Amount;
pub use basis_points::{BasisPoints, BPS_DENOMINATOR};
pub use deadline::Deadline;
pub use pair::TokenPair;
pub use reserve::Reserve;
pub use rounding::Rounding;
pub use route::{Quote, Route};
pub use shares::Shares;
pub use swap_request::{SwapBound, SwapRequest};
pub use timestamp::Timestamp;
pub use token::TokenId;
