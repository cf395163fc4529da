//! # cpamm
//!
//! Constant-product exchange engine: pools holding paired token
//! reserves, proportional ownership shares, and a multi-hop router
//! with slippage and deadline protection.
//!
//! The core is a [`Pool`](pool::Pool) custodying two reserves under the
//! rule that their product never decreases across a swap. Around it sit
//! a [`Registry`](registry::Registry) that creates pools and applies
//! fee policy, and a [`Router`](router::Router) that quotes and
//! executes chained swaps, measuring balance deltas per hop so
//! fee-on-transfer tokens anywhere in a route are tolerated.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cpamm::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let ledger = Arc::new(InMemoryLedger::new());
//! let clock = Arc::new(SystemClock);
//!
//! let registry = Arc::new(Registry::new(
//!     RegistryConfig::default(),
//!     Arc::clone(&ledger) as Arc<dyn TokenLedger>,
//!     Arc::clone(&clock) as Arc<dyn Clock>,
//! )?);
//! let router = Router::new(
//!     AccountId::from_bytes([0x0a; 32]),
//!     Arc::clone(&registry),
//!     Arc::clone(&ledger) as Arc<dyn TokenLedger>,
//!     Arc::clone(&clock) as Arc<dyn Clock>,
//! )?;
//!
//! // Two tokens and a funded liquidity provider.
//! let (gold, iron) = (
//!     TokenId::from_bytes([1u8; 32]),
//!     TokenId::from_bytes([2u8; 32]),
//! );
//! let alice = AccountId::from_bytes([0xa1; 32]);
//! ledger.mint(gold, alice, Amount::new(2_000_000))?;
//! ledger.mint(iron, alice, Amount::new(1_000_000))?;
//!
//! // Create and seed the pool, then swap through the router.
//! registry.create_pool(gold, iron)?;
//! registry.add_liquidity(
//!     gold,
//!     iron,
//!     Amount::new(1_000_000),
//!     Amount::new(1_000_000),
//!     alice,
//!     alice,
//! )?;
//!
//! let route = Route::new(vec![gold, iron])?;
//! let quote = router.get_amounts_out(Amount::new(10_000), &route)?;
//! let realized = router.swap_exact_tokens_for_tokens(
//!     Amount::new(10_000),
//!     quote.output(),
//!     &route,
//!     alice,
//!     alice,
//!     Deadline::at(Timestamp::from_secs(u64::MAX)),
//! )?;
//! assert_eq!(realized.output(), quote.output());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Reserve`](domain::Reserve), [`Shares`](domain::Shares), [`Route`](domain::Route), … |
//! | [`math`] | Integer square root and the Q64.64 price accumulator |
//! | [`ledger`] | [`TokenLedger`](ledger::TokenLedger) custody seam with journaled undo |
//! | [`time`] | [`Clock`](time::Clock) seam, system and manual clocks |
//! | [`pool`] | [`Pool`](pool::Pool): mint, burn, swap, flash swaps, accumulators |
//! | [`registry`] | Pool creation, fee policy, the pool authority key |
//! | [`router`] | Multi-hop quotes and execution, liquidity ratio management |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod domain;
pub mod error;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod time;
