//! Property-based tests using `proptest` for the pool's numeric
//! invariants.
//!
//! 1. **Product preservation** — a prepaid swap never decreases the
//!    reserve product.
//! 2. **Round-trip safety** — mint immediately followed by burn never
//!    returns more than was deposited.
//! 3. **Dilution safety** — a follow-up deposit never redeems for more
//!    than it put in.
//! 4. **Quote coverage** — feeding the exact-out quote through the
//!    forward formula always clears the requested output.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::domain::{Amount, Reserve, Rounding, Shares};
use crate::ledger::{InMemoryLedger, TokenLedger};
use crate::registry::{Registry, RegistryConfig};
use crate::time::ManualClock;

use super::tests::{acct, fixture, seed, tok};

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Reserve values in [10_000, 10_000_000]: large enough to clear the
/// first-deposit floor, small enough to stay far from reserve width.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000u128
}

/// Swap fees from free to 1%.
fn fee_strategy() -> impl Strategy<Value = u16> {
    0u16..=100u16
}

fn quote_registry(fee_bps: u16) -> Registry {
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = Arc::new(ManualClock::starting_at(0));
    let Ok(registry) = Registry::new(
        RegistryConfig {
            fee_bps,
            ..RegistryConfig::default()
        },
        ledger as Arc<dyn TokenLedger>,
        clock,
    ) else {
        panic!("valid registry config");
    };
    registry
}

// ---------------------------------------------------------------------------
// Property 1: Product preservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_prepaid_swap_never_decreases_product(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let fx = fixture();
        seed(&fx, ra, rb);
        let (r_a, r_b, _) = fx.pool.get_reserves();
        let before = r_a.product(&r_b);

        let amount_in = (ra / 100).max(10);
        let out = rb * amount_in / (ra + amount_in);
        prop_assume!(out > 0);

        prop_assert!(fx
            .ledger
            .mint(tok(1), fx.pool.custody(), Amount::new(amount_in))
            .is_ok());
        prop_assert!(fx
            .pool
            .swap(Amount::ZERO, Amount::new(out), acct(20), &[], None, &fx.key)
            .is_ok());

        let (r_a, r_b, _) = fx.pool.get_reserves();
        prop_assert!(r_a.product(&r_b) >= before);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Round-trip safety
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_mint_burn_never_profits(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
    ) {
        let fx = fixture();
        let shares = seed(&fx, ra, rb);
        prop_assert!(fx
            .pool
            .transfer_shares(acct(10), fx.pool.custody(), shares)
            .is_ok());

        let Ok((out_a, out_b)) = fx.pool.burn(acct(10), &fx.key) else {
            return Err(TestCaseError::fail("burn failed"));
        };
        prop_assert!(out_a.get() <= ra);
        prop_assert!(out_b.get() <= rb);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Dilution safety
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_second_deposit_never_profits(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        da in 1_000u128..=1_000_000u128,
        db in 1_000u128..=1_000_000u128,
    ) {
        let fx = fixture();
        seed(&fx, ra, rb);
        let custody = fx.pool.custody();
        prop_assert!(fx.ledger.mint(tok(1), custody, Amount::new(da)).is_ok());
        prop_assert!(fx.ledger.mint(tok(2), custody, Amount::new(db)).is_ok());

        let Ok(minted) = fx.pool.mint(acct(11), &fx.key) else {
            // A deposit can round to zero shares; that is a rejection,
            // not a profit.
            return Ok(());
        };

        // Redeeming the freshly minted shares must not exceed the
        // deposit on either side.
        let total = fx.pool.total_shares();
        let (r_a, r_b, _) = fx.pool.get_reserves();
        let Ok(value_a) = minted.pro_rata(&r_a.as_amount(), &total, Rounding::Down) else {
            return Err(TestCaseError::fail("pro rata"));
        };
        let Ok(value_b) = minted.pro_rata(&r_b.as_amount(), &total, Rounding::Down) else {
            return Err(TestCaseError::fail("pro rata"));
        };
        prop_assert!(value_a.get() <= da);
        prop_assert!(value_b.get() <= db);
        prop_assert!(minted > Shares::new(0));
    }
}

// ---------------------------------------------------------------------------
// Property 4: Quote coverage
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_out_quote_covers_request(
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
        fee_bps in fee_strategy(),
        out_frac in 1u128..=100u128,
    ) {
        let registry = quote_registry(fee_bps);
        let want = (r_out * out_frac / 200).max(1);
        prop_assume!(want < r_out);

        let (reserve_in, reserve_out) = (
            Reserve::new(r_in as u64),
            Reserve::new(r_out as u64),
        );
        let Ok(gross) = registry.quote_in(Amount::new(want), reserve_in, reserve_out) else {
            return Err(TestCaseError::fail("quote_in"));
        };
        let Ok(got) = registry.quote_out(gross, reserve_in, reserve_out) else {
            return Err(TestCaseError::fail("quote_out"));
        };
        prop_assert!(got.get() >= want);
    }
}
