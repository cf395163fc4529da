//! Multi-hop swap example.
//!
//! Demonstrates creating two constant product pools, quoting a two-hop
//! route, and executing it through the router with slippage and
//! deadline protection.
//!
//! # Run
//!
//! ```bash
//! cargo run --example multi_hop
//! ```

use std::sync::Arc;

use cpamm::domain::{AccountId, Amount, Deadline, Route, Timestamp, TokenId};
use cpamm::ledger::{InMemoryLedger, TokenLedger};
use cpamm::math::Uq64x64;
use cpamm::registry::{Registry, RegistryConfig};
use cpamm::router::Router;
use cpamm::time::{Clock, SystemClock};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Multi-hop swap (x · y = k) ===\n");

    // ── 1. Shared collaborators ─────────────────────────────────────────
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = Arc::new(SystemClock);
    let registry = Arc::new(Registry::new(
        RegistryConfig::default(),
        Arc::clone(&ledger) as Arc<dyn TokenLedger>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )?);
    let router = Router::new(
        AccountId::from_bytes([0x70; 32]),
        Arc::clone(&registry),
        Arc::clone(&ledger) as Arc<dyn TokenLedger>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )?;

    // ── 2. Three tokens, two pools: usdc/weth and weth/wbtc ─────────────
    let usdc = TokenId::from_bytes([1u8; 32]);
    let weth = TokenId::from_bytes([2u8; 32]);
    let wbtc = TokenId::from_bytes([3u8; 32]);

    let alice = AccountId::from_bytes([0xa1; 32]);
    for token in [usdc, weth, wbtc] {
        ledger.mint(token, alice, Amount::new(10_000_000))?;
    }
    for (x, y) in [(usdc, weth), (weth, wbtc)] {
        registry.create_pool(x, y)?;
        let shares = registry.add_liquidity(
            x,
            y,
            Amount::new(1_000_000),
            Amount::new(1_000_000),
            alice,
            alice,
        )?;
        println!("Seeded pool {x}/{y}: {shares} shares minted");
    }

    // ── 3. Quote the route before committing ────────────────────────────
    let route = Route::new(vec![usdc, weth, wbtc])?;
    let amount_in = Amount::new(10_000);
    let quote = router.get_amounts_out(amount_in, &route)?;
    println!("\nQuote for {amount_in} USDC over USDC→WETH→WBTC:");
    for (i, amount) in quote.amounts().iter().enumerate() {
        println!("  leg {i}: {amount}");
    }

    // ── 4. Execute with the quote as the minimum ────────────────────────
    let deadline = Deadline::at(Timestamp::from_secs(
        clock.now().as_secs().saturating_add(60),
    ));
    let bob = AccountId::from_bytes([0xb0; 32]);
    let realized = router.swap_exact_tokens_for_tokens(
        amount_in,
        quote.output(),
        &route,
        alice,
        bob,
        deadline,
    )?;
    println!("\nExecuted: {} WBTC delivered to bob", realized.output());
    println!("Bob's balance: {}", ledger.balance_of(wbtc, bob));

    // ── 5. An exact-output swap in the other direction ──────────────────
    let back = Route::new(vec![wbtc, weth, usdc])?;
    let need = router.get_amounts_in(Amount::new(5_000), &back)?;
    println!(
        "\nBuying exactly 5 000 USDC back costs at most {} WBTC",
        need.input()
    );
    ledger.mint(wbtc, bob, need.input())?;
    let bought = router.swap_tokens_for_exact_tokens(
        Amount::new(5_000),
        need.input(),
        &back,
        bob,
        bob,
        deadline,
    )?;
    println!("Realized output: {} USDC", bought.output());

    // ── 6. Spot price after the round trip ──────────────────────────────
    let pool = router.get_pool(usdc, weth)?;
    let (reserve_a, reserve_b, _) = pool.get_reserves();
    let spot = Uq64x64::from_ratio(reserve_b, reserve_a)?;
    println!(
        "\nSpot price in the {}/{} pool: {:.6} (token B per token A)",
        usdc,
        weth,
        spot.to_f64_lossy()
    );

    Ok(())
}
