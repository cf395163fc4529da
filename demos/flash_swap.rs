//! Flash swap example.
//!
//! Demonstrates the optimistic-transfer-then-callback protocol: the
//! pool pays out first, a callback delivers the repayment, and the
//! product check settles the account.
//!
//! # Run
//!
//! ```bash
//! cargo run --example flash_swap
//! ```

use std::sync::Arc;

use cpamm::domain::{AccountId, Amount, TokenId};
use cpamm::ledger::{InMemoryLedger, TokenLedger};
use cpamm::pool::SwapCallback;
use cpamm::registry::{Registry, RegistryConfig};
use cpamm::time::{Clock, SystemClock};

/// Borrows one side of the pool and repays in the other before the
/// swap completes.
struct CrossRepay {
    ledger: Arc<InMemoryLedger>,
    repay_token: TokenId,
    pool_custody: AccountId,
    repay: Amount,
}

impl SwapCallback for CrossRepay {
    fn on_swap(
        &self,
        recipient: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        _data: &[u8],
    ) -> cpamm::error::Result<()> {
        println!("  callback: borrowed a={amount_a} b={amount_b}, repaying {}", self.repay);
        self.ledger
            .transfer(self.repay_token, recipient, self.pool_custody, self.repay)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Flash swap ===\n");

    // ── 1. A seeded parity pool ─────────────────────────────────────────
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = Arc::new(SystemClock);
    let registry = Registry::new(
        RegistryConfig::default(),
        Arc::clone(&ledger) as Arc<dyn TokenLedger>,
        clock as Arc<dyn Clock>,
    )?;

    let gold = TokenId::from_bytes([1u8; 32]);
    let iron = TokenId::from_bytes([2u8; 32]);
    let alice = AccountId::from_bytes([0xa1; 32]);
    ledger.mint(gold, alice, Amount::new(1_000_000))?;
    ledger.mint(iron, alice, Amount::new(1_000_000))?;
    let pool = registry.create_pool(gold, iron)?;
    registry.add_liquidity(
        gold,
        iron,
        Amount::new(1_000_000),
        Amount::new(1_000_000),
        alice,
        alice,
    )?;

    let (r_a, r_b, _) = pool.get_reserves();
    println!("Reserves before: gold={r_a} iron={r_b}");

    // ── 2. Borrow 1 000 gold, repay 1 200 iron in the callback ──────────
    let bob = AccountId::from_bytes([0xb0; 32]);
    ledger.mint(iron, bob, Amount::new(1_200))?;
    let repayer = CrossRepay {
        ledger: Arc::clone(&ledger),
        repay_token: iron,
        pool_custody: pool.custody(),
        repay: Amount::new(1_200),
    };
    registry.flash_swap(
        gold,
        iron,
        Amount::new(1_000),
        Amount::ZERO,
        bob,
        &[0x01],
        Some(&repayer),
    )?;

    let (r_a, r_b, _) = pool.get_reserves();
    println!("Reserves after:  gold={r_a} iron={r_b}");
    println!("Bob now holds {} gold", ledger.balance_of(gold, bob));

    // ── 3. An underpaying borrower is rejected and fully reverted ───────
    let cheat = CrossRepay {
        ledger: Arc::clone(&ledger),
        repay_token: iron,
        pool_custody: pool.custody(),
        repay: Amount::new(1), // nowhere near enough
    };
    ledger.mint(iron, bob, Amount::new(1))?;
    let outcome = registry.flash_swap(
        gold,
        iron,
        Amount::new(1_000),
        Amount::ZERO,
        bob,
        &[0x01],
        Some(&cheat),
    );
    println!("\nUnderpaying flash swap: {outcome:?}");
    let (r_a, r_b, _) = pool.get_reserves();
    println!("Reserves unchanged: gold={r_a} iron={r_b}");

    Ok(())
}
