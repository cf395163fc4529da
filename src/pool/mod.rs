//! Two-asset constant-product pool.
//!
//! A [`Pool`] custodies the reserves of one canonical [`TokenPair`],
//! issues proportional ownership [`Shares`], and executes swaps under
//! the constant-product rule: the reserve product never decreases
//! across a swap. It also maintains cumulative price accumulators for
//! time-weighted price reads.
//!
//! # Access model
//!
//! Mutating operations (`mint`, `burn`, `swap`, `skim`) require the
//! [`RegistryKey`] issued to the registry that created the pool; `sync`
//! and all reads are open. Every mutating entry point runs under the
//! pool's [`EntryLock`](lock::EntryLock): operations from other threads
//! wait their turn, while a re-entrant call from the thread already
//! inside the pool fails with [`AmmError::Reentrancy`]. That rejection
//! is what makes the optimistic-transfer-then-callback swap safe.
//!
//! # Flash swaps
//!
//! `swap` transfers the requested outputs *first*. When the caller
//! supplies non-empty callback data, the pool invokes the caller's
//! [`SwapCallback`] synchronously; the callback must leave the required
//! input balance in pool custody before returning. Afterwards the pool
//! measures the unexplained balance increase as the input and verifies
//! the product invariant on raw balances. Fee extraction happens
//! entirely in the registry layer, never here.

mod lock;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{AccountId, Amount, Reserve, Rounding, Shares, Timestamp, TokenPair};
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::math::{isqrt, PriceAccumulator, Uq64x64};
use crate::registry::RegistryKey;
use crate::time::Clock;

use lock::EntryLock;

/// Flash-swap plugin interface.
///
/// Invoked synchronously inside [`Pool::swap`] after the outputs have
/// been optimistically transferred. The implementation must deliver the
/// required input to the pool's custody account before returning. It
/// may operate on *other* pools freely; touching the pool currently
/// mid-swap fails with [`AmmError::Reentrancy`].
pub trait SwapCallback: Send + Sync {
    /// Called with the recipient of the outputs, the output amounts,
    /// and the opaque data the swap was submitted with.
    ///
    /// # Errors
    ///
    /// Any error aborts the swap and reverts its transfers.
    fn on_swap(
        &self,
        recipient: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        data: &[u8],
    ) -> Result<()>;
}

/// Mutable pool state, replaced wholesale on commit.
///
/// Mutations clone the current state, work on the clone under the entry
/// lock, and swap it in at the end, so concurrent readers always see a
/// fully-applied snapshot.
#[derive(Debug, Clone)]
pub(crate) struct PoolState {
    reserve_a: Reserve,
    reserve_b: Reserve,
    last_update: Timestamp,
    price_a_cumulative: PriceAccumulator,
    price_b_cumulative: PriceAccumulator,
    k_last: u128,
    total_shares: Shares,
    share_balances: HashMap<AccountId, Shares>,
}

impl PoolState {
    fn fresh(now: Timestamp) -> Self {
        Self {
            reserve_a: Reserve::new(0),
            reserve_b: Reserve::new(0),
            last_update: now,
            price_a_cumulative: PriceAccumulator::ZERO,
            price_b_cumulative: PriceAccumulator::ZERO,
            k_last: 0,
            total_shares: Shares::new(0),
            share_balances: HashMap::new(),
        }
    }

    /// Folds `dt * price` into both accumulators, then stamps `now`.
    ///
    /// Skipped when no time has passed or either reserve is zero.
    /// Wrapping arithmetic is intentional; consumers difference two
    /// snapshots, so absolute counter values carry no meaning.
    fn advance_accumulators(&mut self, now: Timestamp) -> Result<()> {
        let dt = now.elapsed_since(&self.last_update);
        if dt > 0 && !self.reserve_a.is_zero() && !self.reserve_b.is_zero() {
            let price_a = Uq64x64::from_ratio(self.reserve_b, self.reserve_a)?;
            let price_b = Uq64x64::from_ratio(self.reserve_a, self.reserve_b)?;
            self.price_a_cumulative = self.price_a_cumulative.accumulate(price_a, dt);
            self.price_b_cumulative = self.price_b_cumulative.accumulate(price_b, dt);
        }
        self.last_update = now;
        Ok(())
    }

    /// Narrows custody balances into reserve width. Adversarial token
    /// balances past the width fail fast instead of wrapping.
    fn store_reserves(&mut self, balance_a: Amount, balance_b: Amount) -> Result<()> {
        self.reserve_a = Reserve::try_from_amount(balance_a)?;
        self.reserve_b = Reserve::try_from_amount(balance_b)?;
        Ok(())
    }
}

/// Constant-product pool for one token pair.
///
/// Created exactly once by a registry; the pair is fixed for the pool's
/// lifetime. Token custody lives in the shared ledger under the pool's
/// derived custody account.
pub struct Pool {
    pair: TokenPair,
    custody: AccountId,
    authority: u64,
    minimum_liquidity: u128,
    entry: EntryLock,
    state: parking_lot::RwLock<PoolState>,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("pair", &self.pair)
            .field("custody", &self.custody)
            .finish_non_exhaustive()
    }
}

impl Pool {
    pub(crate) fn new(
        pair: TokenPair,
        key: &RegistryKey,
        minimum_liquidity: u128,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        Self {
            custody: AccountId::pool_custody(&pair),
            pair,
            authority: key.id(),
            minimum_liquidity,
            entry: EntryLock::new(),
            state: parking_lot::RwLock::new(PoolState::fresh(now)),
            ledger,
            clock,
        }
    }

    fn check_key(&self, key: &RegistryKey) -> Result<()> {
        if key.id() == self.authority {
            Ok(())
        } else {
            Err(AmmError::Unauthorized)
        }
    }

    fn custody_balances(&self) -> (Amount, Amount) {
        (
            self.ledger.balance_of(self.pair.first(), self.custody),
            self.ledger.balance_of(self.pair.second(), self.custody),
        )
    }

    // -- reads ----------------------------------------------------------------

    /// The pool's canonical token pair.
    #[must_use]
    pub const fn pair(&self) -> TokenPair {
        self.pair
    }

    /// Account under which the ledger holds this pool's reserves.
    #[must_use]
    pub const fn custody(&self) -> AccountId {
        self.custody
    }

    /// Shares permanently locked on the very first deposit.
    #[must_use]
    pub const fn minimum_liquidity(&self) -> u128 {
        self.minimum_liquidity
    }

    /// Reserves and their timestamp as one consistent snapshot.
    #[must_use]
    pub fn get_reserves(&self) -> (Reserve, Reserve, Timestamp) {
        let state = self.state.read();
        (state.reserve_a, state.reserve_b, state.last_update)
    }

    /// Cumulative first-token price (second per first), Q64.64 seconds.
    #[must_use]
    pub fn price_a_cumulative(&self) -> PriceAccumulator {
        self.state.read().price_a_cumulative
    }

    /// Cumulative second-token price (first per second), Q64.64 seconds.
    #[must_use]
    pub fn price_b_cumulative(&self) -> PriceAccumulator {
        self.state.read().price_b_cumulative
    }

    /// Reserve product recorded after the last liquidity change.
    #[must_use]
    pub fn k_last(&self) -> u128 {
        self.state.read().k_last
    }

    /// Total shares outstanding, locked floor included.
    #[must_use]
    pub fn total_shares(&self) -> Shares {
        self.state.read().total_shares
    }

    /// Shares held by `account`.
    #[must_use]
    pub fn shares_of(&self, account: AccountId) -> Shares {
        self.state
            .read()
            .share_balances
            .get(&account)
            .copied()
            .unwrap_or(Shares::new(0))
    }

    // -- share ledger ---------------------------------------------------------

    /// Moves `amount` shares from `from` to `to`. Permissionless;
    /// burning requires transferring shares to the pool's own custody
    /// account first, which is what the router does.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientBalance`] if `from` holds fewer
    /// shares, [`AmmError::Reentrancy`] from inside a mutating
    /// operation on this pool.
    pub fn transfer_shares(&self, from: AccountId, to: AccountId, amount: Shares) -> Result<()> {
        let _guard = self.entry.enter()?;
        let mut state = self.state.write();
        let from_held = state
            .share_balances
            .get(&from)
            .copied()
            .unwrap_or(Shares::new(0));
        let new_from = from_held
            .safe_sub(&amount, "share transfer source")
            .map_err(|_| AmmError::InsufficientBalance("share transfer source"))?;
        let to_held = state
            .share_balances
            .get(&to)
            .copied()
            .unwrap_or(Shares::new(0));
        let new_to = to_held.safe_add(&amount, "share transfer destination")?;
        state.share_balances.insert(from, new_from);
        state.share_balances.insert(to, new_to);
        Ok(())
    }

    // -- mutations ------------------------------------------------------------

    /// Mints shares to `to` for the custody-balance increase since the
    /// last recorded reserves.
    ///
    /// First deposit: `shares = isqrt(amount_a * amount_b) - floor`,
    /// with `floor` shares locked forever to the burn sink. Subsequent
    /// deposits mint the minimum of the two pro-rata sides, rounded
    /// down; excess on the non-binding side is absorbed by the pool
    /// (the router is responsible for refunds).
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] for a foreign key.
    /// - [`AmmError::InitialDepositTooSmall`] when the first deposit's
    ///   geometric mean does not exceed the configured floor.
    /// - [`AmmError::InsufficientLiquidityMinted`] when the pro-rata
    ///   result rounds to zero.
    pub fn mint(&self, to: AccountId, key: &RegistryKey) -> Result<Shares> {
        self.check_key(key)?;
        let _guard = self.entry.enter()?;

        let (balance_a, balance_b) = self.custody_balances();
        let mut state = self.state.read().clone();
        let amount_a = balance_a.safe_sub(&state.reserve_a.as_amount(), "mint deposit a")?;
        let amount_b = balance_b.safe_sub(&state.reserve_b.as_amount(), "mint deposit b")?;

        let minted = if state.total_shares.is_zero() {
            let product = amount_a
                .checked_mul(&amount_b)
                .ok_or(AmmError::Overflow("first deposit product"))?;
            let root = isqrt(product.get());
            if root <= self.minimum_liquidity {
                return Err(AmmError::InitialDepositTooSmall);
            }
            // The floor stays outstanding forever, held by the sink.
            state
                .share_balances
                .insert(AccountId::burn_sink(), Shares::new(self.minimum_liquidity));
            state.total_shares = Shares::new(root);
            Shares::new(root - self.minimum_liquidity)
        } else {
            let total = Amount::new(state.total_shares.get());
            let by_a = amount_a.mul_div(&total, &state.reserve_a.as_amount(), Rounding::Down)?;
            let by_b = amount_b.mul_div(&total, &state.reserve_b.as_amount(), Rounding::Down)?;
            let minted = Shares::new(by_a.get().min(by_b.get()));
            state.total_shares = state.total_shares.safe_add(&minted, "total shares")?;
            minted
        };
        if minted.is_zero() {
            return Err(AmmError::InsufficientLiquidityMinted);
        }

        let held = state
            .share_balances
            .get(&to)
            .copied()
            .unwrap_or(Shares::new(0))
            .safe_add(&minted, "minted shares")?;
        state.share_balances.insert(to, held);

        state.advance_accumulators(self.clock.now())?;
        state.store_reserves(balance_a, balance_b)?;
        state.k_last = state.reserve_a.product(&state.reserve_b);
        *self.state.write() = state;

        debug!(
            pair = %self.pair,
            to = %to,
            amount_a = amount_a.get(),
            amount_b = amount_b.get(),
            shares = minted.get(),
            "mint"
        );
        Ok(minted)
    }

    /// Burns the shares currently held by the pool's own custody
    /// account and pays out pro-rata on actual custody balances.
    ///
    /// Reserves are updated before the outbound transfers, so a
    /// reentrant reader during the transfer observes post-burn values.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientLiquidityBurned`] if either redeemed
    /// amount rounds to zero.
    pub fn burn(&self, to: AccountId, key: &RegistryKey) -> Result<(Amount, Amount)> {
        self.check_key(key)?;
        let _guard = self.entry.enter()?;

        let prior = self.state.read().clone();
        let (balance_a, balance_b) = self.custody_balances();
        let liquidity = prior
            .share_balances
            .get(&self.custody)
            .copied()
            .unwrap_or(Shares::new(0));

        if liquidity.is_zero() || prior.total_shares.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        let amount_a = liquidity.pro_rata(&balance_a, &prior.total_shares, Rounding::Down)?;
        let amount_b = liquidity.pro_rata(&balance_b, &prior.total_shares, Rounding::Down)?;
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        let mut state = prior.clone();
        state.share_balances.remove(&self.custody);
        state.total_shares = state.total_shares.safe_sub(&liquidity, "total shares")?;
        state.advance_accumulators(self.clock.now())?;
        state.store_reserves(
            balance_a.safe_sub(&amount_a, "burn payout a")?,
            balance_b.safe_sub(&amount_b, "burn payout b")?,
        )?;
        state.k_last = state.reserve_a.product(&state.reserve_b);
        *self.state.write() = state;

        let op = self.ledger.begin_nested();
        let paid = self
            .ledger
            .transfer(self.pair.first(), self.custody, to, amount_a)
            .and_then(|()| {
                self.ledger
                    .transfer(self.pair.second(), self.custody, to, amount_b)
            });
        if let Err(e) = paid {
            self.ledger.abort(op);
            *self.state.write() = prior;
            return Err(e);
        }
        self.ledger.commit(op);

        debug!(
            pair = %self.pair,
            to = %to,
            amount_a = amount_a.get(),
            amount_b = amount_b.get(),
            shares = liquidity.get(),
            "burn"
        );
        Ok((amount_a, amount_b))
    }

    /// Optimistic-transfer swap.
    ///
    /// Sends the requested outputs to `to` first. With non-empty `data`
    /// the caller's [`SwapCallback`] is then invoked and must deliver
    /// the input before returning; with empty `data` the input must
    /// already be in custody. The input is measured as the unexplained
    /// balance increase, and the swap holds only if the raw balance
    /// product is at least the prior reserve product. On any failure
    /// every transfer made inside the swap is reverted.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientOutputAmount`] when both outputs are
    ///   zero.
    /// - [`AmmError::InsufficientLiquidity`] when an output reaches its
    ///   reserve.
    /// - [`AmmError::InvalidRecipient`] when `to` is the pool's own
    ///   custody account.
    /// - [`AmmError::CallbackRequired`] for non-empty `data` with no
    ///   callback.
    /// - [`AmmError::InsufficientInputAmount`] when no input arrived.
    /// - [`AmmError::InvariantViolation`] when the product decreases.
    pub fn swap(
        &self,
        out_a: Amount,
        out_b: Amount,
        to: AccountId,
        data: &[u8],
        callback: Option<&dyn SwapCallback>,
        key: &RegistryKey,
    ) -> Result<()> {
        self.check_key(key)?;
        let _guard = self.entry.enter()?;

        let prior = self.state.read().clone();
        if out_a.is_zero() && out_b.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        if out_a.get() >= u128::from(prior.reserve_a.get())
            || out_b.get() >= u128::from(prior.reserve_b.get())
        {
            return Err(AmmError::InsufficientLiquidity);
        }
        if to == self.custody {
            return Err(AmmError::InvalidRecipient("recipient is pool custody"));
        }

        let op = self.ledger.begin_nested();
        let result = self.swap_inner(&prior, out_a, out_b, to, data, callback);
        match result {
            Ok((in_a, in_b)) => {
                self.ledger.commit(op);
                debug!(
                    pair = %self.pair,
                    to = %to,
                    in_a = in_a.get(),
                    in_b = in_b.get(),
                    out_a = out_a.get(),
                    out_b = out_b.get(),
                    "swap"
                );
                Ok(())
            }
            Err(e) => {
                self.ledger.abort(op);
                *self.state.write() = prior;
                Err(e)
            }
        }
    }

    fn swap_inner(
        &self,
        prior: &PoolState,
        out_a: Amount,
        out_b: Amount,
        to: AccountId,
        data: &[u8],
        callback: Option<&dyn SwapCallback>,
    ) -> Result<(Amount, Amount)> {
        if !out_a.is_zero() {
            self.ledger
                .transfer(self.pair.first(), self.custody, to, out_a)?;
        }
        if !out_b.is_zero() {
            self.ledger
                .transfer(self.pair.second(), self.custody, to, out_b)?;
        }
        if !data.is_empty() {
            let cb = callback.ok_or(AmmError::CallbackRequired)?;
            cb.on_swap(to, out_a, out_b, data)?;
        }

        let (balance_a, balance_b) = self.custody_balances();
        let owed_a = prior.reserve_a.as_amount().saturating_sub(&out_a);
        let owed_b = prior.reserve_b.as_amount().saturating_sub(&out_b);
        let in_a = balance_a.saturating_sub(&owed_a);
        let in_b = balance_b.saturating_sub(&owed_b);
        if in_a.is_zero() && in_b.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }

        let mut state = prior.clone();
        state.advance_accumulators(self.clock.now())?;
        state.store_reserves(balance_a, balance_b)?;
        // Raw product check; fee extraction is the registry's concern.
        if state.reserve_a.product(&state.reserve_b) < prior.reserve_a.product(&prior.reserve_b) {
            return Err(AmmError::InvariantViolation("reserve product decreased"));
        }
        *self.state.write() = state;
        Ok((in_a, in_b))
    }

    /// Reconciles stored reserves with actual custody balances.
    ///
    /// Open to anyone as a recovery hatch. Because balance donations
    /// plus `sync` can distort the cumulative price, the accumulators
    /// must not be treated as a manipulation-proof oracle.
    ///
    /// # Errors
    ///
    /// [`AmmError::Overflow`] if a balance exceeds reserve width,
    /// [`AmmError::Reentrancy`] from inside another mutating operation.
    pub fn sync(&self) -> Result<()> {
        let _guard = self.entry.enter()?;
        let (balance_a, balance_b) = self.custody_balances();
        let mut state = self.state.read().clone();
        state.advance_accumulators(self.clock.now())?;
        state.store_reserves(balance_a, balance_b)?;
        let (reserve_a, reserve_b) = (state.reserve_a, state.reserve_b);
        *self.state.write() = state;
        debug!(
            pair = %self.pair,
            reserve_a = reserve_a.get(),
            reserve_b = reserve_b.get(),
            "sync"
        );
        Ok(())
    }

    /// Sweeps custody balance above recorded reserves to `to`.
    ///
    /// # Errors
    ///
    /// [`AmmError::Unauthorized`] for a foreign key.
    pub fn skim(&self, to: AccountId, key: &RegistryKey) -> Result<()> {
        self.check_key(key)?;
        let _guard = self.entry.enter()?;

        let (balance_a, balance_b) = self.custody_balances();
        let state = self.state.read().clone();
        let excess_a = balance_a.saturating_sub(&state.reserve_a.as_amount());
        let excess_b = balance_b.saturating_sub(&state.reserve_b.as_amount());

        let op = self.ledger.begin_nested();
        let swept = self
            .ledger
            .transfer(self.pair.first(), self.custody, to, excess_a)
            .and_then(|()| {
                self.ledger
                    .transfer(self.pair.second(), self.custody, to, excess_b)
            });
        if let Err(e) = swept {
            self.ledger.abort(op);
            return Err(e);
        }
        self.ledger.commit(op);
        Ok(())
    }

    // -- checkpointing --------------------------------------------------------

    pub(crate) fn snapshot_state(&self) -> PoolState {
        self.state.read().clone()
    }

    pub(crate) fn restore_state(&self, state: PoolState) {
        *self.state.write() = state;
    }
}
