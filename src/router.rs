//! Multi-hop router: quotes and chained swap execution with slippage
//! and deadline protection.
//!
//! The router consumes the registry's read and swap entries. It never
//! creates pools and holds no long-lived state beyond its own custody
//! account, which carries intermediate tokens between hops.
//!
//! Quotes reproduce the registry's published formulas bit for bit,
//! rounding down on the forward walk and up on the backward walk, so a
//! quote never overstates realizable output and an exact-out maximum is
//! never undercut.
//!
//! Execution trusts nothing: the input pull and every hop measure the
//! recipient's balance delta, so fee-on-transfer tokens anywhere in the
//! route are tolerated and the caller's minimum is enforced against
//! what actually arrived. Any failure rolls the entire route back
//! through a registry checkpoint; no partial route is ever left
//! applied.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    AccountId, Amount, Deadline, Quote, Reserve, Route, Rounding, Shares, SwapBound, SwapRequest,
    TokenId,
};
use crate::error::{AmmError, Result};
use crate::ledger::TokenLedger;
use crate::pool::Pool;
use crate::registry::Registry;
use crate::time::Clock;

/// Executes multi-hop swaps and ratio-balanced liquidity changes.
pub struct Router {
    custody: AccountId,
    registry: Arc<Registry>,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
}

impl Router {
    /// Builds a router custodying intermediates under `custody`.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidRecipient`] for a null custody account.
    pub fn new(
        custody: AccountId,
        registry: Arc<Registry>,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if custody.is_null() {
            return Err(AmmError::InvalidRecipient("null router custody"));
        }
        Ok(Self {
            custody,
            registry,
            ledger,
            clock,
        })
    }

    // -- reads ----------------------------------------------------------------

    /// Pool for the pair formed by the two tokens.
    ///
    /// # Errors
    ///
    /// [`AmmError::PoolNotFound`] if no pool exists.
    pub fn get_pool(&self, token_x: TokenId, token_y: TokenId) -> Result<Arc<Pool>> {
        self.registry.get_pool(token_x, token_y)
    }

    /// Equal-value counterpart of `amount_x` at the current reserve
    /// ratio, rounded down.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientInputAmount`] for a zero amount,
    /// [`AmmError::InsufficientLiquidity`] for an empty reserve.
    pub fn quote_liquidity(
        amount_x: Amount,
        reserve_x: Reserve,
        reserve_y: Reserve,
    ) -> Result<Amount> {
        if amount_x.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_x.is_zero() || reserve_y.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        amount_x.mul_div(
            &reserve_y.as_amount(),
            &reserve_x.as_amount(),
            Rounding::Down,
        )
    }

    /// Forward quote along `route`: the registry's fee-adjusted formula
    /// applied hop by hop, rounded down.
    ///
    /// Each hop reads that pool's current reserves; a route visiting
    /// the same pool twice is quoted against unmodified reserves, which
    /// execution then corrects via its minimum-output check.
    ///
    /// # Errors
    ///
    /// [`AmmError::PoolNotFound`] for a hop without a pool,
    /// [`AmmError::InsufficientInputAmount`] for zero input.
    pub fn get_amounts_out(&self, amount_in: Amount, route: &Route) -> Result<Quote> {
        if amount_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        let mut amounts = Vec::with_capacity(route.tokens().len());
        amounts.push(amount_in);
        let mut current = amount_in;
        for (token_in, token_out) in route.hops() {
            let (reserve_in, reserve_out) = self.reserves_oriented(token_in, token_out)?;
            current = self.registry.quote_out(current, reserve_in, reserve_out)?;
            amounts.push(current);
        }
        Ok(Quote::new(amounts))
    }

    /// Backward quote: the input required at each hop for the desired
    /// final output, rounded up so the commitment is never undercut.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientLiquidity`] when any hop's required
    /// output reaches its reserve.
    pub fn get_amounts_in(&self, amount_out: Amount, route: &Route) -> Result<Quote> {
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        let mut amounts = vec![amount_out];
        let mut current = amount_out;
        let hops: Vec<_> = route.hops().collect();
        for (token_in, token_out) in hops.into_iter().rev() {
            let (reserve_in, reserve_out) = self.reserves_oriented(token_in, token_out)?;
            current = self.registry.quote_in(current, reserve_in, reserve_out)?;
            amounts.push(current);
        }
        amounts.reverse();
        Ok(Quote::new(amounts))
    }

    fn reserves_oriented(
        &self,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Result<(Reserve, Reserve)> {
        let pool = self.registry.get_pool(token_in, token_out)?;
        let (reserve_a, reserve_b, _) = pool.get_reserves();
        if pool.pair().is_first(&token_in) {
            Ok((reserve_a, reserve_b))
        } else {
            Ok((reserve_b, reserve_a))
        }
    }

    // -- swap execution -------------------------------------------------------

    /// Swaps a fixed input along `route`, demanding at least
    /// `amount_out_min` of the final token delivered to `to`.
    ///
    /// Returns the realized per-hop amounts; `amounts[0]` is what the
    /// router actually received from `from`, the last element what `to`
    /// actually received.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] / [`AmmError::InvalidRecipient`]
    ///   for zero amounts or a null recipient.
    /// - [`AmmError::DeadlineExpired`] for a zero or past deadline.
    /// - [`AmmError::InsufficientOutputAmount`] when the realized final
    ///   output is below the minimum; the whole route is rolled back.
    pub fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: Amount,
        amount_out_min: Amount,
        route: &Route,
        from: AccountId,
        to: AccountId,
        deadline: Deadline,
    ) -> Result<Quote> {
        let request = SwapRequest::exact_in(amount_in, amount_out_min, to, deadline)?;
        self.execute(&request, route, from)
    }

    /// Swaps for a fixed output along `route`, funding at most
    /// `amount_in_max` of the first token from `from`.
    ///
    /// The required input comes from [`get_amounts_in`]; after
    /// execution the realized output is re-validated against
    /// `amount_out`, since cross-hop rounding could otherwise erode the
    /// guarantee.
    ///
    /// # Errors
    ///
    /// [`AmmError::ExcessiveInputAmount`] when the requirement exceeds
    /// the maximum, plus everything
    /// [`swap_exact_tokens_for_tokens`](Self::swap_exact_tokens_for_tokens)
    /// can return.
    ///
    /// [`get_amounts_in`]: Self::get_amounts_in
    pub fn swap_tokens_for_exact_tokens(
        &self,
        amount_out: Amount,
        amount_in_max: Amount,
        route: &Route,
        from: AccountId,
        to: AccountId,
        deadline: Deadline,
    ) -> Result<Quote> {
        let request = SwapRequest::exact_out(amount_out, amount_in_max, to, deadline)?;
        self.execute(&request, route, from)
    }

    /// Runs a validated request: resolves the bound to a concrete input
    /// and minimum, then executes under a route checkpoint.
    fn execute(&self, request: &SwapRequest, route: &Route, from: AccountId) -> Result<Quote> {
        request.deadline().check(self.clock.now())?;
        let (amount_in, min_out) = match request.bound() {
            SwapBound::ExactIn { amount_in, min_out } => (amount_in, min_out),
            SwapBound::ExactOut { amount_out, max_in } => {
                let required = self.get_amounts_in(amount_out, route)?.input();
                if required > max_in {
                    return Err(AmmError::ExcessiveInputAmount);
                }
                (required, amount_out)
            }
        };

        let checkpoint = self.registry.checkpoint(route)?;
        let result = self.run_hops(amount_in, min_out, route, from, request.recipient());
        match result {
            Ok(quote) => {
                self.registry.commit(checkpoint);
                debug!(
                    hops = route.hop_count(),
                    amount_in = quote.input().get(),
                    amount_out = quote.output().get(),
                    "swap_executed"
                );
                Ok(quote)
            }
            Err(e) => {
                self.registry.rollback(checkpoint);
                Err(e)
            }
        }
    }

    fn run_hops(
        &self,
        amount_in: Amount,
        min_out: Amount,
        route: &Route,
        from: AccountId,
        to: AccountId,
    ) -> Result<Quote> {
        // Pull the input, measuring what actually arrived.
        let received = self.pull_measuring(route.input(), from, amount_in)?;
        let mut amounts = Vec::with_capacity(route.tokens().len());
        amounts.push(received);

        let mut current = received;
        let last = route.hop_count() - 1;
        for (i, (token_in, token_out)) in route.hops().enumerate() {
            let recipient = if i == last { to } else { self.custody };
            let before = self.ledger.balance_of(token_out, recipient);
            self.registry
                .swap_exact_in_inner(token_in, token_out, current, self.custody, recipient)?;
            current = self
                .ledger
                .balance_of(token_out, recipient)
                .safe_sub(&before, "hop output delta")?;
            amounts.push(current);
        }

        if current < min_out {
            return Err(AmmError::InsufficientOutputAmount);
        }
        Ok(Quote::new(amounts))
    }

    /// Transfers `amount` of `token` from `from` into router custody
    /// and returns the delivered delta.
    fn pull_measuring(&self, token: TokenId, from: AccountId, amount: Amount) -> Result<Amount> {
        let before = self.ledger.balance_of(token, self.custody);
        self.ledger.transfer(token, from, self.custody, amount)?;
        self.ledger
            .balance_of(token, self.custody)
            .safe_sub(&before, "pulled input delta")
    }

    // -- liquidity ------------------------------------------------------------

    /// Deposits into the `token_x`/`token_y` pool at the pool's current
    /// ratio and mints shares to `to`.
    ///
    /// Pulls both desired amounts, deposits the largest ratio-matching
    /// portion, refunds the rest to `from`. The pool must already
    /// exist; the router never creates pools. Returns the deposited
    /// amounts and the minted shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] for a missing pool.
    /// - [`AmmError::InsufficientAAmount`] /
    ///   [`AmmError::InsufficientBAmount`] when the ratio-matched
    ///   deposit of `token_x` / `token_y` falls below its minimum.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        token_x: TokenId,
        token_y: TokenId,
        amount_x_desired: Amount,
        amount_y_desired: Amount,
        amount_x_min: Amount,
        amount_y_min: Amount,
        from: AccountId,
        to: AccountId,
        deadline: Deadline,
    ) -> Result<(Amount, Amount, Shares)> {
        deadline.check(self.clock.now())?;
        if to.is_null() {
            return Err(AmmError::InvalidRecipient("recipient must not be null"));
        }
        let pool = self.registry.get_pool(token_x, token_y)?;
        let snapshot = pool.snapshot_state();
        let op = self.ledger.begin();

        let result = (|| {
            let held_x = self.pull_measuring(token_x, from, amount_x_desired)?;
            let held_y = self.pull_measuring(token_y, from, amount_y_desired)?;
            let (use_x, use_y) =
                self.ratio_match(&pool, token_x, held_x, held_y, amount_x_min, amount_y_min)?;

            let shares = self.registry.add_liquidity_inner(
                token_x,
                token_y,
                use_x,
                use_y,
                self.custody,
                to,
            )?;

            // Refund whatever the ratio left unused.
            let spare_x = held_x.safe_sub(&use_x, "liquidity refund x")?;
            if !spare_x.is_zero() {
                self.ledger.transfer(token_x, self.custody, from, spare_x)?;
            }
            let spare_y = held_y.safe_sub(&use_y, "liquidity refund y")?;
            if !spare_y.is_zero() {
                self.ledger.transfer(token_y, self.custody, from, spare_y)?;
            }
            Ok((use_x, use_y, shares))
        })();
        match result {
            Ok((use_x, use_y, shares)) => {
                self.ledger.commit(op);
                debug!(
                    amount_x = use_x.get(),
                    amount_y = use_y.get(),
                    shares = shares.get(),
                    "liquidity_added"
                );
                Ok((use_x, use_y, shares))
            }
            Err(e) => {
                pool.restore_state(snapshot);
                self.ledger.abort(op);
                Err(e)
            }
        }
    }

    /// Largest deposit of `(held_x, held_y)` matching the pool's
    /// reserve ratio. A fresh pool accepts both amounts as given.
    fn ratio_match(
        &self,
        pool: &Pool,
        token_x: TokenId,
        held_x: Amount,
        held_y: Amount,
        amount_x_min: Amount,
        amount_y_min: Amount,
    ) -> Result<(Amount, Amount)> {
        let (reserve_a, reserve_b, _) = pool.get_reserves();
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((held_x, held_y));
        }
        let (reserve_x, reserve_y) = if pool.pair().is_first(&token_x) {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        let y_optimal = Self::quote_liquidity(held_x, reserve_x, reserve_y)?;
        if y_optimal <= held_y {
            if y_optimal < amount_y_min {
                return Err(AmmError::InsufficientBAmount);
            }
            Ok((held_x, y_optimal))
        } else {
            let x_optimal = Self::quote_liquidity(held_y, reserve_y, reserve_x)?;
            if x_optimal > held_x {
                return Err(AmmError::InsufficientAAmount);
            }
            if x_optimal < amount_x_min {
                return Err(AmmError::InsufficientAAmount);
            }
            Ok((x_optimal, held_y))
        }
    }

    /// Burns `shares` of the `token_x`/`token_y` pool and pays the
    /// underlying tokens to `to`, subject to per-side minimums.
    ///
    /// # Errors
    ///
    /// [`AmmError::InsufficientAAmount`] /
    /// [`AmmError::InsufficientBAmount`] when a redeemed side falls
    /// below its minimum; the burn is rolled back.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &self,
        token_x: TokenId,
        token_y: TokenId,
        shares: Shares,
        amount_x_min: Amount,
        amount_y_min: Amount,
        from: AccountId,
        to: AccountId,
        deadline: Deadline,
    ) -> Result<(Amount, Amount)> {
        deadline.check(self.clock.now())?;
        if to.is_null() {
            return Err(AmmError::InvalidRecipient("recipient must not be null"));
        }
        let pool = self.registry.get_pool(token_x, token_y)?;
        let snapshot = pool.snapshot_state();
        let op = self.ledger.begin();

        let result = (|| {
            let (amount_x, amount_y) = self
                .registry
                .remove_liquidity_inner(token_x, token_y, shares, from, to)?;
            if amount_x < amount_x_min {
                return Err(AmmError::InsufficientAAmount);
            }
            if amount_y < amount_y_min {
                return Err(AmmError::InsufficientBAmount);
            }
            Ok((amount_x, amount_y))
        })();
        match result {
            Ok((amount_x, amount_y)) => {
                self.ledger.commit(op);
                debug!(
                    amount_x = amount_x.get(),
                    amount_y = amount_y.get(),
                    shares = shares.get(),
                    "liquidity_removed"
                );
                Ok((amount_x, amount_y))
            }
            Err(e) => {
                pool.restore_state(snapshot);
                self.ledger.abort(op);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("custody", &self.custody)
            .finish_non_exhaustive()
    }
}
