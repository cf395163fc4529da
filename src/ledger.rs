//! Token custody collaborator.
//!
//! The engine never assumes token balances behave: a token may deduct a
//! transfer fee, and any transfer may hand control to code that calls
//! back into a pool. Custody is therefore kept behind the narrow
//! [`TokenLedger`] seam, and every consumer measures what actually
//! arrived instead of trusting what was sent.
//!
//! # Atomicity
//!
//! "One operation either fully applies or leaves no trace" has to be
//! simulated outside a natively-atomic execution environment. The
//! ledger journals transfers per *operation*: a public entry point
//! opens an independent scope with [`begin`](TokenLedger::begin), and
//! internal sub-steps open child scopes with
//! [`begin_nested`](TokenLedger::begin_nested). Transfers are tagged
//! with the innermost scope open on the calling thread. On failure,
//! [`abort`](TokenLedger::abort) undoes exactly that scope's entries,
//! newest first; on success, [`commit`](TokenLedger::commit) folds a
//! child scope into its parent (so the enclosing operation can still
//! roll it back) or, for an independent scope, makes the entries
//! permanent.
//!
//! The distinction matters for flash-swap callbacks: a callback that
//! executes a swap on a *different* pool goes through a public entry
//! point, which opens an independent scope. Its committed transfers
//! survive even when the enclosing flash swap later fails; only the
//! flash swap's own transfers are clawed back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::domain::{AccountId, Amount, TokenId};
use crate::error::{AmmError, Result};

// 0 is reserved for "no scope": unscoped transfers are immediately
// permanent and never journaled.
static NEXT_OP_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Scopes currently open on this thread, innermost last.
    ///
    /// Operation ids are globally unique, so one stack serves every
    /// ledger instance.
    static OPEN_SCOPES: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

fn push_scope(id: u64) {
    OPEN_SCOPES.with(|stack| stack.borrow_mut().push(id));
}

fn pop_scope(id: u64) {
    OPEN_SCOPES.with(|stack| {
        let mut stack = stack.borrow_mut();
        if let Some(pos) = stack.iter().rposition(|&open| open == id) {
            stack.remove(pos);
        }
    });
}

fn innermost_scope() -> u64 {
    OPEN_SCOPES.with(|stack| stack.borrow().last().copied().unwrap_or(0))
}

/// Handle for one journaled operation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpId(u64);

/// Narrow custody interface the engine consumes.
///
/// Transfer authorization (signatures, allowances) is out of scope;
/// the ledger trusts its in-process callers.
pub trait TokenLedger: Send + Sync {
    /// Current balance of `account` in `token`.
    fn balance_of(&self, token: TokenId, account: AccountId) -> Amount;

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// A fee-on-transfer token may deliver less than `amount`; callers
    /// that care must measure the recipient's balance delta. The
    /// transfer is recorded against the innermost scope open on the
    /// calling thread, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientBalance`] if `from` lacks the
    /// amount, [`AmmError::Overflow`] if the recipient balance would
    /// overflow.
    fn transfer(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()>;

    /// Opens an independent operation scope.
    ///
    /// Used by public entry points. Committed entries become permanent
    /// regardless of any enclosing scope on the thread, which is what
    /// lets a flash-swap callback run full operations on other pools.
    fn begin(&self) -> OpId;

    /// Opens a scope nested in the innermost scope open on this thread.
    ///
    /// Used by internal sub-steps. Committing folds the entries into
    /// the parent scope; with no scope open it behaves like
    /// [`begin`](Self::begin).
    fn begin_nested(&self) -> OpId;

    /// Closes `op` successfully.
    fn commit(&self, op: OpId);

    /// Closes `op` by undoing every transfer it recorded, newest first.
    fn abort(&self, op: OpId);
}

/// One applied balance movement, as recorded for undo.
///
/// `delivered` is what reached `to` after any transfer fee; `sent` is
/// what left `from`. Reverting restores both sides exactly.
#[derive(Debug, Clone, Copy)]
struct JournalEntry {
    op: u64,
    token: TokenId,
    from: AccountId,
    to: AccountId,
    sent: Amount,
    delivered: Amount,
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<(TokenId, AccountId), Amount>,
    transfer_fee_bps: HashMap<TokenId, u16>,
    journal: Vec<JournalEntry>,
    scope_parents: HashMap<u64, u64>,
}

/// In-memory token ledger with operation-scoped undo and optional
/// per-token fee-on-transfer behavior.
///
/// The fee knob exists so routing code can be exercised against tokens
/// that deliver less than was sent; production-grade custody lives
/// behind the [`TokenLedger`] trait, not here.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `token` to `account` out of thin air.
    ///
    /// Mints are not journaled; they are test/simulation setup, not part
    /// of any atomic engine operation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the balance would overflow.
    pub fn mint(&self, token: TokenId, account: AccountId, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write();
        let slot = inner.balances.entry((token, account)).or_insert(Amount::ZERO);
        *slot = slot.safe_add(&amount, "ledger mint")?;
        Ok(())
    }

    /// Makes `token` deduct `fee_bps` of every transfer in flight.
    pub fn set_transfer_fee(&self, token: TokenId, fee_bps: u16) {
        self.inner.write().transfer_fee_bps.insert(token, fee_bps);
    }

    fn open_scope(&self, parent: u64) -> OpId {
        let id = NEXT_OP_ID.fetch_add(1, Ordering::Relaxed);
        self.inner.write().scope_parents.insert(id, parent);
        push_scope(id);
        OpId(id)
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: TokenId, account: AccountId) -> Amount {
        self.inner
            .read()
            .balances
            .get(&(token, account))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn transfer(
        &self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let op = innermost_scope();
        let mut inner = self.inner.write();

        let fee_bps = inner.transfer_fee_bps.get(&token).copied().unwrap_or(0);
        let fee = amount.mul_div(
            &Amount::new(u128::from(fee_bps)),
            &Amount::new(10_000),
            crate::domain::Rounding::Down,
        )?;
        let delivered = amount.safe_sub(&fee, "transfer fee exceeds amount")?;

        let from_balance = inner
            .balances
            .get(&(token, from))
            .copied()
            .unwrap_or(Amount::ZERO);
        let new_from = from_balance
            .checked_sub(&amount)
            .ok_or(AmmError::InsufficientBalance("transfer source"))?;

        let to_balance = inner
            .balances
            .get(&(token, to))
            .copied()
            .unwrap_or(Amount::ZERO);
        let new_to = to_balance.safe_add(&delivered, "transfer destination")?;

        inner.balances.insert((token, from), new_from);
        inner.balances.insert((token, to), new_to);
        if op != 0 {
            inner.journal.push(JournalEntry {
                op,
                token,
                from,
                to,
                sent: amount,
                delivered,
            });
        }
        Ok(())
    }

    fn begin(&self) -> OpId {
        self.open_scope(0)
    }

    fn begin_nested(&self) -> OpId {
        self.open_scope(innermost_scope())
    }

    fn commit(&self, op: OpId) {
        pop_scope(op.0);
        let mut inner = self.inner.write();
        let parent = inner.scope_parents.remove(&op.0).unwrap_or(0);
        if parent == 0 {
            // Independent scope: entries become permanent.
            inner.journal.retain(|entry| entry.op != op.0);
        } else {
            // Nested scope: fold into the parent so the enclosing
            // operation can still undo these entries.
            for entry in &mut inner.journal {
                if entry.op == op.0 {
                    entry.op = parent;
                }
            }
        }
    }

    fn abort(&self, op: OpId) {
        pop_scope(op.0);
        let mut inner = self.inner.write();
        inner.scope_parents.remove(&op.0);
        let mut index = inner.journal.len();
        while index > 0 {
            index -= 1;
            if inner.journal[index].op != op.0 {
                continue;
            }
            let entry = inner.journal.remove(index);
            // Undo is exact: the recipient gives back what was delivered,
            // the sender regains what was sent (fee included).
            let to_balance = inner
                .balances
                .get(&(entry.token, entry.to))
                .copied()
                .unwrap_or(Amount::ZERO)
                .saturating_sub(&entry.delivered);
            let from_balance = inner
                .balances
                .get(&(entry.token, entry.from))
                .copied()
                .unwrap_or(Amount::ZERO)
                .checked_add(&entry.sent)
                .unwrap_or(Amount::MAX);
            inner.balances.insert((entry.token, entry.to), to_balance);
            inner.balances.insert((entry.token, entry.from), from_balance);
        }
    }
}
