//! In-memory implementation of `FeeLedger`.
//!
//! `InMemoryLedger` is the reference implementation of the `FeeLedger`
//! trait. It keeps every transfer in a `Vec` protected by a `Mutex`, making
//! it safe to share between the store and any number of observers holding
//! clones of the ledger.
//!
//! Two modes exist:
//! - **Recording** (`new`): every transfer succeeds and is recorded. This
//!   matches a host whose transaction machinery has already guaranteed the
//!   caller can pay.
//! - **Balance-enforced** (`with_balances`): accounts carry balances; a
//!   transfer exceeding the sender's balance fails with `FeeTransferFailed`
//!   and records nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fixchain_contracts::{
    error::{FixchainError, FixchainResult},
    principal::Principal,
};
use fixchain_store::traits::FeeLedger;

// ── Records ───────────────────────────────────────────────────────────────────

/// One completed value transfer, in the order it happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// The amount moved. Zero is legal and recorded like any other amount.
    pub amount: u64,
    /// The paying principal.
    pub from: Principal,
    /// The receiving principal.
    pub to: Principal,
    /// Wall-clock time (UTC) the transfer was recorded.
    pub at: DateTime<Utc>,
}

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryLedger`.
struct LedgerState {
    /// All completed transfers, in append order.
    transfers: Vec<TransferRecord>,

    /// Account balances, when balance enforcement is on. `None` means
    /// recording mode: every transfer succeeds.
    balances: Option<HashMap<Principal, u64>>,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An in-memory, append-only fee ledger.
///
/// # Thread safety
///
/// `transfer()` acquires a `Mutex` internally. Clones share the same state,
/// so a test or demo can keep one clone to observe transfers while the store
/// owns another boxed as `dyn FeeLedger`.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create a recording-mode ledger: every transfer succeeds.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                transfers: Vec::new(),
                balances: None,
            })),
        }
    }

    /// Create a balance-enforced ledger with the given opening balances.
    ///
    /// Principals without an opening balance hold zero and can only send
    /// zero-amount transfers.
    pub fn with_balances(initial: impl IntoIterator<Item = (Principal, u64)>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                transfers: Vec::new(),
                balances: Some(initial.into_iter().collect()),
            })),
        }
    }

    /// Snapshot of all completed transfers, in the order they happened.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        let state = self.state.lock().expect("ledger state lock poisoned");
        state.transfers.clone()
    }

    /// The current balance of a principal, or `None` in recording mode.
    pub fn balance_of(&self, principal: &Principal) -> Option<u64> {
        let state = self.state.lock().expect("ledger state lock poisoned");
        state
            .balances
            .as_ref()
            .map(|balances| balances.get(principal).copied().unwrap_or(0))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ── FeeLedger impl ────────────────────────────────────────────────────────────

impl FeeLedger for InMemoryLedger {
    /// Move `amount` from `from` to `to`, all-or-nothing.
    ///
    /// In balance-enforced mode the sender is debited and the receiver
    /// credited atomically under the state lock; an insufficient balance
    /// fails the transfer and records nothing. In recording mode the
    /// transfer always succeeds.
    fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> FixchainResult<()> {
        let mut state = self.state.lock().map_err(|e| FixchainError::FeeTransferFailed {
            reason: format!("ledger state lock poisoned: {}", e),
        })?;

        if let Some(balances) = state.balances.as_mut() {
            let available = balances.get(from).copied().unwrap_or(0);
            if available < amount {
                return Err(FixchainError::FeeTransferFailed {
                    reason: format!(
                        "principal '{}' holds {} but the transfer needs {}",
                        from, available, amount
                    ),
                });
            }
            *balances.entry(from.clone()).or_insert(0) -= amount;
            *balances.entry(to.clone()).or_insert(0) += amount;
        }

        debug!(amount, from = %from, to = %to, "fee transfer recorded");
        state.transfers.push(TransferRecord {
            amount,
            from: from.clone(),
            to: to.clone(),
            at: Utc::now(),
        });

        Ok(())
    }
}
