//! The trait seam between the store and its host chain.
//!
//! The host execution environment owns value movement. The store only ever
//! asks it to do one thing: move the logging fee from the caller to the
//! authority. Everything else the host supplies (caller, block height)
//! arrives as plain data in a `TxContext`.

use fixchain_contracts::{error::FixchainResult, principal::Principal};

/// The host's value-transfer primitive.
///
/// Implementations are **trusted** and must be all-or-nothing: a failed
/// transfer moves no value. The store relies on this to keep `add_log_entry`
/// atomic: it calls `transfer` before touching any of its own state, so a
/// refused fee leaves the store exactly as it was.
pub trait FeeLedger: Send + Sync {
    /// Move `amount` from `from` to `to`.
    ///
    /// Returns `Err(FixchainError::FeeTransferFailed)` when the transfer
    /// cannot be made, typically because `from` lacks the funds. A zero
    /// `amount` is a legal transfer and must still be recorded.
    fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> FixchainResult<()>;
}
