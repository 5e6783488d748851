//! # fixchain-ledger
//!
//! In-memory fee ledger for the FIXCHAIN repair log.
//!
//! ## Overview
//!
//! The store never moves value itself; it asks its `FeeLedger` to do so.
//! `InMemoryLedger` is the reference implementation: it records every
//! transfer in order and can optionally enforce account balances, which is
//! how the "insufficient funds aborts the whole add" behavior is exercised
//! without a real chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fixchain_ledger::InMemoryLedger;
//!
//! let ledger = InMemoryLedger::new();
//! let mut store = RepairLogStore::new(StoreConfig::default(), Box::new(ledger.clone()));
//! // … operate the store, then inspect ledger.transfers()
//! ```

pub mod memory;

pub use memory::{InMemoryLedger, TransferRecord};

// ── Tests ─────────────────────────────────────────────────────────────────────
