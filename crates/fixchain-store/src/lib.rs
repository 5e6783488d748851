//! # fixchain-store
//!
//! The validation-and-storage core of the FIXCHAIN repair log.
//!
//! This crate provides:
//! - The `FeeLedger` trait, the seam to the host chain's value-transfer
//!   primitive
//! - `StoreConfig`, TOML-driven operator configuration
//! - `RepairLogStore`, the single authoritative store with the full
//!   validation pipeline and all query/mutation operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fixchain_store::{RepairLogStore, StoreConfig, traits::FeeLedger};
//!
//! let mut store = RepairLogStore::new(StoreConfig::default(), ledger);
//! store.set_authority_contract(Principal::new("ST2AUTH"))?;
//! let id = store.add_log_entry(&ctx, draft)?;
//! ```

pub mod config;
pub mod store;
pub mod traits;

pub use config::StoreConfig;
pub use store::RepairLogStore;
