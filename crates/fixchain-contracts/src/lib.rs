//! # fixchain-contracts
//!
//! Shared types and error contracts for the FIXCHAIN repair log.
//!
//! Every crate in the workspace imports from here. No business logic lives
//! in this crate, only data definitions and the unified error type.

pub mod entry;
pub mod error;
pub mod principal;
