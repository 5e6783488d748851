//! Principal identity and host transaction context.
//!
//! The host execution environment, not this module, authenticates callers.
//! A `Principal` is therefore an opaque token: the store compares principals
//! for equality but never validates that one exists.

use serde::{Deserialize, Serialize};

/// An opaque principal token supplied by the host chain.
///
/// Used for the fee-collecting authority, the technician who authored an
/// entry, the verifier recorded on it, and the caller of every operation.
/// Example: `Principal::new("ST1TECH")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    /// Construct a principal from any string-like value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the host supplies for a single operation.
///
/// Each call into the store runs inside one host transaction: the host tells
/// us who is calling and at what block height. The store never reads a clock
/// of its own; block height is the only notion of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxContext {
    /// The principal invoking the operation.
    pub caller: Principal,
    /// The chain height at the time of the call. Monotonic per the host.
    pub block_height: u64,
}

impl TxContext {
    /// Build a context for the given caller at the given height.
    pub fn new(caller: Principal, block_height: u64) -> Self {
        Self { caller, block_height }
    }
}
