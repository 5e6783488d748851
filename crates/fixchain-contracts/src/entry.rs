//! Repair log entry types and field limits.
//!
//! `LogEntry` is the persisted record; `NewLogEntry` is the raw draft a
//! caller submits before validation; `LogUpdate` is the single retained
//! amendment record per entry. Length limits mirror the on-chain contract's
//! `string-utf8` bounds and count Unicode scalar values, not bytes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::FixchainError,
    principal::Principal,
};

// ── Field limits ──────────────────────────────────────────────────────────────

/// Maximum length of the `step` text, in characters.
pub const MAX_STEP_LEN: usize = 100;
/// Maximum length of the `proof_hash` text, in characters.
pub const MAX_PROOF_HASH_LEN: usize = 256;
/// Maximum length of the `component` name, in characters.
pub const MAX_COMPONENT_LEN: usize = 50;
/// Maximum length of the `notes` text, in characters.
pub const MAX_NOTES_LEN: usize = 512;
/// Maximum length of the `review` text, in characters.
pub const MAX_REVIEW_LEN: usize = 256;
/// Maximum length of the `evidence` reference, in characters.
pub const MAX_EVIDENCE_LEN: usize = 256;
/// Inclusive rating bounds.
pub const MIN_RATING: u8 = 1;
/// Inclusive rating bounds.
pub const MAX_RATING: u8 = 5;
/// Maximum number of log entries retained per repair request.
pub const REQUEST_LOG_CAP: usize = 100;

// ── Ids ───────────────────────────────────────────────────────────────────────

/// Identifier of a stored log entry.
///
/// Ids are dense: the store assigns `0, 1, 2, …` in creation order and never
/// reuses or removes one, so the highest id plus one equals the entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub u64);

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Category ──────────────────────────────────────────────────────────────────

/// The kind of repair work an entry records.
///
/// The contract accepts exactly three lowercase names; anything else is
/// rejected with `InvalidCategory` at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hardware,
    Software,
    Diagnostic,
}

impl Category {
    /// The lowercase wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
            Self::Diagnostic => "diagnostic",
        }
    }
}

impl FromStr for Category {
    type Err = FixchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hardware" => Ok(Self::Hardware),
            "software" => Ok(Self::Software),
            "diagnostic" => Ok(Self::Diagnostic),
            other => Err(FixchainError::InvalidCategory { given: other.to_string() }),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Entry records ─────────────────────────────────────────────────────────────

/// One validated, persisted record of repair work against a request.
///
/// Immutable after creation except for three fields: `step` (via
/// `update_log_step`), `finalized` (via `finalize_log`, one-way), and
/// `timestamp` (refreshed by both).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// The external repair request this entry belongs to. Many entries may
    /// share a request id.
    pub request_id: u64,
    /// What was done in this step of the repair.
    pub step: String,
    /// Caller-supplied proof reference. Opaque to the store, never
    /// recomputed or checked against anything.
    pub proof_hash: String,
    /// The principal who performed the work. Only this principal may amend
    /// or finalize the entry.
    pub technician: Principal,
    /// The part worked on.
    pub component: String,
    /// Cost of the work. Always positive.
    pub cost: u64,
    /// Duration of the work. Always positive.
    pub duration: u64,
    /// Free-form notes.
    pub notes: String,
    /// The principal who verified the work. Recorded, never consulted.
    pub verifier: Principal,
    /// Quality rating, 1 through 5 inclusive.
    pub rating: u8,
    /// Free-form review text.
    pub review: String,
    /// Reference to supporting evidence (e.g. a photo name).
    pub evidence: String,
    /// The kind of work performed.
    pub category: Category,
    /// Block height of creation, refreshed on amendment and finalization.
    pub timestamp: u64,
    /// False at creation; set to true exactly once by `finalize_log`.
    pub finalized: bool,
}

/// The raw draft a caller submits to `add_log_entry`.
///
/// Nothing here is validated yet. `category` stays a plain string so the
/// store can report `InvalidCategory` in its fixed position in the
/// validation order, exactly as the contract does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub request_id: u64,
    pub step: String,
    pub proof_hash: String,
    pub technician: Principal,
    pub component: String,
    pub cost: u64,
    pub duration: u64,
    pub notes: String,
    pub verifier: Principal,
    pub rating: u8,
    pub review: String,
    pub evidence: String,
    pub category: String,
}

/// The single retained amendment record for an entry.
///
/// Overwritten, not appended, on every successful `update_log_step`, so at
/// most one exists per log id and it always describes the latest amendment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogUpdate {
    /// The step text the entry was amended to.
    pub step: String,
    /// Block height of the amendment.
    pub timestamp: u64,
    /// The principal who made the amendment.
    pub updater: Principal,
}
