//! The unified error type for the FIXCHAIN repair log.
//!
//! All fallible operations return `FixchainResult<T>`. Validation failures
//! are precise, one variant per violated field constraint, so a caller can
//! tell exactly which check rejected an entry. Variants that correspond to a
//! denial code in the on-chain contract expose it via [`FixchainError::code`].

use thiserror::Error;

use crate::entry::{
    MAX_COMPONENT_LEN, MAX_EVIDENCE_LEN, MAX_NOTES_LEN, MAX_PROOF_HASH_LEN, MAX_REVIEW_LEN,
    MAX_STEP_LEN, REQUEST_LOG_CAP,
};

/// Every failure the repair log can report.
#[derive(Debug, Error)]
pub enum FixchainError {
    /// `set_authority_contract` was called after the authority was fixed.
    ///
    /// The authority is first-write-wins for the lifetime of the store;
    /// every later call fails regardless of argument.
    #[error("authority contract is already set")]
    AuthorityAlreadySet,

    /// An operation that needs the fee-collecting authority ran before one
    /// was configured.
    #[error("no authority contract has been set")]
    AuthorityNotSet,

    /// The caller is not the technician recorded on the entry.
    #[error("caller '{caller}' is not the technician for log {id}")]
    NotTechnician { id: u64, caller: String },

    /// The request id must be a positive integer.
    #[error("request id must be greater than zero")]
    InvalidRequestId,

    /// The step text exceeds its length limit.
    #[error("step text is {len} characters, limit is {MAX_STEP_LEN}")]
    InvalidStep { len: usize },

    /// The proof hash exceeds its length limit.
    #[error("proof hash is {len} characters, limit is {MAX_PROOF_HASH_LEN}")]
    InvalidProofHash { len: usize },

    /// The entry is finalized and can no longer be amended or re-finalized.
    #[error("log {id} is already finalized")]
    AlreadyFinalized { id: u64 },

    /// No entry exists under the given id.
    #[error("log {id} not found")]
    LogNotFound { id: u64 },

    /// The store has reached its configured ceiling on total entries.
    #[error("log store is full ({max} entries)")]
    MaxLogsExceeded { max: u64 },

    /// The replacement step text passed to `update_log_step` exceeds its
    /// length limit.
    #[error("updated step text is {len} characters, limit is {MAX_STEP_LEN}")]
    InvalidUpdateParam { len: usize },

    /// The component name exceeds its length limit.
    #[error("component name is {len} characters, limit is {MAX_COMPONENT_LEN}")]
    InvalidComponent { len: usize },

    /// The repair cost must be greater than zero.
    #[error("cost must be greater than zero")]
    InvalidCost,

    /// The repair duration must be greater than zero.
    #[error("duration must be greater than zero")]
    InvalidDuration,

    /// The notes text exceeds its length limit.
    #[error("notes are {len} characters, limit is {MAX_NOTES_LEN}")]
    InvalidNotes { len: usize },

    /// The rating is outside the 1–5 range.
    #[error("rating {rating} is outside the range 1..=5")]
    InvalidRating { rating: u8 },

    /// The review text exceeds its length limit.
    #[error("review is {len} characters, limit is {MAX_REVIEW_LEN}")]
    InvalidReview { len: usize },

    /// The evidence reference exceeds its length limit.
    #[error("evidence reference is {len} characters, limit is {MAX_EVIDENCE_LEN}")]
    InvalidEvidence { len: usize },

    /// The category is not one of the recognized names.
    #[error("'{given}' is not a valid category (expected hardware, software or diagnostic)")]
    InvalidCategory { given: String },

    /// The request already holds the maximum number of entries.
    #[error("request {request_id} already holds {REQUEST_LOG_CAP} log entries")]
    RequestLogLimitExceeded { request_id: u64 },

    /// The host ledger refused to move the logging fee.
    ///
    /// The whole add operation aborts: no entry is created and no counter
    /// advances when the fee cannot be paid.
    #[error("fee transfer failed: {reason}")]
    FeeTransferFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl FixchainError {
    /// The numeric denial code the on-chain contract reports for this
    /// failure, if one exists.
    ///
    /// Config and ledger-plumbing failures never cross the contract
    /// boundary and have no code.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::NotTechnician { .. } => Some(200),
            Self::InvalidRequestId => Some(201),
            Self::InvalidStep { .. } => Some(202),
            Self::InvalidProofHash { .. } => Some(203),
            Self::AlreadyFinalized { .. } => Some(204),
            Self::LogNotFound { .. } => Some(205),
            Self::MaxLogsExceeded { .. } => Some(208),
            Self::InvalidUpdateParam { .. } => Some(209),
            Self::AuthorityNotSet => Some(210),
            Self::InvalidComponent { .. } => Some(212),
            Self::InvalidCost => Some(213),
            Self::InvalidDuration => Some(214),
            Self::InvalidNotes { .. } => Some(215),
            Self::InvalidRating { .. } => Some(217),
            Self::InvalidReview { .. } => Some(218),
            Self::InvalidEvidence { .. } => Some(219),
            Self::InvalidCategory { .. } => Some(220),
            // The contract reuses the max-logs code for the per-request cap.
            Self::RequestLogLimitExceeded { .. } => Some(208),
            Self::AuthorityAlreadySet
            | Self::FeeTransferFailed { .. }
            | Self::Config { .. } => None,
        }
    }
}

/// Convenience alias used throughout the fixchain crates.
pub type FixchainResult<T> = Result<T, FixchainError>;
