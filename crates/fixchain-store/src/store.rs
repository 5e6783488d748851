//! The repair log store: the validation-and-storage core.
//!
//! Every mutating operation follows the on-chain contract's shape:
//!
//!   validate → charge fee (add only) → persist → answer
//!
//! Validation is a fixed pipeline: the first failing check wins and each
//! check has its own error kind, so a caller always learns exactly which
//! constraint rejected the call. All persistence is in-process map state;
//! the host (not this module) provides durability and single-writer
//! execution, so no operation here blocks, retries, or interleaves.
//!
//! `add_log_entry` is atomic: the fee transfer is requested only after every
//! check has passed, and the store's own state is touched only after the
//! transfer succeeds. A refused fee leaves the store unchanged.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::{debug, info, warn};

use fixchain_contracts::{
    entry::{
        Category, LogEntry, LogId, LogUpdate, NewLogEntry, MAX_COMPONENT_LEN, MAX_EVIDENCE_LEN,
        MAX_NOTES_LEN, MAX_PROOF_HASH_LEN, MAX_RATING, MAX_REVIEW_LEN, MAX_STEP_LEN, MIN_RATING,
        REQUEST_LOG_CAP,
    },
    error::{FixchainError, FixchainResult},
    principal::{Principal, TxContext},
};

use crate::{config::StoreConfig, traits::FeeLedger};

/// Length in characters (Unicode scalar values), matching the contract's
/// `string-utf8` limit semantics.
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The single authoritative repair log instance.
///
/// Construct one per host ledger state. The store owns the trusted
/// `FeeLedger` seam to the host and all record state; callers reach that
/// state only through the operations below.
pub struct RepairLogStore {
    config: StoreConfig,

    /// The next id to assign. Doubles as the total entry count, since ids
    /// are dense and entries are never removed.
    next_log_id: u64,

    /// Current per-entry fee. Starts at `config.logging_fee`; replaced by
    /// `set_logging_fee`.
    logging_fee: u64,

    /// Fee recipient and setup gate. `None` until `set_authority_contract`
    /// succeeds, then fixed for the lifetime of the store.
    authority: Option<Principal>,

    logs: HashMap<u64, LogEntry>,
    log_updates: HashMap<u64, LogUpdate>,
    logs_by_request: HashMap<u64, Vec<u64>>,

    ledger: Box<dyn FeeLedger>,
}

impl RepairLogStore {
    /// Create an empty store with the given configuration and host ledger.
    pub fn new(config: StoreConfig, ledger: Box<dyn FeeLedger>) -> Self {
        let logging_fee = config.logging_fee;
        Self {
            config,
            next_log_id: 0,
            logging_fee,
            authority: None,
            logs: HashMap::new(),
            log_updates: HashMap::new(),
            logs_by_request: HashMap::new(),
            ledger,
        }
    }

    /// Discard all record state and return to the post-construction state.
    ///
    /// The configuration and the ledger handle are retained; the fee drops
    /// back to its configured value and the authority becomes unset again.
    /// Exists for tests and host-side reinitialization.
    pub fn reset(&mut self) {
        self.next_log_id = 0;
        self.logging_fee = self.config.logging_fee;
        self.authority = None;
        self.logs.clear();
        self.log_updates.clear();
        self.logs_by_request.clear();
    }

    // ── Setup operations ──────────────────────────────────────────────────────

    /// Fix the fee-recipient authority. First write wins.
    ///
    /// Fails with `AuthorityAlreadySet` on every call after the first
    /// success, regardless of argument.
    pub fn set_authority_contract(&mut self, principal: Principal) -> FixchainResult<()> {
        if self.authority.is_some() {
            warn!(attempted = %principal, "rejected attempt to replace authority contract");
            return Err(FixchainError::AuthorityAlreadySet);
        }

        info!(authority = %principal, "authority contract set");
        self.authority = Some(principal);
        Ok(())
    }

    /// Replace the per-entry logging fee.
    ///
    /// Fails with `AuthorityNotSet` until an authority has been configured.
    /// Negative amounts are unrepresentable; `u64` enforces what the
    /// contract checked at runtime.
    pub fn set_logging_fee(&mut self, amount: u64) -> FixchainResult<()> {
        if self.authority.is_none() {
            return Err(FixchainError::AuthorityNotSet);
        }

        info!(old_fee = self.logging_fee, new_fee = amount, "logging fee updated");
        self.logging_fee = amount;
        Ok(())
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Validate and insert a new log entry, charging the logging fee.
    ///
    /// # Pipeline
    ///
    /// 1. Run the fixed validation order (see `validate_draft`), then the
    ///    authority check and the per-request cap. First failure wins.
    /// 2. Transfer `logging_fee` from `ctx.caller` to the authority. A
    ///    refused transfer aborts with `FeeTransferFailed` and no state change.
    /// 3. Assign `id = next_log_id`, insert the entry with
    ///    `timestamp = ctx.block_height` and `finalized = false`, append the
    ///    id to the request's sequence, advance the counter.
    ///
    /// The per-request cap is deliberately checked before the fee transfer.
    /// The original contract discovered the overflow only after charging the
    /// fee and inserting, leaking both; under the documented all-or-nothing
    /// execution model the cap is a validation failure like any other.
    pub fn add_log_entry(&mut self, ctx: &TxContext, draft: NewLogEntry) -> FixchainResult<LogId> {
        debug!(
            caller = %ctx.caller,
            block_height = ctx.block_height,
            request_id = draft.request_id,
            "add_log_entry starting"
        );

        let category = match self.validate_draft(&draft) {
            Ok(category) => category,
            Err(err) => {
                warn!(code = ?err.code(), %err, "log entry rejected");
                return Err(err);
            }
        };

        let authority = match &self.authority {
            Some(authority) => authority.clone(),
            None => {
                warn!("log entry rejected: no authority contract set");
                return Err(FixchainError::AuthorityNotSet);
            }
        };

        let request_len = self
            .logs_by_request
            .get(&draft.request_id)
            .map_or(0, Vec::len);
        if request_len >= REQUEST_LOG_CAP {
            warn!(request_id = draft.request_id, "log entry rejected: request at capacity");
            return Err(FixchainError::RequestLogLimitExceeded {
                request_id: draft.request_id,
            });
        }

        // All checks passed. Charge the fee first; the store's own state is
        // only touched once the host has accepted the transfer.
        self.ledger
            .transfer(self.logging_fee, &ctx.caller, &authority)
            .map_err(|err| {
                warn!(fee = self.logging_fee, %err, "log entry aborted: fee transfer refused");
                err
            })?;

        let id = self.next_log_id;
        let entry = LogEntry {
            request_id: draft.request_id,
            step: draft.step,
            proof_hash: draft.proof_hash,
            technician: draft.technician,
            component: draft.component,
            cost: draft.cost,
            duration: draft.duration,
            notes: draft.notes,
            verifier: draft.verifier,
            rating: draft.rating,
            review: draft.review,
            evidence: draft.evidence,
            category,
            timestamp: ctx.block_height,
            finalized: false,
        };

        self.logs.insert(id, entry);
        self.logs_by_request
            .entry(draft.request_id)
            .or_default()
            .push(id);
        self.next_log_id += 1;

        info!(
            id,
            request_id = draft.request_id,
            fee = self.logging_fee,
            "log entry recorded"
        );
        Ok(LogId(id))
    }

    /// Mark an entry as finalized, one-way.
    ///
    /// Only the entry's technician may finalize, and only once. Refreshes
    /// the entry's timestamp to the current block height.
    pub fn finalize_log(&mut self, ctx: &TxContext, id: LogId) -> FixchainResult<()> {
        let entry = self
            .logs
            .get_mut(&id.0)
            .ok_or(FixchainError::LogNotFound { id: id.0 })?;

        if entry.technician != ctx.caller {
            warn!(id = id.0, caller = %ctx.caller, "finalize rejected: caller is not the technician");
            return Err(FixchainError::NotTechnician {
                id: id.0,
                caller: ctx.caller.0.clone(),
            });
        }
        if entry.finalized {
            return Err(FixchainError::AlreadyFinalized { id: id.0 });
        }

        entry.finalized = true;
        entry.timestamp = ctx.block_height;

        info!(id = id.0, block_height = ctx.block_height, "log entry finalized");
        Ok(())
    }

    /// Amend an entry's step text.
    ///
    /// Same authorization and lifecycle checks as `finalize_log`, plus a
    /// length check on the replacement text. Overwrites the entry's `step`
    /// and `timestamp`, and replaces the single retained `LogUpdate` for
    /// this id: at most one amendment record exists per entry, the latest.
    pub fn update_log_step(
        &mut self,
        ctx: &TxContext,
        id: LogId,
        new_step: impl Into<String>,
    ) -> FixchainResult<()> {
        let new_step = new_step.into();

        let entry = self
            .logs
            .get_mut(&id.0)
            .ok_or(FixchainError::LogNotFound { id: id.0 })?;

        if entry.technician != ctx.caller {
            warn!(id = id.0, caller = %ctx.caller, "update rejected: caller is not the technician");
            return Err(FixchainError::NotTechnician {
                id: id.0,
                caller: ctx.caller.0.clone(),
            });
        }
        if entry.finalized {
            return Err(FixchainError::AlreadyFinalized { id: id.0 });
        }

        let len = char_len(&new_step);
        if len > MAX_STEP_LEN {
            return Err(FixchainError::InvalidUpdateParam { len });
        }

        entry.step = new_step.clone();
        entry.timestamp = ctx.block_height;
        self.log_updates.insert(
            id.0,
            LogUpdate {
                step: new_step,
                timestamp: ctx.block_height,
                updater: ctx.caller.clone(),
            },
        );

        info!(id = id.0, block_height = ctx.block_height, "log entry step updated");
        Ok(())
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Look up an entry by id. No side effects.
    pub fn get_log(&self, id: LogId) -> Option<&LogEntry> {
        self.logs.get(&id.0)
    }

    /// Look up the latest amendment record for an entry, if one exists.
    pub fn get_log_update(&self, id: LogId) -> Option<&LogUpdate> {
        self.log_updates.get(&id.0)
    }

    /// Total entries ever created. Equals the live count, since ids are never
    /// removed.
    pub fn log_count(&self) -> u64 {
        self.next_log_id
    }

    /// The ids recorded against a request, in creation order. Empty for an
    /// unknown request.
    pub fn logs_for_request(&self, request_id: u64) -> &[u64] {
        self.logs_by_request
            .get(&request_id)
            .map_or(&[], Vec::as_slice)
    }

    /// The configured fee recipient, if set.
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.as_ref()
    }

    /// The current per-entry fee.
    pub fn logging_fee(&self) -> u64 {
        self.logging_fee
    }

    // ── Validation pipeline ───────────────────────────────────────────────────

    /// The contract's fixed field validation order. The first failing check
    /// wins; each check maps to one error kind. Returns the parsed category
    /// on success.
    fn validate_draft(&self, draft: &NewLogEntry) -> FixchainResult<Category> {
        if self.next_log_id >= self.config.max_logs {
            return Err(FixchainError::MaxLogsExceeded {
                max: self.config.max_logs,
            });
        }
        if draft.request_id == 0 {
            return Err(FixchainError::InvalidRequestId);
        }

        let len = char_len(&draft.step);
        if len > MAX_STEP_LEN {
            return Err(FixchainError::InvalidStep { len });
        }
        let len = char_len(&draft.proof_hash);
        if len > MAX_PROOF_HASH_LEN {
            return Err(FixchainError::InvalidProofHash { len });
        }
        let len = char_len(&draft.component);
        if len > MAX_COMPONENT_LEN {
            return Err(FixchainError::InvalidComponent { len });
        }

        if draft.cost == 0 {
            return Err(FixchainError::InvalidCost);
        }
        if draft.duration == 0 {
            return Err(FixchainError::InvalidDuration);
        }

        let len = char_len(&draft.notes);
        if len > MAX_NOTES_LEN {
            return Err(FixchainError::InvalidNotes { len });
        }

        if draft.rating < MIN_RATING || draft.rating > MAX_RATING {
            return Err(FixchainError::InvalidRating { rating: draft.rating });
        }

        let len = char_len(&draft.review);
        if len > MAX_REVIEW_LEN {
            return Err(FixchainError::InvalidReview { len });
        }
        let len = char_len(&draft.evidence);
        if len > MAX_EVIDENCE_LEN {
            return Err(FixchainError::InvalidEvidence { len });
        }

        Category::from_str(&draft.category)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use fixchain_contracts::{
        entry::{LogId, NewLogEntry, REQUEST_LOG_CAP},
        error::{FixchainError, FixchainResult},
        principal::{Principal, TxContext},
    };

    use crate::{config::StoreConfig, traits::FeeLedger};

    use super::RepairLogStore;

    // ── Mock helpers ──────────────────────────────────────────────────────────

    /// A recorded transfer: (amount, from, to).
    type Transfer = (u64, String, String);

    /// A ledger that records every transfer and can be told to refuse them.
    struct MockLedger {
        transfers: Arc<Mutex<Vec<Transfer>>>,
        refuse: bool,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                transfers: Arc::new(Mutex::new(vec![])),
                refuse: false,
            }
        }

        fn refusing() -> Self {
            Self {
                transfers: Arc::new(Mutex::new(vec![])),
                refuse: true,
            }
        }
    }

    impl FeeLedger for MockLedger {
        fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> FixchainResult<()> {
            if self.refuse {
                return Err(FixchainError::FeeTransferFailed {
                    reason: "insufficient funds".to_string(),
                });
            }
            self.transfers
                .lock()
                .unwrap()
                .push((amount, from.0.clone(), to.0.clone()));
            Ok(())
        }
    }

    /// A store with defaults, plus a handle to its recorded transfers.
    fn make_store() -> (RepairLogStore, Arc<Mutex<Vec<Transfer>>>) {
        let ledger = MockLedger::new();
        let transfers = ledger.transfers.clone();
        (
            RepairLogStore::new(StoreConfig::default(), Box::new(ledger)),
            transfers,
        )
    }

    /// A store whose authority is already configured.
    fn make_ready_store() -> (RepairLogStore, Arc<Mutex<Vec<Transfer>>>) {
        let (mut store, transfers) = make_store();
        store.set_authority_contract(Principal::new("ST2AUTH")).unwrap();
        (store, transfers)
    }

    fn ctx(caller: &str) -> TxContext {
        TxContext::new(Principal::new(caller), 0)
    }

    fn ctx_at(caller: &str, block_height: u64) -> TxContext {
        TxContext::new(Principal::new(caller), block_height)
    }

    /// A fully valid draft with a distinguishable step text.
    fn draft(request_id: u64, step: &str) -> NewLogEntry {
        NewLogEntry {
            request_id,
            step: step.to_string(),
            proof_hash: "proof123".to_string(),
            technician: Principal::new("ST1TECH"),
            component: "RAM".to_string(),
            cost: 50,
            duration: 2,
            notes: "Notes here".to_string(),
            verifier: Principal::new("ST1VER"),
            rating: 4,
            review: "Good job".to_string(),
            evidence: "evidence.jpg".to_string(),
            category: "hardware".to_string(),
        }
    }

    // ── add_log_entry: success path ───────────────────────────────────────────

    /// The contract's worked example: first entry gets id 0, all fields land as
    /// submitted, the fee moves from caller to authority.
    #[test]
    fn add_records_entry_and_charges_fee() {
        let (mut store, transfers) = make_ready_store();

        let id = store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        assert_eq!(id, LogId(0));

        let entry = store.get_log(LogId(0)).expect("entry must exist");
        assert_eq!(entry.request_id, 1);
        assert_eq!(entry.step, "Diagnosis");
        assert_eq!(entry.proof_hash, "proof123");
        assert_eq!(entry.technician, Principal::new("ST1TECH"));
        assert_eq!(entry.component, "RAM");
        assert_eq!(entry.cost, 50);
        assert_eq!(entry.duration, 2);
        assert_eq!(entry.notes, "Notes here");
        assert_eq!(entry.verifier, Principal::new("ST1VER"));
        assert_eq!(entry.rating, 4);
        assert_eq!(entry.review, "Good job");
        assert_eq!(entry.evidence, "evidence.jpg");
        assert_eq!(entry.category.as_str(), "hardware");
        assert!(!entry.finalized);

        assert_eq!(
            *transfers.lock().unwrap(),
            vec![(100, "ST1TEST".to_string(), "ST2AUTH".to_string())]
        );
    }

    /// Ids start at 0 and increase by exactly 1 per successful add,
    /// regardless of request id reuse.
    #[test]
    fn add_assigns_dense_sequential_ids() {
        let (mut store, _) = make_ready_store();

        for (i, request_id) in [1u64, 7, 1, 3, 1].into_iter().enumerate() {
            let id = store.add_log_entry(&ctx("ST1TEST"), draft(request_id, "Step")).unwrap();
            assert_eq!(id, LogId(i as u64));
        }
        assert_eq!(store.log_count(), 5);
    }

    /// The entry's timestamp is the block height of the creating call.
    #[test]
    fn add_stamps_block_height() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx_at("ST1TEST", 42), draft(1, "Diagnosis")).unwrap();
        assert_eq!(store.get_log(LogId(0)).unwrap().timestamp, 42);
    }

    /// A zero fee is still a transfer; the host ledger sees every add.
    #[test]
    fn add_records_zero_fee_transfer() {
        let (mut store, transfers) = make_ready_store();
        store.set_logging_fee(0).unwrap();

        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        assert_eq!(transfers.lock().unwrap()[0].0, 0);
    }

    /// Length limits count characters, not bytes: 100 two-byte characters
    /// are within the step limit.
    #[test]
    fn add_counts_characters_not_bytes() {
        let (mut store, _) = make_ready_store();
        let step = "é".repeat(100);
        assert!(step.len() > 100, "precondition: multi-byte text");

        store.add_log_entry(&ctx("ST1TEST"), draft(1, &step)).unwrap();
        assert_eq!(store.log_count(), 1);
    }

    // ── add_log_entry: validation order and rejections ────────────────────────

    /// Each violated constraint yields its own error kind with the
    /// contract's denial code, and the store stays untouched.
    #[test]
    fn add_rejects_each_field_violation_with_its_code() {
        let long = |n: usize| "a".repeat(n);

        let cases: Vec<(NewLogEntry, u32)> = vec![
            (NewLogEntry { request_id: 0, ..draft(1, "Step") }, 201),
            (draft(1, &long(101)), 202),
            (NewLogEntry { proof_hash: long(257), ..draft(1, "Step") }, 203),
            (NewLogEntry { component: long(51), ..draft(1, "Step") }, 212),
            (NewLogEntry { cost: 0, ..draft(1, "Step") }, 213),
            (NewLogEntry { duration: 0, ..draft(1, "Step") }, 214),
            (NewLogEntry { notes: long(513), ..draft(1, "Step") }, 215),
            (NewLogEntry { rating: 0, ..draft(1, "Step") }, 217),
            (NewLogEntry { rating: 6, ..draft(1, "Step") }, 217),
            (NewLogEntry { review: long(257), ..draft(1, "Step") }, 218),
            (NewLogEntry { evidence: long(257), ..draft(1, "Step") }, 219),
            (NewLogEntry { category: "invalid".to_string(), ..draft(1, "Step") }, 220),
        ];

        for (bad_draft, expected_code) in cases {
            let (mut store, transfers) = make_ready_store();
            let err = store.add_log_entry(&ctx("ST1TEST"), bad_draft).unwrap_err();
            assert_eq!(err.code(), Some(expected_code), "wrong error: {:?}", err);
            assert_eq!(store.log_count(), 0, "rejected add must not create an entry");
            assert!(transfers.lock().unwrap().is_empty(), "rejected add must not charge");
        }
    }

    /// Boundary lengths are accepted: exactly-at-limit fields pass.
    #[test]
    fn add_accepts_fields_at_their_limits() {
        let (mut store, _) = make_ready_store();
        let at_limit = NewLogEntry {
            step: "a".repeat(100),
            proof_hash: "a".repeat(256),
            component: "a".repeat(50),
            notes: "a".repeat(512),
            review: "a".repeat(256),
            evidence: "a".repeat(256),
            rating: 5,
            cost: 1,
            duration: 1,
            ..draft(1, "unused")
        };
        store.add_log_entry(&ctx("ST1TEST"), at_limit).unwrap();
        assert_eq!(store.log_count(), 1);
    }

    /// When several constraints are violated at once, the first check in
    /// the pipeline order wins.
    #[test]
    fn add_reports_first_violation_in_pipeline_order() {
        let (mut store, _) = make_ready_store();

        // request_id and rating are both invalid; request_id is checked first.
        let bad = NewLogEntry { request_id: 0, rating: 6, ..draft(1, "Step") };
        let err = store.add_log_entry(&ctx("ST1TEST"), bad).unwrap_err();
        assert!(matches!(err, FixchainError::InvalidRequestId));

        // step and category are both invalid; step is checked first.
        let bad = NewLogEntry {
            step: "a".repeat(101),
            category: "invalid".to_string(),
            ..draft(1, "unused")
        };
        let err = store.add_log_entry(&ctx("ST1TEST"), bad).unwrap_err();
        assert!(matches!(err, FixchainError::InvalidStep { len: 101 }));
    }

    /// Capacity is the very first check; it wins even over an invalid
    /// request id.
    #[test]
    fn add_checks_capacity_before_anything_else() {
        let config = StoreConfig { max_logs: 1, ..StoreConfig::default() };
        let mut store = RepairLogStore::new(config, Box::new(MockLedger::new()));
        store.set_authority_contract(Principal::new("ST2AUTH")).unwrap();

        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();

        let err = store.add_log_entry(&ctx("ST1TEST"), draft(0, "Repair")).unwrap_err();
        assert!(matches!(err, FixchainError::MaxLogsExceeded { max: 1 }));
    }

    /// A fully valid draft is still rejected while no authority is set, and
    /// nothing is charged.
    #[test]
    fn add_requires_authority() {
        let (mut store, transfers) = make_store();

        let err = store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap_err();
        assert!(matches!(err, FixchainError::AuthorityNotSet));
        assert_eq!(err.code(), Some(210));
        assert!(transfers.lock().unwrap().is_empty());
    }

    /// The 101st entry for one request is rejected with no side effects:
    /// no fee leaves the caller and no id is consumed. (The original
    /// contract charged the fee before discovering the overflow; the
    /// all-or-nothing execution model makes that a plain rejection here.)
    #[test]
    fn add_rejects_request_over_cap_without_side_effects() {
        let (mut store, transfers) = make_ready_store();

        for _ in 0..REQUEST_LOG_CAP {
            store.add_log_entry(&ctx("ST1TEST"), draft(1, "Step")).unwrap();
        }
        assert_eq!(store.logs_for_request(1).len(), REQUEST_LOG_CAP);
        let transfers_before = transfers.lock().unwrap().len();

        let err = store.add_log_entry(&ctx("ST1TEST"), draft(1, "Overflow")).unwrap_err();
        assert!(matches!(err, FixchainError::RequestLogLimitExceeded { request_id: 1 }));
        assert_eq!(err.code(), Some(208));

        assert_eq!(store.log_count(), REQUEST_LOG_CAP as u64);
        assert_eq!(transfers.lock().unwrap().len(), transfers_before);

        // Other requests are unaffected by one request's cap.
        store.add_log_entry(&ctx("ST1TEST"), draft(2, "Elsewhere")).unwrap();
    }

    /// A refused fee transfer aborts the whole add: no entry, no id, no
    /// request index change.
    #[test]
    fn add_aborts_cleanly_when_fee_transfer_refused() {
        let mut store = RepairLogStore::new(StoreConfig::default(), Box::new(MockLedger::refusing()));
        store.set_authority_contract(Principal::new("ST2AUTH")).unwrap();

        let err = store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap_err();
        assert!(matches!(err, FixchainError::FeeTransferFailed { .. }));

        assert_eq!(store.log_count(), 0);
        assert!(store.get_log(LogId(0)).is_none());
        assert!(store.logs_for_request(1).is_empty());
    }

    // ── Setup operations ──────────────────────────────────────────────────────

    /// The authority is first-write-wins: exactly one success, every later
    /// call fails and the stored value never changes.
    #[test]
    fn authority_is_set_exactly_once() {
        let (mut store, _) = make_store();

        store.set_authority_contract(Principal::new("ST2AUTH")).unwrap();

        let err = store.set_authority_contract(Principal::new("ST3OTHER")).unwrap_err();
        assert!(matches!(err, FixchainError::AuthorityAlreadySet));

        // Even retrying the same principal fails.
        let err = store.set_authority_contract(Principal::new("ST2AUTH")).unwrap_err();
        assert!(matches!(err, FixchainError::AuthorityAlreadySet));

        assert_eq!(store.authority(), Some(&Principal::new("ST2AUTH")));
    }

    #[test]
    fn fee_cannot_be_set_before_authority() {
        let (mut store, _) = make_store();
        let err = store.set_logging_fee(25).unwrap_err();
        assert!(matches!(err, FixchainError::AuthorityNotSet));
        assert_eq!(store.logging_fee(), 100);
    }

    /// A replaced fee is what subsequent adds charge.
    #[test]
    fn fee_update_applies_to_later_adds() {
        let (mut store, transfers) = make_ready_store();
        store.set_logging_fee(250).unwrap();

        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        assert_eq!(transfers.lock().unwrap()[0].0, 250);
    }

    // ── finalize_log ──────────────────────────────────────────────────────────

    /// The technician finalizes their own entry; the flag flips and the
    /// timestamp refreshes.
    #[test]
    fn finalize_by_technician_succeeds() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx_at("ST1TEST", 5), draft(1, "Diagnosis")).unwrap();

        store.finalize_log(&ctx_at("ST1TECH", 9), LogId(0)).unwrap();

        let entry = store.get_log(LogId(0)).unwrap();
        assert!(entry.finalized);
        assert_eq!(entry.timestamp, 9);
    }

    #[test]
    fn finalize_rejects_non_technician() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();

        let err = store.finalize_log(&ctx("ST2MALLORY"), LogId(0)).unwrap_err();
        match err {
            FixchainError::NotTechnician { id: 0, caller } => assert_eq!(caller, "ST2MALLORY"),
            other => panic!("expected NotTechnician, got {:?}", other),
        }
        assert!(!store.get_log(LogId(0)).unwrap().finalized);
    }

    #[test]
    fn finalize_rejects_unknown_id() {
        let (mut store, _) = make_ready_store();
        let err = store.finalize_log(&ctx("ST1TECH"), LogId(999)).unwrap_err();
        assert!(matches!(err, FixchainError::LogNotFound { id: 999 }));
    }

    /// Finalization is one-way: a second finalize fails and the entry stays
    /// finalized.
    #[test]
    fn finalize_is_one_way() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        store.finalize_log(&ctx("ST1TECH"), LogId(0)).unwrap();

        let err = store.finalize_log(&ctx("ST1TECH"), LogId(0)).unwrap_err();
        assert!(matches!(err, FixchainError::AlreadyFinalized { id: 0 }));
        assert!(store.get_log(LogId(0)).unwrap().finalized);
    }

    // ── update_log_step ───────────────────────────────────────────────────────

    /// A successful amendment rewrites the entry's step, refreshes its
    /// timestamp, and records who amended it.
    #[test]
    fn update_rewrites_step_and_records_amendment() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx_at("ST1TEST", 3), draft(1, "Old step")).unwrap();

        store.update_log_step(&ctx_at("ST1TECH", 8), LogId(0), "New step").unwrap();

        let entry = store.get_log(LogId(0)).unwrap();
        assert_eq!(entry.step, "New step");
        assert_eq!(entry.timestamp, 8);

        let update = store.get_log_update(LogId(0)).expect("amendment must be retained");
        assert_eq!(update.step, "New step");
        assert_eq!(update.timestamp, 8);
        assert_eq!(update.updater, Principal::new("ST1TECH"));
    }

    /// Amendment records replace, never append: only the latest survives.
    #[test]
    fn update_retains_only_the_latest_amendment() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Original")).unwrap();

        store.update_log_step(&ctx_at("ST1TECH", 4), LogId(0), "First amendment").unwrap();
        store.update_log_step(&ctx_at("ST1TECH", 6), LogId(0), "Second amendment").unwrap();

        let update = store.get_log_update(LogId(0)).unwrap();
        assert_eq!(update.step, "Second amendment");
        assert_eq!(update.timestamp, 6);
    }

    #[test]
    fn update_rejects_unknown_id() {
        let (mut store, _) = make_ready_store();
        let err = store.update_log_step(&ctx("ST1TECH"), LogId(999), "New step").unwrap_err();
        assert!(matches!(err, FixchainError::LogNotFound { id: 999 }));
    }

    #[test]
    fn update_rejects_non_technician() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();

        let err = store.update_log_step(&ctx("ST2MALLORY"), LogId(0), "New step").unwrap_err();
        assert!(matches!(err, FixchainError::NotTechnician { .. }));
        assert_eq!(store.get_log(LogId(0)).unwrap().step, "Diagnosis");
    }

    /// A finalized entry can no longer be amended.
    #[test]
    fn update_rejects_finalized_entry() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        store.finalize_log(&ctx("ST1TECH"), LogId(0)).unwrap();

        let err = store.update_log_step(&ctx("ST1TECH"), LogId(0), "New step").unwrap_err();
        assert!(matches!(err, FixchainError::AlreadyFinalized { id: 0 }));
    }

    #[test]
    fn update_rejects_overlong_step() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();

        let long_step = "a".repeat(101);
        let err = store.update_log_step(&ctx("ST1TECH"), LogId(0), long_step).unwrap_err();
        assert!(matches!(err, FixchainError::InvalidUpdateParam { len: 101 }));
        assert_eq!(err.code(), Some(209));

        assert_eq!(store.get_log(LogId(0)).unwrap().step, "Diagnosis");
        assert!(store.get_log_update(LogId(0)).is_none());
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// `log_count` tracks successful adds only.
    #[test]
    fn log_count_equals_successful_adds() {
        let (mut store, _) = make_ready_store();
        assert_eq!(store.log_count(), 0);

        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        store.add_log_entry(&ctx("ST1TEST"), draft(2, "Repair")).unwrap();
        assert_eq!(store.log_count(), 2);

        store
            .add_log_entry(&ctx("ST1TEST"), NewLogEntry { rating: 6, ..draft(1, "Step") })
            .unwrap_err();
        assert_eq!(store.log_count(), 2);
    }

    /// Entries for one request come back in creation order; other requests'
    /// entries never leak in.
    #[test]
    fn logs_for_request_preserves_creation_order() {
        let (mut store, _) = make_ready_store();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap(); // id 0
        store.add_log_entry(&ctx("ST1TEST"), draft(2, "Unrelated")).unwrap(); // id 1
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Repair")).unwrap(); // id 2

        assert_eq!(store.logs_for_request(1), &[0, 2]);
        assert_eq!(store.logs_for_request(2), &[1]);
        assert!(store.logs_for_request(99).is_empty());
    }

    #[test]
    fn get_log_returns_none_for_unknown_id() {
        let (store, _) = make_ready_store();
        assert!(store.get_log(LogId(0)).is_none());
    }

    // ── reset ─────────────────────────────────────────────────────────────────

    /// `reset` restores the post-construction state: empty maps, unset
    /// authority, configured fee.
    #[test]
    fn reset_restores_initial_state() {
        let (mut store, _) = make_ready_store();
        store.set_logging_fee(999).unwrap();
        store.add_log_entry(&ctx("ST1TEST"), draft(1, "Diagnosis")).unwrap();
        store.update_log_step(&ctx("ST1TECH"), LogId(0), "Amended").unwrap();

        store.reset();

        assert_eq!(store.log_count(), 0);
        assert!(store.authority().is_none());
        assert_eq!(store.logging_fee(), 100);
        assert!(store.get_log(LogId(0)).is_none());
        assert!(store.get_log_update(LogId(0)).is_none());
        assert!(store.logs_for_request(1).is_empty());

        // The store is usable again after reset.
        store.set_authority_contract(Principal::new("ST2AUTH")).unwrap();
        let id = store.add_log_entry(&ctx("ST1TEST"), draft(1, "Fresh")).unwrap();
        assert_eq!(id, LogId(0));
    }
}
