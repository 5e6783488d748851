//! FIXCHAIN Repair Log demo CLI
//!
//! Runs one or all of the repair log walkthroughs.  Each scenario wires a
//! real store to a real in-memory ledger and drives the full operation
//! surface: authority setup, fee configuration, entry creation, amendment,
//! finalization, and queries.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- workshop-day
//!   cargo run -p demo -- rejections
//!   cargo run -p demo -- insufficient-funds

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fixchain_contracts::{
    entry::NewLogEntry,
    error::FixchainResult,
    principal::{Principal, TxContext},
};
use fixchain_ledger::InMemoryLedger;
use fixchain_store::{RepairLogStore, StoreConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// FIXCHAIN on-chain repair log demo.
///
/// Each subcommand runs one or all of the walkthrough scenarios,
/// demonstrating the store's validation pipeline, fee charging, and the
/// technician-only amendment/finalization rules.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "FIXCHAIN repair log demo",
    long_about = "Runs FIXCHAIN repair log scenarios showing field validation,\n\
                  fee transfers, technician authorization, and read queries."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all scenarios in sequence.
    RunAll,
    /// A full day in the workshop: setup, entries, amendment, finalization.
    WorkshopDay,
    /// Walk the validation pipeline showing each denial and its code.
    Rejections,
    /// A balance-enforced ledger aborting an add the caller cannot pay for.
    InsufficientFunds,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::WorkshopDay => run_workshop_day(),
        Command::Rejections => run_rejections(),
        Command::InsufficientFunds => run_insufficient_funds(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> FixchainResult<()> {
    run_workshop_day()?;
    run_rejections()?;
    run_insufficient_funds()?;
    Ok(())
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn ctx(caller: &str, block_height: u64) -> TxContext {
    TxContext::new(Principal::new(caller), block_height)
}

fn draft(request_id: u64, step: &str, technician: &str, category: &str) -> NewLogEntry {
    NewLogEntry {
        request_id,
        step: step.to_string(),
        proof_hash: "b7e1d3…".to_string(),
        technician: Principal::new(technician),
        component: "mainboard".to_string(),
        cost: 120,
        duration: 3,
        notes: "Replaced the faulty part and re-seated connectors.".to_string(),
        verifier: Principal::new("ST3QA"),
        rating: 5,
        review: "Clean work".to_string(),
        evidence: "before-after.jpg".to_string(),
        category: category.to_string(),
    }
}

// ── Scenario 1: workshop day ──────────────────────────────────────────────────

/// The happy path, end to end: authority setup, fee configuration, several
/// entries across two requests, an amendment, a finalization, and queries.
fn run_workshop_day() -> FixchainResult<()> {
    println!("=== Scenario 1: A Day in the Workshop ===");
    println!();

    let ledger = InMemoryLedger::new();
    let mut store = RepairLogStore::new(StoreConfig::default(), Box::new(ledger.clone()));

    store.set_authority_contract(Principal::new("ST2AUTH"))?;
    store.set_logging_fee(75)?;
    println!("  Authority contract:  ST2AUTH");
    println!("  Logging fee:         {} per entry", store.logging_fee());

    let first = store.add_log_entry(
        &ctx("ST1ALICE", 100),
        draft(11, "Diagnosed dead capacitor", "ST1ALICE", "diagnostic"),
    )?;
    let second = store.add_log_entry(
        &ctx("ST1ALICE", 101),
        draft(11, "Replaced capacitor bank", "ST1ALICE", "hardware"),
    )?;
    let third = store.add_log_entry(
        &ctx("ST1BOB", 102),
        draft(12, "Reflashed firmware", "ST1BOB", "software"),
    )?;
    println!("  Created entries:     {}, {}, {}", first, second, third);

    // Alice refines her first entry, then signs it off.
    store.update_log_step(&ctx("ST1ALICE", 103), first, "Diagnosed dead capacitor (C17)")?;
    store.finalize_log(&ctx("ST1ALICE", 104), first)?;

    let amendment = store
        .get_log_update(first)
        .expect("amendment was just recorded");
    println!(
        "  Entry {} amended at height {} by {}, then finalized",
        first, amendment.timestamp, amendment.updater
    );

    println!("  Entries for request 11: {:?}", store.logs_for_request(11));
    println!("  Entries for request 12: {:?}", store.logs_for_request(12));
    println!("  Total entries:          {}", store.log_count());

    let fees: u64 = ledger.transfers().iter().map(|t| t.amount).sum();
    println!(
        "  Fees collected:         {} across {} transfer(s)",
        fees,
        ledger.transfers().len()
    );

    let finalized = store.get_log(first).expect("entry exists");
    println!("  Finalized entry as JSON:");
    println!(
        "{}",
        serde_json::to_string_pretty(finalized).expect("entries always serialize")
    );
    println!();
    Ok(())
}

// ── Scenario 2: rejections ────────────────────────────────────────────────────

/// Drives one violation per validation check and prints the denial code the
/// on-chain contract would report for it.
fn run_rejections() -> FixchainResult<()> {
    println!("=== Scenario 2: The Validation Pipeline ===");
    println!();

    let mut store = RepairLogStore::new(StoreConfig::default(), Box::new(InMemoryLedger::new()));
    store.set_authority_contract(Principal::new("ST2AUTH"))?;

    let good = || draft(11, "Diagnosis", "ST1ALICE", "hardware");
    let rejects: Vec<(&str, NewLogEntry)> = vec![
        ("zero request id", NewLogEntry { request_id: 0, ..good() }),
        ("overlong step", NewLogEntry { step: "x".repeat(101), ..good() }),
        ("overlong proof hash", NewLogEntry { proof_hash: "x".repeat(257), ..good() }),
        ("overlong component", NewLogEntry { component: "x".repeat(51), ..good() }),
        ("zero cost", NewLogEntry { cost: 0, ..good() }),
        ("zero duration", NewLogEntry { duration: 0, ..good() }),
        ("overlong notes", NewLogEntry { notes: "x".repeat(513), ..good() }),
        ("rating out of range", NewLogEntry { rating: 6, ..good() }),
        ("overlong review", NewLogEntry { review: "x".repeat(257), ..good() }),
        ("overlong evidence", NewLogEntry { evidence: "x".repeat(257), ..good() }),
        ("unknown category", NewLogEntry { category: "firmware".to_string(), ..good() }),
    ];

    for (label, bad) in rejects {
        match store.add_log_entry(&ctx("ST1ALICE", 200), bad) {
            Err(err) => println!(
                "  {:<22} code {:>3}  {}",
                label,
                err.code().map_or("-".to_string(), |c| c.to_string()),
                err
            ),
            Ok(id) => println!("  {:<22} UNEXPECTEDLY ACCEPTED as {}", label, id),
        }
    }

    println!();
    println!("  No entry was created: log count is {}", store.log_count());
    println!();
    Ok(())
}

// ── Scenario 3: insufficient funds ────────────────────────────────────────────

/// A balance-enforced ledger: the first entry is affordable, the second is
/// not, and the failed add leaves neither an entry nor a transfer behind.
fn run_insufficient_funds() -> FixchainResult<()> {
    println!("=== Scenario 3: Insufficient Funds ===");
    println!();

    let caller = Principal::new("ST1CARL");
    let ledger = InMemoryLedger::with_balances([(caller.clone(), 150)]);
    let mut store = RepairLogStore::new(StoreConfig::default(), Box::new(ledger.clone()));
    store.set_authority_contract(Principal::new("ST2AUTH"))?;

    println!("  Opening balance:  150 (fee is {})", store.logging_fee());

    let id = store.add_log_entry(
        &ctx("ST1CARL", 300),
        draft(21, "First repair step", "ST1CARL", "hardware"),
    )?;
    println!(
        "  First add:        accepted as {} (balance now {})",
        id,
        ledger.balance_of(&caller).unwrap_or(0)
    );

    match store.add_log_entry(
        &ctx("ST1CARL", 301),
        draft(21, "Second repair step", "ST1CARL", "hardware"),
    ) {
        Err(err) => println!("  Second add:       REJECTED: {}", err),
        Ok(id) => println!("  Second add:       UNEXPECTEDLY ACCEPTED as {}", id),
    }

    println!(
        "  Store unchanged:  {} entr(y/ies), request 21 holds {:?}",
        store.log_count(),
        store.logs_for_request(21)
    );
    println!(
        "  Ledger unchanged: {} transfer(s), balance still {}",
        ledger.transfers().len(),
        ledger.balance_of(&caller).unwrap_or(0)
    );
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("FIXCHAIN On-chain Repair Log");
    println!("Demo Walkthroughs");
    println!("==============================");
    println!();
    println!("Repair log pipeline per entry:");
    println!("  [1] Fixed-order field validation: first failing check wins");
    println!("  [2] Authority + per-request capacity checks");
    println!("  [3] Logging fee transferred from caller to authority");
    println!("  [4] Entry persisted; id appended to its request's sequence");
    println!("  [5] Technician-only amendment and one-way finalization");
    println!();
}
