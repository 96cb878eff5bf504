//! Test execution moderation — Demo CLI
//!
//! Runs one or all of the execution scenarios. Each scenario uses the real
//! components (submission rules, session journal, moderator) wired to an
//! in-memory store and issue directory.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- manual-override
//!   cargo run -p demo -- --rules rules.toml failed-step

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use testrun_contracts::error::TestRunResult;

mod fixtures;
mod scenarios;

use scenarios::Harness;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Record test step outcomes and watch the overall result follow them.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Test execution moderation demo",
    long_about = "Runs execution scenarios showing result derivation from step outcomes,\n\
                  manual override, issue proposal, submission rules, and the session journal."
)]
struct Cli {
    /// TOML submission rules to use instead of the built-in set.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// All steps pass; result derives to Passed.
    AllPassed,
    /// Last step fails; a new issue is proposed and remarks are enforced.
    FailedStep,
    /// Manual override keeps the result after a step is corrected.
    ManualOverride,
    /// All steps recorded in one bulk update.
    BulkUpdate,
    /// A failure is linked to an existing issue.
    LinkExisting,
    /// The store fails once and the submission is retried.
    RetrySubmit,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = Harness::new(cli.rules.as_deref()).and_then(|h| run(&h, cli.command));

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

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run(h: &Harness, command: Command) -> TestRunResult<()> {
    match command {
        Command::RunAll => {
            scenarios::all_passed(h)?;
            scenarios::failed_step(h)?;
            scenarios::manual_override(h)?;
            scenarios::bulk_update(h)?;
            scenarios::link_existing(h)?;
            scenarios::retry_submit(h)
        }
        Command::AllPassed => scenarios::all_passed(h),
        Command::FailedStep => scenarios::failed_step(h),
        Command::ManualOverride => scenarios::manual_override(h),
        Command::BulkUpdate => scenarios::bulk_update(h),
        Command::LinkExisting => scenarios::link_existing(h),
        Command::RetrySubmit => scenarios::retry_submit(h),
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Test Execution Moderation");
    println!("=========================");
    println!();
    println!("Per session:");
    println!("  [1] Step outcomes recorded one at a time or in bulk");
    println!("  [2] Once every step is filled: any Failed -> Failed, all Passed -> Passed");
    println!("  [3] Opening the result selector hands the result to the tester for good");
    println!("  [4] A Failed result proposes a new issue; linking an existing one replaces it");
    println!("  [5] Submission: rules check -> store -> hash-chained journal finalized");
    println!();
}
