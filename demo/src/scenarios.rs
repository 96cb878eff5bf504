//! Demo scenarios.
//!
//! Each scenario wires real components (rules validator, session journal,
//! in-memory store and issue directory) around one execution session of the
//! login test case and prints what happens at every step.

use std::collections::BTreeMap;
use std::path::Path;

use testrun_contracts::{
    error::TestRunResult,
    execution::IssueId,
    issue::IssueProposal,
    outcome::{OverallResult, StepOutcome},
    submission::Attachment,
};
use testrun_core::{ExecutionSession, Moderator, SubmissionOutcome};
use testrun_ledger::{InMemoryExecutionStore, InMemoryIssueDirectory, InMemorySessionJournal};
use testrun_rules::{default_validator, RuleConfig, SchemaValidator};

use crate::fixtures::{login_test_case, open_issues, regression_cycle};

// ── Harness ───────────────────────────────────────────────────────────────────

/// A moderator plus handles on the collaborators it was given, so scenarios
/// can inspect the store and journal afterwards.
pub struct Harness {
    pub moderator: Moderator,
    pub journal: InMemorySessionJournal,
    pub store: InMemoryExecutionStore,
}

impl Harness {
    /// Build a harness using the rules at `rules`, or the built-in rules.
    pub fn new(rules: Option<&Path>) -> TestRunResult<Self> {
        let validator = match rules {
            Some(path) => SchemaValidator::new(RuleConfig::from_file(path)?.into_schema()?),
            None => default_validator()?,
        };
        println!(
            "Submission rules: {} ({} rule(s))",
            validator.schema().schema_id,
            validator.schema().rules.len()
        );
        println!();
        let journal = InMemorySessionJournal::new();
        let store = InMemoryExecutionStore::new();
        let moderator = Moderator::new(
            Box::new(store.clone()),
            Box::new(InMemoryIssueDirectory::new(open_issues())),
            Box::new(journal.clone()),
            Box::new(validator),
        );
        Ok(Self {
            moderator,
            journal,
            store,
        })
    }

    fn start(&self) -> TestRunResult<ExecutionSession> {
        self.moderator.start(&login_test_case(), Some(regression_cycle()))
    }

    fn record(&self, session: &mut ExecutionSession, index: usize, outcome: StepOutcome) -> TestRunResult<()> {
        let result = self.moderator.record_step(session, index, outcome.clone())?;
        println!(
            "  step {} -> {:<7} steps: {:<28} result: {}",
            index,
            outcome.to_string(),
            render_steps(session),
            result
        );
        Ok(())
    }

    fn submit(&self, session: &ExecutionSession) -> TestRunResult<()> {
        match self.moderator.submit(session)? {
            SubmissionOutcome::Saved(ack) => println!("  Submitted:              {}", ack.message),
            SubmissionOutcome::Rejected(report) => println!("  Submission rejected:    {}", report.summary()),
        }
        Ok(())
    }

    fn print_journal(&self, session: &ExecutionSession) -> TestRunResult<()> {
        let history = self.journal.export_history(&session.execution_id)?;
        let intact = self.journal.verify_integrity(&session.execution_id)?;
        println!(
            "  Journal integrity:      {} ({} event(s), finalized: {})",
            if intact { "VERIFIED" } else { "FAILED" },
            history.events.len(),
            history.finalized
        );
        Ok(())
    }
}

fn render_steps(session: &ExecutionSession) -> String {
    let cells: Vec<String> = session.steps().iter().map(|s| s.to_string()).collect();
    format!("[{}]", cells.join(", "))
}

fn describe_issue(proposal: &IssueProposal) -> String {
    match proposal {
        IssueProposal::None => "none".to_string(),
        IssueProposal::CreateNew { handle_issue, test_cycle_id } => format!(
            "create new (handle issue: {}, cycle: {})",
            handle_issue,
            test_cycle_id.as_ref().map_or("-", |c| c.0.as_str())
        ),
        IssueProposal::LinkExisting { issue_id } => format!(
            "link existing ({})",
            issue_id.as_ref().map_or("-", |i| i.0.as_str())
        ),
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// All three steps pass; the result is derived once the last one is filled.
pub fn all_passed(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: all steps pass ===");
    println!();

    let mut session = h.start()?;
    h.record(&mut session, 0, StepOutcome::Passed)?;
    h.record(&mut session, 1, StepOutcome::Passed)?;
    h.record(&mut session, 2, StepOutcome::Passed)?;
    println!();
    println!("  Overall result:         {}", session.result());
    println!("  Issue proposal:         {}", describe_issue(session.issue()));

    h.submit(&session)?;
    h.print_journal(&session)?;
    println!();
    Ok(())
}

/// The last step fails; a new issue is proposed and submission needs remarks.
pub fn failed_step(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: a failing step raises an issue ===");
    println!();

    let mut session = h.start()?;
    h.record(&mut session, 0, StepOutcome::Passed)?;
    h.record(&mut session, 1, StepOutcome::Passed)?;
    h.record(&mut session, 2, StepOutcome::Failed)?;
    println!();
    println!("  Overall result:         {}", session.result());
    println!("  Issue proposal:         {}", describe_issue(session.issue()));

    println!("  Submitting without remarks...");
    h.submit(&session)?;

    session.set_remarks("Sign in returns HTTP 500 after valid credentials");
    session.attach(Attachment {
        name: "sign-in-500.png".to_string(),
        reference: "uploads/executions/sign-in-500.png".to_string(),
    });
    println!("  Submitting with remarks and {} attachment(s)...", session.attachments().len());
    h.submit(&session)?;

    if let Some(saved) = h.store.latest(&session.execution_id)? {
        println!("  Stored isIssue:         {}", saved.is_issue);
    }
    h.print_journal(&session)?;
    println!();
    Ok(())
}

/// The tester takes over the result, then corrects a step; the result holds.
pub fn manual_override(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: manual override freezes the result ===");
    println!();

    let mut session = h.start()?;
    h.record(&mut session, 0, StepOutcome::Passed)?;
    h.record(&mut session, 1, StepOutcome::Passed)?;
    h.record(&mut session, 2, StepOutcome::Failed)?;

    println!("  Result selector opened: manual override ON");
    h.moderator.open_result_selector(&mut session)?;

    h.record(&mut session, 2, StepOutcome::Passed)?;
    println!();
    println!(
        "  Overall result:         {} (not recomputed; override is set)",
        session.result()
    );

    h.moderator.choose_result(&mut session, OverallResult::Caution)?;
    println!("  Tester chose:           {}", session.result());
    println!("  Issue proposal:         {}", describe_issue(session.issue()));

    session.set_remarks("Passed on retry; flaky under load");
    h.submit(&session)?;
    h.print_journal(&session)?;
    println!();
    Ok(())
}

/// All steps are marked passed in one bulk update.
pub fn bulk_update(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: bulk step update ===");
    println!();

    let mut session = h.start()?;
    let updates: BTreeMap<usize, StepOutcome> = (0..session.steps().len())
        .map(|i| (i, StepOutcome::Passed))
        .collect();
    let result = h.moderator.record_steps(&mut session, &updates)?;

    println!("  Applied {} update(s) in one pass", updates.len());
    println!("  Steps:                  {}", render_steps(&session));
    println!("  Overall result:         {}", result);

    h.submit(&session)?;
    h.print_journal(&session)?;
    println!();
    Ok(())
}

/// A failed run is linked to an existing issue; the unexecuted step is dropped.
pub fn link_existing(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: link a failure to an existing issue ===");
    println!();

    let mut session = h.start()?;
    h.record(&mut session, 0, StepOutcome::Passed)?;
    h.record(&mut session, 2, StepOutcome::Failed)?;

    h.moderator.open_result_selector(&mut session)?;
    h.moderator.choose_result(&mut session, OverallResult::Failed)?;

    let hits = h.moderator.search_issues("sign in")?;
    for issue in &hits {
        println!(
            "  Found issue:            {} {} ({:?})",
            issue.custom_id, issue.title, issue.severity
        );
    }
    h.moderator.link_existing_issue(&mut session, IssueId::new("abc123"))?;
    println!("  Issue proposal:         {}", describe_issue(session.issue()));

    session.set_remarks("Second click on sign in is ignored");
    let payload = session.prepare_submission();
    println!(
        "  Payload:                {}",
        serde_json::to_string(&payload).unwrap_or_default()
    );

    h.submit(&session)?;
    h.print_journal(&session)?;
    println!();
    Ok(())
}

/// The store fails once; the session is intact and the retry succeeds.
pub fn retry_submit(h: &Harness) -> TestRunResult<()> {
    println!("=== Scenario: submission failure and retry ===");
    println!();

    let mut session = h.start()?;
    let updates: BTreeMap<usize, StepOutcome> = [
        (0, StepOutcome::Passed),
        (1, StepOutcome::Passed),
        (2, StepOutcome::Passed),
    ]
    .into_iter()
    .collect();
    h.moderator.record_steps(&mut session, &updates)?;

    h.store.fail_next(1)?;
    match h.moderator.submit(&session) {
        Ok(_) => println!("  First submit unexpectedly succeeded"),
        Err(e) => println!("  First submit:           {}", e),
    }
    println!(
        "  Session after failure:  result {} steps {}",
        session.result(),
        render_steps(&session)
    );

    h.submit(&session)?;
    println!(
        "  Stored revisions:       {}",
        h.store.revision_count(&session.execution_id)?
    );
    h.print_journal(&session)?;
    println!();
    Ok(())
}
