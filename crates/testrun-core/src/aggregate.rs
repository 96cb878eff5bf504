//! Overall-result aggregation over step outcomes.
//!
//! Every function here is pure: inputs are borrowed, new values are
//! returned, and nothing is logged or stored. The session and moderator
//! layer state and side effects on top.
//!
//! The rule, applied identically after single and bulk updates:
//!
//!   not all filled        → leave the result as it is
//!   all filled, any Failed → Failed
//!   all filled, all Passed → Passed
//!   all filled, otherwise  → Unset (only reachable via free-form outcomes)
//!
//! and never overwrite a result once the manual override is set.

use std::collections::BTreeMap;

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    execution::TestCycleId,
    issue::IssueProposal,
    outcome::{ExecutionSteps, OverallResult, StepOutcome},
    submission::{Attachment, SubmissionPayload},
};

/// The three facts aggregation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTally {
    pub all_filled: bool,
    pub any_failed: bool,
    pub all_passed: bool,
}

/// What the step outcomes say about the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Some step has no outcome yet; the current result stands.
    Pending,
    /// Every step has an outcome and this is the result they imply.
    Derived(OverallResult),
}

/// Count the sequence. A zero-length sequence is never `all_filled`.
pub fn tally(steps: &ExecutionSteps) -> StepTally {
    let all_filled = !steps.is_empty() && steps.iter().all(StepOutcome::is_filled);
    let any_failed = steps.iter().any(|s| *s == StepOutcome::Failed);
    let all_passed = all_filled && steps.iter().all(|s| *s == StepOutcome::Passed);
    StepTally {
        all_filled,
        any_failed,
        all_passed,
    }
}

/// Apply the aggregation rule to `steps`, ignoring the override flag.
pub fn derive(steps: &ExecutionSteps) -> Derivation {
    let t = tally(steps);
    if !t.all_filled {
        Derivation::Pending
    } else if t.any_failed {
        Derivation::Derived(OverallResult::Failed)
    } else if t.all_passed {
        Derivation::Derived(OverallResult::Passed)
    } else {
        Derivation::Derived(OverallResult::Unset)
    }
}

/// The result a session should hold after `derivation`.
///
/// Pending derivations and manually overridden sessions keep `current`.
pub fn resolve(current: OverallResult, derivation: Derivation, manual_override: bool) -> OverallResult {
    match derivation {
        Derivation::Derived(result) if !manual_override => result,
        _ => current,
    }
}

/// Replace the outcome at `index` and re-derive.
///
/// `steps` is left untouched; the updated copy is returned alongside the
/// derivation. Fails with `StepOutOfRange` when `index` is past the end.
pub fn apply_step_outcome(
    steps: &ExecutionSteps,
    index: usize,
    outcome: StepOutcome,
) -> TestRunResult<(ExecutionSteps, Derivation)> {
    let mut next = steps.clone();
    next.replace(index, outcome)?;
    let derivation = derive(&next);
    Ok((next, derivation))
}

/// Apply every update against the same snapshot, then derive once.
///
/// Indices are checked before anything is written, so an out-of-range
/// entry rejects the whole batch.
pub fn apply_bulk_step_outcomes(
    steps: &ExecutionSteps,
    updates: &BTreeMap<usize, StepOutcome>,
) -> TestRunResult<(ExecutionSteps, Derivation)> {
    let len = steps.len();
    if let Some(&index) = updates.keys().find(|&&i| i >= len) {
        return Err(TestRunError::StepOutOfRange { index, len });
    }

    let mut next = steps.clone();
    for (&index, outcome) in updates {
        next.replace(index, outcome.clone())?;
    }
    let derivation = derive(&next);
    Ok((next, derivation))
}

/// The issue proposal implied by a new overall result.
///
/// A failure proposes raising a new issue against `test_cycle_id`; any
/// other result clears issue handling, including a linked issue.
pub fn on_result_changed(new_result: OverallResult, test_cycle_id: Option<&TestCycleId>) -> IssueProposal {
    if new_result.is_failed() {
        IssueProposal::CreateNew {
            handle_issue: true,
            test_cycle_id: test_cycle_id.cloned(),
        }
    } else {
        IssueProposal::None
    }
}

/// Build the payload sent to the persistence API.
///
/// Unexecuted steps are dropped. The proposal is flattened so that a
/// linked issue and `is_issue = true` never appear together.
pub fn prepare_submission(
    steps: &ExecutionSteps,
    overall_result: OverallResult,
    issue_proposal: &IssueProposal,
    remarks: &str,
    attachments: &[Attachment],
) -> SubmissionPayload {
    let (is_issue, linked_issue_id, test_cycle_id) = match issue_proposal {
        IssueProposal::None => (false, None, None),
        IssueProposal::LinkExisting { issue_id } => (false, issue_id.clone(), None),
        IssueProposal::CreateNew {
            handle_issue,
            test_cycle_id,
        } => {
            let cycle = if *handle_issue { test_cycle_id.clone() } else { None };
            (*handle_issue, None, cycle)
        }
    };

    SubmissionPayload {
        result: overall_result,
        test_steps: steps.filled(),
        remarks: remarks.to_string(),
        is_issue,
        linked_issue_id,
        test_cycle_id,
        attachments: attachments.to_vec(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
