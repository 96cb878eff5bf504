//! Per-execution editing session state.
//!
//! `ExecutionSession` is the single owner of everything a tester changes
//! while recording an execution. Its methods delegate the decisions to
//! [`crate::aggregate`] and only store the results, so the same rule applies
//! whether a step is recorded on its own or as part of a batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use testrun_contracts::{
    error::TestRunResult,
    execution::{ExecutionId, IssueId, TestCaseDefinition, TestCaseId, TestCycleId},
    issue::IssueProposal,
    outcome::{ExecutionSteps, OverallResult, StepOutcome},
    submission::{Attachment, SubmissionPayload},
};

use crate::aggregate;

/// What a single session operation did to the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultChange {
    pub from: OverallResult,
    pub to: OverallResult,
}

impl ResultChange {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// The state of one execution being edited.
///
/// Sessions are never shared: each tab or tester editing an execution holds
/// its own. Nothing here is persisted until the session is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSession {
    pub execution_id: ExecutionId,
    pub test_case_id: TestCaseId,
    pub test_cycle_id: Option<TestCycleId>,
    steps: ExecutionSteps,
    result: OverallResult,
    manual_override: bool,
    issue: IssueProposal,
    remarks: String,
    attachments: Vec<Attachment>,
}

impl ExecutionSession {
    /// Open a session for a new execution of `definition`.
    ///
    /// The step count is captured here and cannot change afterwards.
    pub fn start(definition: &TestCaseDefinition, test_cycle_id: Option<TestCycleId>) -> Self {
        Self {
            execution_id: ExecutionId::new(),
            test_case_id: definition.id.clone(),
            test_cycle_id,
            steps: ExecutionSteps::new(definition.step_count()),
            result: OverallResult::Unset,
            manual_override: false,
            issue: IssueProposal::None,
            remarks: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn steps(&self) -> &ExecutionSteps {
        &self.steps
    }

    pub fn result(&self) -> OverallResult {
        self.result
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    pub fn issue(&self) -> &IssueProposal {
        &self.issue
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Record the outcome of one step and re-derive the result.
    ///
    /// On `StepOutOfRange` the session is left exactly as it was.
    pub fn record_step(&mut self, index: usize, outcome: StepOutcome) -> TestRunResult<ResultChange> {
        let (steps, derivation) = aggregate::apply_step_outcome(&self.steps, index, outcome)?;
        self.steps = steps;
        Ok(self.settle(derivation))
    }

    /// Record several step outcomes at once and re-derive a single time.
    pub fn record_steps(&mut self, updates: &BTreeMap<usize, StepOutcome>) -> TestRunResult<ResultChange> {
        let (steps, derivation) = aggregate::apply_bulk_step_outcomes(&self.steps, updates)?;
        self.steps = steps;
        Ok(self.settle(derivation))
    }

    /// The tester opened the result selector. From now on the result is
    /// theirs; aggregation no longer writes it.
    ///
    /// Returns true the first time only.
    pub fn set_manual_override(&mut self) -> bool {
        let first = !self.manual_override;
        self.manual_override = true;
        first
    }

    /// The tester picked a result from the selector.
    ///
    /// Picking does not by itself set the override; opening the selector
    /// does.
    pub fn choose_result(&mut self, result: OverallResult) -> ResultChange {
        self.set_result(result)
    }

    /// Switch to linking an existing issue instead of raising a new one.
    ///
    /// Ignored unless the result is `Failed`; returns whether the link took.
    pub fn link_existing_issue(&mut self, issue_id: IssueId) -> bool {
        if !self.result.is_failed() {
            return false;
        }
        self.issue = IssueProposal::LinkExisting {
            issue_id: Some(issue_id),
        };
        true
    }

    /// Go back to raising a new issue with the checkbox in `handle_issue`.
    ///
    /// Ignored unless the result is `Failed`.
    pub fn set_handle_issue(&mut self, handle_issue: bool) -> bool {
        if !self.result.is_failed() {
            return false;
        }
        self.issue = IssueProposal::CreateNew {
            handle_issue,
            test_cycle_id: self.test_cycle_id.clone(),
        };
        true
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = remarks.into();
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Snapshot the session as a persistence payload. Does not consume or
    /// alter the session, so a failed save can simply be retried.
    pub fn prepare_submission(&self) -> SubmissionPayload {
        aggregate::prepare_submission(
            &self.steps,
            self.result,
            &self.issue,
            &self.remarks,
            &self.attachments,
        )
    }

    fn settle(&mut self, derivation: aggregate::Derivation) -> ResultChange {
        let next = aggregate::resolve(self.result, derivation, self.manual_override);
        self.set_result(next)
    }

    fn set_result(&mut self, result: OverallResult) -> ResultChange {
        let change = ResultChange {
            from: self.result,
            to: result,
        };
        if change.changed() {
            self.result = result;
            self.issue = aggregate::on_result_changed(result, self.test_cycle_id.as_ref());
        }
        change
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use testrun_contracts::{
        execution::{IssueId, StepDescriptor, TestCaseDefinition, TestCaseId, TestCycleId},
        issue::IssueProposal,
        outcome::{OverallResult, StepOutcome, StepStatus},
        submission::Attachment,
    };

    use super::ExecutionSession;

    fn definition(step_count: usize) -> TestCaseDefinition {
        TestCaseDefinition {
            id: TestCaseId("tc-login".to_string()),
            title: "Login with valid credentials".to_string(),
            steps: (0..step_count)
                .map(|i| StepDescriptor {
                    description: format!("step {i}"),
                    expected: "ok".to_string(),
                })
                .collect(),
            expected_result: serde_json::Value::Null,
        }
    }

    fn session(step_count: usize) -> ExecutionSession {
        ExecutionSession::start(&definition(step_count), Some(TestCycleId("cycle-9".to_string())))
    }

    // Scenario 1
    #[test]
    fn first_pass_leaves_result_unset() {
        let mut s = session(3);
        let change = s.record_step(0, StepOutcome::Passed).unwrap();

        assert!(!change.changed());
        assert_eq!(s.result(), OverallResult::Unset);
        assert_eq!(s.steps().get(0), Some(&StepOutcome::Passed));
    }

    // Scenario 2
    #[test]
    fn all_passed_derives_passed_on_last_step() {
        let mut s = session(3);
        s.record_step(0, StepOutcome::Passed).unwrap();
        s.record_step(1, StepOutcome::Passed).unwrap();
        assert_eq!(s.result(), OverallResult::Unset);

        let change = s.record_step(2, StepOutcome::Passed).unwrap();
        assert!(change.changed());
        assert_eq!(s.result(), OverallResult::Passed);
        assert_eq!(s.issue(), &IssueProposal::None);
    }

    // Scenario 3
    #[test]
    fn failing_last_step_derives_failed_and_proposes_issue() {
        let mut s = session(3);
        s.record_step(0, StepOutcome::Passed).unwrap();
        s.record_step(1, StepOutcome::Passed).unwrap();
        s.record_step(2, StepOutcome::Failed).unwrap();

        assert_eq!(s.result(), OverallResult::Failed);
        assert_eq!(
            s.issue(),
            &IssueProposal::CreateNew {
                handle_issue: true,
                test_cycle_id: Some(TestCycleId("cycle-9".to_string())),
            }
        );
    }

    // Scenario 4
    #[test]
    fn override_freezes_result_against_corrections() {
        let mut s = session(3);
        s.record_step(0, StepOutcome::Passed).unwrap();
        s.record_step(1, StepOutcome::Passed).unwrap();
        s.record_step(2, StepOutcome::Failed).unwrap();

        assert!(s.set_manual_override());
        let change = s.record_step(2, StepOutcome::Passed).unwrap();

        assert!(!change.changed());
        assert_eq!(s.result(), OverallResult::Failed);
        assert!(s.manual_override());
    }

    #[test]
    fn override_is_monotonic() {
        let mut s = session(1);
        assert!(s.set_manual_override());
        assert!(!s.set_manual_override());
        assert!(s.manual_override());
    }

    #[test]
    fn override_blocks_first_derivation_too() {
        let mut s = session(2);
        s.set_manual_override();
        let updates: BTreeMap<usize, StepOutcome> =
            [(0, StepOutcome::Failed), (1, StepOutcome::Failed)].into_iter().collect();
        s.record_steps(&updates).unwrap();
        assert_eq!(s.result(), OverallResult::Unset);
    }

    // Scenario 5
    #[test]
    fn bulk_update_reaches_the_same_state_as_single_updates() {
        let mut bulk = session(3);
        let updates: BTreeMap<usize, StepOutcome> = [
            (0, StepOutcome::Passed),
            (1, StepOutcome::Passed),
            (2, StepOutcome::Passed),
        ]
        .into_iter()
        .collect();
        bulk.record_steps(&updates).unwrap();

        let mut single = session(3);
        for i in 0..3 {
            single.record_step(i, StepOutcome::Passed).unwrap();
        }

        assert_eq!(bulk.steps(), single.steps());
        assert_eq!(bulk.result(), OverallResult::Passed);
        assert_eq!(bulk.result(), single.result());
    }

    #[test]
    fn out_of_range_step_leaves_session_untouched() {
        let mut s = session(2);
        s.record_step(0, StepOutcome::Failed).unwrap();
        assert!(s.record_step(2, StepOutcome::Passed).is_err());
        assert_eq!(s.steps().len(), 2);
        assert_eq!(s.steps().get(0), Some(&StepOutcome::Failed));
    }

    #[test]
    fn choosing_a_non_failed_result_clears_linked_issue() {
        let mut s = session(1);
        s.record_step(0, StepOutcome::Failed).unwrap();
        s.link_existing_issue(IssueId::new("abc123"));

        s.set_manual_override();
        s.choose_result(OverallResult::Caution);

        assert_eq!(s.result(), OverallResult::Caution);
        assert_eq!(s.issue(), &IssueProposal::None);
    }

    #[test]
    fn rechoosing_the_same_result_keeps_the_link() {
        let mut s = session(1);
        s.record_step(0, StepOutcome::Failed).unwrap();
        s.link_existing_issue(IssueId::new("abc123"));

        let change = s.choose_result(OverallResult::Failed);
        assert!(!change.changed());
        assert_eq!(
            s.issue(),
            &IssueProposal::LinkExisting {
                issue_id: Some(IssueId::new("abc123"))
            }
        );
    }

    // Scenario 6
    #[test]
    fn submission_reflects_linked_issue_and_filled_steps() {
        let mut s = session(3);
        s.record_step(0, StepOutcome::Passed).unwrap();
        s.record_step(2, StepOutcome::Failed).unwrap();
        s.set_manual_override();
        s.choose_result(OverallResult::Failed);
        s.link_existing_issue(IssueId::new("abc123"));
        s.set_remarks("password field rejects paste");

        let payload = s.prepare_submission();

        assert_eq!(payload.result, OverallResult::Failed);
        assert_eq!(
            payload.test_steps,
            vec![
                StepStatus { index: 0, status: StepOutcome::Passed },
                StepStatus { index: 2, status: StepOutcome::Failed },
            ]
        );
        assert!(!payload.is_issue);
        assert_eq!(payload.linked_issue_id, Some(IssueId::new("abc123")));
        assert_eq!(payload.remarks, "password field rejects paste");
    }

    #[test]
    fn unchecking_handle_issue_submits_without_issue() {
        let mut s = session(1);
        s.record_step(0, StepOutcome::Failed).unwrap();
        s.set_handle_issue(false);

        let payload = s.prepare_submission();
        assert!(!payload.is_issue);
        assert!(payload.linked_issue_id.is_none());
    }

    #[test]
    fn issue_handling_is_ignored_unless_failed() {
        let mut s = session(1);
        s.record_step(0, StepOutcome::Passed).unwrap();

        assert!(!s.link_existing_issue(IssueId::new("abc123")));
        assert!(!s.set_handle_issue(true));
        assert_eq!(s.issue(), &IssueProposal::None);

        let payload = s.prepare_submission();
        assert_eq!(payload.result, OverallResult::Passed);
        assert!(!payload.is_issue);
        assert!(payload.linked_issue_id.is_none());
        assert!(payload.test_cycle_id.is_none());

        s.set_manual_override();
        s.choose_result(OverallResult::Failed);
        assert!(s.link_existing_issue(IssueId::new("abc123")));
        assert!(s.set_handle_issue(true));
        assert!(s.prepare_submission().is_issue);
    }

    #[test]
    fn remarks_and_attachments_pass_through_to_payload() {
        let mut s = session(2);
        s.record_step(0, StepOutcome::Passed).unwrap();
        s.set_remarks("checked on staging");
        s.attach(Attachment {
            name: "login.png".to_string(),
            reference: "files/7f3c/login.png".to_string(),
        });
        s.attach(Attachment {
            name: "console.log".to_string(),
            reference: "files/7f3c/console.log".to_string(),
        });

        assert_eq!(s.remarks(), "checked on staging");
        assert_eq!(s.attachments().len(), 2);

        let payload = s.prepare_submission();
        assert_eq!(payload.remarks, "checked on staging");
        assert_eq!(payload.attachments, s.attachments());
        assert_eq!(payload.attachments[0].name, "login.png");
        assert_eq!(payload.attachments[1].reference, "files/7f3c/console.log");
    }
}
