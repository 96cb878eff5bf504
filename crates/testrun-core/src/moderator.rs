//! The moderator: drives an execution session and its collaborators.
//!
//! The session decides; the moderator records. Every operation follows the
//! same order:
//!
//!   Session change (on a copy) → Journal → Commit
//!
//! so a journal failure leaves the caller's session exactly as it was.
//! Submission adds two gates in front of the store:
//!
//!   Prepare payload → Validate → Save → Journal → Finalize
//!
//! Once the store has accepted a payload the submission counts as saved; a
//! journal failure after that point is logged, not returned. A submitted
//! session stays editable and can be submitted again.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    execution::{IssueId, TestCaseDefinition, TestCycleId},
    issue::IssueSummary,
    journal::{SessionAction, SessionRecord},
    outcome::{OverallResult, StepOutcome, StepStatus},
    submission::SaveAck,
    validate::ValidationReport,
};

use crate::{
    session::{ExecutionSession, ResultChange},
    traits::{ExecutionStore, IssueDirectory, SessionJournal, SubmissionValidator},
};

/// What happened to a submission that did not error.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The store accepted the payload.
    Saved(SaveAck),
    /// Validation failed; nothing was sent to the store.
    Rejected(ValidationReport),
}

/// Wires the collaborators around execution sessions.
///
/// One moderator can serve any number of sessions; it holds no per-session
/// state of its own.
pub struct Moderator {
    store: Box<dyn ExecutionStore>,
    issues: Box<dyn IssueDirectory>,
    journal: Box<dyn SessionJournal>,
    validator: Box<dyn SubmissionValidator>,
}

impl Moderator {
    pub fn new(
        store: Box<dyn ExecutionStore>,
        issues: Box<dyn IssueDirectory>,
        journal: Box<dyn SessionJournal>,
        validator: Box<dyn SubmissionValidator>,
    ) -> Self {
        Self {
            store,
            issues,
            journal,
            validator,
        }
    }

    /// Open a session for `definition` and journal its step count.
    pub fn start(
        &self,
        definition: &TestCaseDefinition,
        test_cycle_id: Option<TestCycleId>,
    ) -> TestRunResult<ExecutionSession> {
        let session = ExecutionSession::start(definition, test_cycle_id);
        info!(
            execution_id = %session.execution_id,
            test_case = %definition.id.0,
            step_count = definition.step_count(),
            "execution session started"
        );
        self.record(
            &session,
            SessionAction::Started {
                step_count: definition.step_count(),
            },
        )?;
        Ok(session)
    }

    /// Record one step outcome. Returns the overall result afterwards.
    pub fn record_step(
        &self,
        session: &mut ExecutionSession,
        index: usize,
        outcome: StepOutcome,
    ) -> TestRunResult<OverallResult> {
        let mut next = session.clone();
        let change = next.record_step(index, outcome.clone()).inspect_err(|e| {
            warn!(execution_id = %session.execution_id, index, error = %e, "step update rejected");
        })?;

        debug!(
            execution_id = %next.execution_id,
            index,
            outcome = %outcome,
            result = %next.result(),
            "step recorded"
        );

        self.record(&next, SessionAction::StepRecorded { index, outcome })?;
        self.record_change(&next, change)?;
        *session = next;
        Ok(session.result())
    }

    /// Record several step outcomes in one pass.
    pub fn record_steps(
        &self,
        session: &mut ExecutionSession,
        updates: &BTreeMap<usize, StepOutcome>,
    ) -> TestRunResult<OverallResult> {
        let mut next = session.clone();
        let change = next.record_steps(updates).inspect_err(|e| {
            warn!(execution_id = %session.execution_id, error = %e, "bulk step update rejected");
        })?;

        debug!(
            execution_id = %next.execution_id,
            count = updates.len(),
            result = %next.result(),
            "steps recorded"
        );

        let updates = updates
            .iter()
            .map(|(&index, status)| StepStatus {
                index,
                status: status.clone(),
            })
            .collect();
        self.record(&next, SessionAction::StepsRecorded { updates })?;
        self.record_change(&next, change)?;
        *session = next;
        Ok(session.result())
    }

    /// The tester opened the result selector. Journaled the first time only.
    pub fn open_result_selector(&self, session: &mut ExecutionSession) -> TestRunResult<()> {
        let mut next = session.clone();
        if next.set_manual_override() {
            info!(
                execution_id = %next.execution_id,
                result = %next.result(),
                "manual override set; result no longer derived"
            );
            self.record(&next, SessionAction::ManualOverride)?;
            *session = next;
        }
        Ok(())
    }

    /// The tester picked `result` in the selector.
    pub fn choose_result(&self, session: &mut ExecutionSession, result: OverallResult) -> TestRunResult<()> {
        let mut next = session.clone();
        let change = next.choose_result(result);
        self.record_change(&next, change)?;
        *session = next;
        Ok(())
    }

    /// Issues matching `query` for the "link existing issue" picker.
    pub fn search_issues(&self, query: &str) -> TestRunResult<Vec<IssueSummary>> {
        self.issues.search(query).map_err(lookup_failed)
    }

    /// Link the execution to an existing issue after confirming it exists.
    ///
    /// Returns false, without journaling, when the session's result is not
    /// `Failed` and the link was ignored.
    pub fn link_existing_issue(&self, session: &mut ExecutionSession, issue_id: IssueId) -> TestRunResult<bool> {
        let known = self
            .issues
            .list_issues()
            .map_err(lookup_failed)?
            .into_iter()
            .any(|issue| issue.id == issue_id);
        if !known {
            warn!(execution_id = %session.execution_id, issue_id = %issue_id, "linked issue not found");
            return Err(TestRunError::IssueNotFound {
                issue_id: issue_id.0,
            });
        }

        let mut next = session.clone();
        if !next.link_existing_issue(issue_id.clone()) {
            debug!(
                execution_id = %session.execution_id,
                result = %session.result(),
                "issue link ignored; result is not Failed"
            );
            return Ok(false);
        }
        self.record(&next, SessionAction::IssueLinked { issue_id })?;
        *session = next;
        Ok(true)
    }

    /// Validate and persist the session.
    ///
    /// # Errors
    ///
    /// `SubmissionFailed` when the store fails; the session is unchanged and
    /// the call may be retried. Validation failures are not errors: they
    /// come back as `SubmissionOutcome::Rejected`. Nothing after a successful
    /// save is an error either.
    pub fn submit(&self, session: &ExecutionSession) -> TestRunResult<SubmissionOutcome> {
        let execution_id = &session.execution_id;
        let payload = session.prepare_submission();

        debug!(
            execution_id = %execution_id,
            result = %payload.result,
            steps = payload.test_steps.len(),
            is_issue = payload.is_issue,
            "submitting execution"
        );

        let report = self.validator.validate(&payload)?;
        if !report.passed {
            let reason = report.summary();
            warn!(execution_id = %execution_id, failures = %reason, "submission rejected by validation");
            self.record(session, SessionAction::SubmissionRejected { reason })?;
            return Ok(SubmissionOutcome::Rejected(report));
        }

        let ack = match self.store.save(execution_id, &payload) {
            Ok(ack) => ack,
            Err(e) => {
                let reason = e.to_string();
                warn!(execution_id = %execution_id, error = %reason, "execution store rejected submission");
                self.record(session, SessionAction::SubmissionFailed { reason: reason.clone() })?;
                return Err(TestRunError::SubmissionFailed { reason });
            }
        };

        if let Err(e) = self
            .record(session, SessionAction::Submitted)
            .and_then(|()| self.journal.finalize(execution_id))
        {
            warn!(
                execution_id = %execution_id,
                error = %e,
                "execution saved but the journal was not updated"
            );
        }

        info!(
            execution_id = %execution_id,
            result = %payload.result,
            message = %ack.message,
            "execution submitted"
        );
        Ok(SubmissionOutcome::Saved(ack))
    }

    fn record_change(&self, session: &ExecutionSession, change: ResultChange) -> TestRunResult<()> {
        if !change.changed() {
            return Ok(());
        }
        info!(
            execution_id = %session.execution_id,
            from = %change.from,
            to = %change.to,
            "overall result changed"
        );
        self.record(
            session,
            SessionAction::ResultChanged {
                from: change.from,
                to: change.to,
            },
        )
    }

    fn record(&self, session: &ExecutionSession, action: SessionAction) -> TestRunResult<()> {
        let record = SessionRecord::new(action, session.result(), session.manual_override());
        self.journal.write(&session.execution_id, &record)
    }
}

/// Directory failures surface as `IssueLookupFailed`, whatever the
/// directory reported.
fn lookup_failed(e: TestRunError) -> TestRunError {
    match e {
        TestRunError::IssueLookupFailed { .. } => e,
        other => TestRunError::IssueLookupFailed {
            reason: other.to_string(),
        },
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
