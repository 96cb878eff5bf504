//! Collaborator traits for execution moderation.
//!
//! These four traits are the seams to everything outside the session:
//!
//! - `ExecutionStore`      — persistence API that stores submitted executions
//! - `IssueDirectory`      — read-only lookup of existing issues
//! - `SessionJournal`      — append-only history of moderation actions
//! - `SubmissionValidator` — form-level checks run before saving
//!
//! The moderator wires them around an `ExecutionSession`. None of them feed
//! back into aggregation.

use testrun_contracts::{
    error::TestRunResult,
    execution::ExecutionId,
    issue::IssueSummary,
    journal::SessionRecord,
    submission::{SaveAck, SubmissionPayload},
    validate::ValidationReport,
};

/// Where submitted executions go.
///
/// Concurrent submissions for the same execution are resolved by the store
/// (last submit wins); the moderator does not coordinate them.
pub trait ExecutionStore: Send + Sync {
    /// Persist `payload` for `execution_id`.
    ///
    /// An `Err` is reported to the tester as a transient failure. The
    /// session that produced the payload is not modified, so the call can
    /// be retried with the same data.
    fn save(&self, execution_id: &ExecutionId, payload: &SubmissionPayload) -> TestRunResult<SaveAck>;
}

/// Read-only access to the defect tracker.
pub trait IssueDirectory: Send + Sync {
    /// Every issue the tester may link an execution to.
    fn list_issues(&self) -> TestRunResult<Vec<IssueSummary>>;

    /// Issues whose title or custom id contains `query`, case-insensitively.
    fn search(&self, query: &str) -> TestRunResult<Vec<IssueSummary>> {
        Ok(self
            .list_issues()?
            .into_iter()
            .filter(|issue| issue.matches(query))
            .collect())
    }
}

/// The session history sink.
///
/// Every moderation action produces exactly one `SessionRecord`. A failed
/// write fails the action with `TestRunError::JournalWriteFailed`.
pub trait SessionJournal: Send + Sync {
    /// Append one record. Records written here are never modified.
    fn write(&self, execution_id: &ExecutionId, record: &SessionRecord) -> TestRunResult<()>;

    /// Called once a submission has been saved.
    fn finalize(&self, execution_id: &ExecutionId) -> TestRunResult<()>;
}

/// The check a payload must pass before it is handed to the store.
pub trait SubmissionValidator: Send + Sync {
    /// Return a report with `passed = false` and populated `failures` when
    /// the payload is not submittable. `Err` is reserved for validators that
    /// could not run at all.
    fn validate(&self, payload: &SubmissionPayload) -> TestRunResult<ValidationReport>;
}
