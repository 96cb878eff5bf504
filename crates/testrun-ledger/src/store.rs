//! In-memory execution store and issue directory.
//!
//! Reference implementations of the persistence and issue-lookup
//! collaborators, used by the demo and by tests that need a real store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    execution::ExecutionId,
    issue::IssueSummary,
    submission::{SaveAck, SubmissionPayload},
};
use testrun_core::traits::{ExecutionStore, IssueDirectory};

#[derive(Default)]
struct StoreState {
    /// Every accepted payload per execution, oldest first.
    saved: HashMap<ExecutionId, Vec<SubmissionPayload>>,
    /// Number of upcoming saves to reject.
    pending_failures: usize,
}

/// Keeps submitted payloads in memory. The latest submit for an execution
/// wins; earlier ones are retained as revisions.
#[derive(Clone, Default)]
pub struct InMemoryExecutionStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` saves with `SubmissionFailed`.
    pub fn fail_next(&self, count: usize) -> TestRunResult<()> {
        self.lock()?.pending_failures = count;
        Ok(())
    }

    /// The payload currently stored for `execution_id`.
    pub fn latest(&self, execution_id: &ExecutionId) -> TestRunResult<Option<SubmissionPayload>> {
        Ok(self
            .lock()?
            .saved
            .get(execution_id)
            .and_then(|revisions| revisions.last().cloned()))
    }

    /// How many times `execution_id` has been saved.
    pub fn revision_count(&self, execution_id: &ExecutionId) -> TestRunResult<usize> {
        Ok(self.lock()?.saved.get(execution_id).map_or(0, Vec::len))
    }

    fn lock(&self) -> TestRunResult<std::sync::MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| TestRunError::SubmissionFailed {
            reason: format!("store state lock poisoned: {}", e),
        })
    }
}

impl ExecutionStore for InMemoryExecutionStore {
    fn save(&self, execution_id: &ExecutionId, payload: &SubmissionPayload) -> TestRunResult<SaveAck> {
        let mut state = self.lock()?;

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            warn!(execution_id = %execution_id, "simulated store failure");
            return Err(TestRunError::SubmissionFailed {
                reason: "execution store unavailable".to_string(),
            });
        }

        let revisions = state.saved.entry(execution_id.clone()).or_default();
        revisions.push(payload.clone());
        let revision = revisions.len();

        debug!(execution_id = %execution_id, revision, "execution stored");

        Ok(SaveAck {
            message: if revision == 1 {
                "Test execution saved".to_string()
            } else {
                format!("Test execution updated (revision {revision})")
            },
            saved_at: Utc::now(),
        })
    }
}

/// A fixed list of issues.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueDirectory {
    issues: Vec<IssueSummary>,
}

impl InMemoryIssueDirectory {
    pub fn new(issues: Vec<IssueSummary>) -> Self {
        Self { issues }
    }
}

impl IssueDirectory for InMemoryIssueDirectory {
    fn list_issues(&self) -> TestRunResult<Vec<IssueSummary>> {
        Ok(self.issues.clone())
    }
}
