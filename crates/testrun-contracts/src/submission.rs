//! The payload handed to the persistence API and its acknowledgement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    execution::{IssueId, TestCycleId},
    outcome::{OverallResult, StepStatus},
};

/// A reference to a file already uploaded to external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    /// Opaque storage reference (URL or object key).
    pub reference: String,
}

/// What gets persisted when an execution is submitted.
///
/// `test_steps` holds only executed steps. At most one of `is_issue` and
/// `linked_issue_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub result: OverallResult,
    pub test_steps: Vec<StepStatus>,
    pub remarks: String,
    pub is_issue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_issue_id: Option<IssueId>,
    /// Cycle a newly raised issue is associated with. Only set with `is_issue`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cycle_id: Option<TestCycleId>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Acknowledgement returned by the persistence API on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAck {
    /// Human-readable message to show the tester.
    pub message: String,
    pub saved_at: DateTime<Utc>,
}
