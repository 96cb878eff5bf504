//! Session journal records.
//!
//! Every moderation action taken on a session produces one `SessionRecord`.
//! Journal writers append these; records are never modified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    execution::IssueId,
    outcome::{OverallResult, StepOutcome, StepStatus},
};

/// What happened to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Started { step_count: usize },
    StepRecorded { index: usize, outcome: StepOutcome },
    StepsRecorded { updates: Vec<StepStatus> },
    ManualOverride,
    ResultChanged { from: OverallResult, to: OverallResult },
    IssueLinked { issue_id: IssueId },
    SubmissionRejected { reason: String },
    SubmissionFailed { reason: String },
    Submitted,
}

/// One immutable journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub action: SessionAction,
    /// Overall result after the action.
    pub result: OverallResult,
    /// Manual override flag after the action.
    pub manual_override: bool,
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(action: SessionAction, result: OverallResult, manual_override: bool) -> Self {
        Self {
            action,
            result,
            manual_override,
            timestamp: Utc::now(),
        }
    }
}
