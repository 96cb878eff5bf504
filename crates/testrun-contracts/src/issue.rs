//! Issue proposal and issue lookup types.
//!
//! A failed execution may raise a new issue or be linked to an existing
//! one. `IssueProposal` makes those choices mutually exclusive in the type
//! instead of relying on optional fields that must not both be set.

use serde::{Deserialize, Serialize};

use crate::execution::{IssueId, TestCycleId};

/// How the execution should be tied to the defect tracker on submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum IssueProposal {
    /// No issue handling.
    #[default]
    None,

    /// Raise a new issue from this execution.
    CreateNew {
        /// State of the "handle issue" checkbox. The tester may uncheck it
        /// even after a failed result.
        handle_issue: bool,
        /// Cycle the new issue is associated with by default.
        test_cycle_id: Option<TestCycleId>,
    },

    /// Attach this execution to an issue that already exists.
    LinkExisting {
        /// The selected issue; `None` until the tester picks one.
        issue_id: Option<IssueId>,
    },
}

/// Severity of an existing issue, as reported by the issue directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One row of the "link to existing issue" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: IssueId,
    pub title: String,
    pub severity: Severity,
    /// Human-facing key such as "ISS-42".
    pub custom_id: String,
}

impl IssueSummary {
    /// Case-insensitive match on title or custom id. An empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.custom_id.to_lowercase().contains(&query)
    }
}
