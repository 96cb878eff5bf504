//! Execution identity and test case definitions.
//!
//! A test case definition is owned by an external collaborator. The
//! moderation session only reads its step list (to fix the step count) and
//! carries its expected-result blob through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a single test case execution.
///
/// Every journal record written while editing an execution carries this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    /// Create a new, unique execution ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a test case in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(pub String);

/// Identifier of the test cycle an execution belongs to.
///
/// New issues raised from a failed execution are associated with this cycle
/// by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCycleId(pub String);

/// Identifier of an issue in the defect tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl IssueId {
    /// Construct an issue id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of a test case as defined by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// What the tester should do.
    pub description: String,
    /// What the tester should observe.
    #[serde(default)]
    pub expected: String,
}

/// The test case an execution session is started from.
///
/// Only `steps.len()` matters to aggregation; it is captured once when the
/// session starts and never re-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseDefinition {
    pub id: TestCaseId,
    pub title: String,
    pub steps: Vec<StepDescriptor>,
    /// Rich-text expected result. Never inspected.
    #[serde(default, rename = "expectedResult")]
    pub expected_result: serde_json::Value,
}

impl TestCaseDefinition {
    /// Number of steps an execution of this case records outcomes for.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
