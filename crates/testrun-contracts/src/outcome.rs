//! Step outcomes and overall execution results.
//!
//! Both enums travel as plain strings so they line up with what the
//! persistence API stores: the empty string means "not yet executed" /
//! "no result chosen".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TestRunError, TestRunResult};

/// The recorded outcome of one test step.
///
/// Only `Passed` and `Failed` are consulted by aggregation. Any other
/// non-empty string is kept verbatim as `Other`: it counts as filled but is
/// neither a pass nor a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepOutcome {
    #[default]
    Unset,
    Passed,
    Failed,
    Other(String),
}

impl StepOutcome {
    /// True once a tester has recorded anything for the step.
    pub fn is_filled(&self) -> bool {
        !matches!(self, StepOutcome::Unset)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepOutcome::Unset => "",
            StepOutcome::Passed => "Passed",
            StepOutcome::Failed => "Failed",
            StepOutcome::Other(s) => s,
        }
    }
}

impl From<String> for StepOutcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => StepOutcome::Unset,
            "Passed" => StepOutcome::Passed,
            "Failed" => StepOutcome::Failed,
            _ => StepOutcome::Other(value),
        }
    }
}

impl From<&str> for StepOutcome {
    fn from(value: &str) -> Self {
        StepOutcome::from(value.to_string())
    }
}

impl From<StepOutcome> for String {
    fn from(value: StepOutcome) -> Self {
        match value {
            StepOutcome::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Unset => f.write_str("Unset"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// The execution-level verdict.
///
/// Either derived from step outcomes or chosen by a person. `Caution` and
/// `Blocked` are never derived; they can only be chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OverallResult {
    #[default]
    Unset,
    Passed,
    Failed,
    Caution,
    Blocked,
}

impl OverallResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallResult::Unset => "",
            OverallResult::Passed => "Passed",
            OverallResult::Failed => "Failed",
            OverallResult::Caution => "Caution",
            OverallResult::Blocked => "Blocked",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, OverallResult::Failed)
    }
}

impl TryFrom<String> for OverallResult {
    type Error = TestRunError;

    fn try_from(value: String) -> TestRunResult<Self> {
        match value.as_str() {
            "" => Ok(OverallResult::Unset),
            "Passed" => Ok(OverallResult::Passed),
            "Failed" => Ok(OverallResult::Failed),
            "Caution" => Ok(OverallResult::Caution),
            "Blocked" => Ok(OverallResult::Blocked),
            _ => Err(TestRunError::UnknownResult { value }),
        }
    }
}

impl From<OverallResult> for String {
    fn from(value: OverallResult) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OverallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallResult::Unset => f.write_str("Unset"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// The persisted shape of one executed step: its position and outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub index: usize,
    pub status: StepOutcome,
}

/// The ordered step outcomes of one execution.
///
/// The length is fixed when the sequence is created and no method changes
/// it. Individual positions may be rewritten any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionSteps {
    outcomes: Vec<StepOutcome>,
}

impl ExecutionSteps {
    /// A sequence of `len` steps, none executed yet.
    pub fn new(len: usize) -> Self {
        Self {
            outcomes: vec![StepOutcome::Unset; len],
        }
    }

    /// Wrap an existing list of outcomes, e.g. when re-opening a saved run.
    pub fn from_outcomes(outcomes: Vec<StepOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepOutcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter()
    }

    /// Overwrite the outcome at `index`, returning the previous one.
    ///
    /// Returns `TestRunError::StepOutOfRange` when `index >= len`.
    pub fn replace(&mut self, index: usize, outcome: StepOutcome) -> TestRunResult<StepOutcome> {
        let len = self.outcomes.len();
        let slot = self
            .outcomes
            .get_mut(index)
            .ok_or(TestRunError::StepOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, outcome))
    }

    /// Every position that has an outcome, in index order.
    pub fn filled(&self) -> Vec<StepStatus> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.is_filled())
            .map(|(index, outcome)| StepStatus {
                index,
                status: outcome.clone(),
            })
            .collect()
    }
}
