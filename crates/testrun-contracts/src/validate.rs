//! Submission validation schema and report types.
//!
//! Validation is the form-level check that runs before a payload is sent to
//! the persistence API. Aggregation never validates; it always produces a
//! value and leaves "is this submittable" to these rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::outcome::OverallResult;

/// Everything a submission is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSchema {
    /// Unique identifier for this schema (e.g. "execution-submission-v1").
    pub schema_id: String,
    /// JSON Schema applied to the serialized payload. `Null` skips it.
    pub json_schema: Value,
    /// Rules evaluated after structural validation.
    pub rules: Vec<ValidationRule>,
}

/// A single rule applied to a submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Referenced in failure reports.
    pub rule_id: String,
    pub description: String,
    /// Results this rule applies to. Empty means every result.
    #[serde(default)]
    pub when_result: Vec<OverallResult>,
    pub rule_type: ValidationRuleType,
}

impl ValidationRule {
    /// True if the rule should run for a payload with `result`.
    pub fn applies_to(&self, result: OverallResult) -> bool {
        self.when_result.is_empty() || self.when_result.contains(&result)
    }
}

/// The checks available to submission rules.
///
/// Field paths are dotted paths into the camelCase JSON payload,
/// e.g. `"remarks"` or `"testSteps"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationRuleType {
    /// The field must be present, non-null, and not an empty string.
    RequiredField { field_path: String },

    /// The field must equal one of `allowed`.
    AllowedValues { field_path: String, allowed: Vec<Value> },

    /// The string field must not contain `pattern`.
    ForbiddenPattern { field_path: String, pattern: String },

    /// The array field must hold at least `min` items.
    MinItems { field_path: String, min: usize },
}

/// The outcome of checking one payload against a `SubmissionSchema`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if every applicable rule passed.
    pub passed: bool,
    /// Empty on pass.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// Joins every failure into one line, `[rule] message; ...`.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single rule failure within a `ValidationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub rule_id: String,
    pub message: String,
}
