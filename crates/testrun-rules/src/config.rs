//! TOML submission-rule configuration.
//!
//! A `RuleConfig` is deserialized from TOML and holds an ordered list of
//! `RuleEntry`s. Entries are converted into contract `ValidationRule`s and
//! combined with a JSON Schema into a `SubmissionSchema`.
//!
//! Example:
//! ```toml
//! schema_id = "execution-submission-v1"
//!
//! [[rules]]
//! id = "remarks-on-failure"
//! description = "Remarks are required when the execution failed"
//! check = "required-field"
//! field = "remarks"
//! when_result = ["Failed"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    outcome::OverallResult,
    validate::{SubmissionSchema, ValidationRule, ValidationRuleType},
};

/// The built-in rule set shipped with the crate.
pub const DEFAULT_RULES: &str = include_str!("../rules/submission.toml");

/// Which check a rule performs, spelled kebab-case in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    RequiredField,
    AllowedValues,
    ForbiddenPattern,
    MinItems,
}

/// A single rule as written in TOML.
///
/// `allowed`, `pattern` and `min` are only read by the check that needs them
/// and are mandatory for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub check: CheckKind,
    /// Dotted path into the camelCase payload.
    pub field: String,
    /// Results the rule applies to. Omitted or empty means all.
    #[serde(default)]
    pub when_result: Vec<OverallResult>,
    #[serde(default)]
    pub allowed: Vec<Value>,
    pub pattern: Option<String>,
    pub min: Option<usize>,
}

impl RuleEntry {
    fn into_rule(self) -> TestRunResult<ValidationRule> {
        let field_path = self.field;
        let rule_type = match self.check {
            CheckKind::RequiredField => ValidationRuleType::RequiredField { field_path },
            CheckKind::AllowedValues => {
                if self.allowed.is_empty() {
                    return Err(missing(&self.id, "allowed"));
                }
                ValidationRuleType::AllowedValues {
                    field_path,
                    allowed: self.allowed,
                }
            }
            CheckKind::ForbiddenPattern => ValidationRuleType::ForbiddenPattern {
                field_path,
                pattern: self.pattern.ok_or_else(|| missing(&self.id, "pattern"))?,
            },
            CheckKind::MinItems => ValidationRuleType::MinItems {
                field_path,
                min: self.min.ok_or_else(|| missing(&self.id, "min"))?,
            },
        };

        Ok(ValidationRule {
            rule_id: self.id,
            description: self.description,
            when_result: self.when_result,
            rule_type,
        })
    }
}

fn missing(rule_id: &str, key: &str) -> TestRunError {
    TestRunError::ConfigError {
        reason: format!("rule '{rule_id}' is missing required key '{key}'"),
    }
}

/// The top-level structure deserialized from a TOML rules file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_schema_id")]
    pub schema_id: String,
    /// Ordered list of rules; failures are reported in this order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

fn default_schema_id() -> String {
    "execution-submission-v1".to_string()
}

impl RuleConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `TestRunError::ConfigError` if the TOML is malformed or does
    /// not match the expected shape.
    pub fn from_toml_str(s: &str) -> TestRunResult<Self> {
        toml::from_str(s).map_err(|e| TestRunError::ConfigError {
            reason: format!("failed to parse rules TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as a rules file.
    pub fn from_file(path: &Path) -> TestRunResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TestRunError::ConfigError {
            reason: format!("failed to read rules file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The rules shipped in `rules/submission.toml`.
    pub fn builtin() -> TestRunResult<Self> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    /// Combine the rules with the payload JSON Schema.
    pub fn into_schema(self) -> TestRunResult<SubmissionSchema> {
        let rules = self
            .rules
            .into_iter()
            .map(RuleEntry::into_rule)
            .collect::<TestRunResult<Vec<_>>>()?;
        debug!(schema_id = %self.schema_id, rule_count = rules.len(), "submission rules loaded");
        Ok(SubmissionSchema {
            schema_id: self.schema_id,
            json_schema: payload_json_schema(),
            rules,
        })
    }
}

/// Structural shape every submission must have.
pub fn payload_json_schema() -> Value {
    json!({
        "type": "object",
        "required": ["result", "testSteps", "isIssue"],
        "properties": {
            "result": {
                "type": "string",
                "enum": ["", "Passed", "Failed", "Caution", "Blocked"]
            },
            "testSteps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["index", "status"],
                    "properties": {
                        "index": { "type": "integer", "minimum": 0 },
                        "status": { "type": "string", "minLength": 1 }
                    }
                }
            },
            "remarks": { "type": "string" },
            "isIssue": { "type": "boolean" },
            "linkedIssueId": { "type": "string", "minLength": 1 },
            "testCycleId": { "type": "string" },
            "attachments": { "type": "array" }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
