//! Schema-based submission validator.
//!
//! `SchemaValidator` implements the `SubmissionValidator` trait from
//! `testrun-core`. Validation runs in two phases over the payload as it
//! would be sent on the wire (camelCase JSON):
//!
//! 1. **Structural** — the payload is validated against
//!    `SubmissionSchema::json_schema` using the `jsonschema` crate.
//! 2. **Semantic** — each `ValidationRule` whose `when_result` covers the
//!    payload's result is evaluated in order. All failures are collected so
//!    the tester sees every problem at once.

use serde_json::Value;
use tracing::{debug, warn};

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    submission::SubmissionPayload,
    validate::{SubmissionSchema, ValidationFailure, ValidationReport, ValidationRuleType},
};
use testrun_core::traits::SubmissionValidator;

/// Validates submissions against one `SubmissionSchema`.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: SubmissionSchema,
}

impl SchemaValidator {
    pub fn new(schema: SubmissionSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SubmissionSchema {
        &self.schema
    }

    /// Resolve a dotted path (e.g. `"testSteps"`) against a JSON value.
    /// Missing segments and JSON `null` both resolve to `None`.
    fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
        let mut current = value;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(v) if !v.is_null() => current = v,
                _ => return None,
            }
        }
        Some(current)
    }

    fn check(payload: &Value, rule_type: &ValidationRuleType) -> Option<String> {
        match rule_type {
            ValidationRuleType::RequiredField { field_path } => match Self::resolve_path(payload, field_path) {
                None => Some(format!("required field '{field_path}' is missing")),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    Some(format!("required field '{field_path}' is empty"))
                }
                Some(_) => None,
            },

            ValidationRuleType::AllowedValues { field_path, allowed } => {
                match Self::resolve_path(payload, field_path) {
                    None => Some(format!(
                        "field '{field_path}' is missing; cannot check allowed values"
                    )),
                    Some(actual) if allowed.contains(actual) => None,
                    Some(actual) => Some(format!(
                        "field '{field_path}' has value {actual} which is not in the allowed set"
                    )),
                }
            }

            // Only string values are checked; anything else passes.
            ValidationRuleType::ForbiddenPattern { field_path, pattern } => {
                match Self::resolve_path(payload, field_path).and_then(Value::as_str) {
                    Some(s) if s.contains(pattern.as_str()) => Some(format!(
                        "field '{field_path}' contains forbidden pattern '{pattern}'"
                    )),
                    _ => None,
                }
            }

            ValidationRuleType::MinItems { field_path, min } => {
                let count = Self::resolve_path(payload, field_path)
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                if count < *min {
                    Some(format!(
                        "field '{field_path}' has {count} item(s), at least {min} required"
                    ))
                } else {
                    None
                }
            }
        }
    }
}

impl SubmissionValidator for SchemaValidator {
    fn validate(&self, payload: &SubmissionPayload) -> TestRunResult<ValidationReport> {
        let schema = &self.schema;
        let value = serde_json::to_value(payload).map_err(|e| TestRunError::SchemaValidation {
            reason: format!("payload could not be serialized: {e}"),
        })?;
        let mut failures: Vec<ValidationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        if !schema.json_schema.is_null() {
            match jsonschema::validator_for(&schema.json_schema) {
                Ok(validator) => {
                    for error in validator.iter_errors(&value) {
                        let message = format!(
                            "JSON Schema violation at {}: {}",
                            error.instance_path, error
                        );
                        warn!(schema_id = %schema.schema_id, %message, "structural validation failure");
                        failures.push(ValidationFailure {
                            rule_id: "json-schema".to_string(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    // A broken schema document is reported as a failure so the
                    // submission is held back rather than saved unchecked.
                    let message = format!("invalid JSON Schema document: {e}");
                    warn!(schema_id = %schema.schema_id, %message, "schema compilation failure");
                    failures.push(ValidationFailure {
                        rule_id: "json-schema".to_string(),
                        message,
                    });
                }
            }
        }

        // ── Phase 2: Semantic rule evaluation ────────────────────────────────
        for rule in schema.rules.iter().filter(|r| r.applies_to(payload.result)) {
            debug!(
                rule_id = %rule.rule_id,
                description = %rule.description,
                "evaluating submission rule"
            );

            if let Some(message) = Self::check(&value, &rule.rule_type) {
                warn!(rule_id = %rule.rule_id, %message, "submission rule failed");
                failures.push(ValidationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "submission validation complete"
        );

        Ok(ValidationReport { passed, failures })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use testrun_contracts::{
        execution::IssueId,
        outcome::{OverallResult, StepOutcome, StepStatus},
        submission::SubmissionPayload,
        validate::{SubmissionSchema, ValidationRule, ValidationRuleType},
    };
    use testrun_core::traits::SubmissionValidator;

    use super::SchemaValidator;

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn payload(result: OverallResult, remarks: &str) -> SubmissionPayload {
        SubmissionPayload {
            result,
            test_steps: vec![StepStatus { index: 0, status: StepOutcome::Passed }],
            remarks: remarks.to_string(),
            is_issue: false,
            linked_issue_id: None,
            test_cycle_id: None,
            attachments: vec![],
        }
    }

    fn schema(json_schema: serde_json::Value, rules: Vec<ValidationRule>) -> SubmissionSchema {
        SubmissionSchema {
            schema_id: "test-submission-v1".to_string(),
            json_schema,
            rules,
        }
    }

    fn rule(id: &str, when: &[OverallResult], rule_type: ValidationRuleType) -> ValidationRule {
        ValidationRule {
            rule_id: id.to_string(),
            description: format!("{id} rule"),
            when_result: when.to_vec(),
            rule_type,
        }
    }

    fn remarks_required() -> ValidationRule {
        rule(
            "remarks-on-failure",
            &[OverallResult::Failed],
            ValidationRuleType::RequiredField {
                field_path: "remarks".to_string(),
            },
        )
    }

    // ── JSON Schema ───────────────────────────────────────────────────────────

    #[test]
    fn test_schema_pass() {
        let validator = SchemaValidator::new(schema(
            json!({ "type": "object", "required": ["result", "testSteps", "isIssue"] }),
            vec![],
        ));

        let report = validator.validate(&payload(OverallResult::Passed, "")).unwrap();
        assert!(report.passed, "failures: {:?}", report.failures);
    }

    #[test]
    fn test_schema_fail_reports_json_schema_rule() {
        // linkedIssueId is omitted from the wire when absent.
        let validator = SchemaValidator::new(schema(
            json!({ "type": "object", "required": ["linkedIssueId"] }),
            vec![],
        ));

        let report = validator.validate(&payload(OverallResult::Failed, "x")).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "json-schema");
    }

    #[test]
    fn test_invalid_schema_document_is_a_failure() {
        let validator = SchemaValidator::new(schema(json!({ "type": "not-a-type" }), vec![]));
        let report = validator.validate(&payload(OverallResult::Passed, "")).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("invalid JSON Schema"));
    }

    // ── when_result gating ────────────────────────────────────────────────────

    #[test]
    fn test_remarks_required_only_for_failed() {
        let validator = SchemaValidator::new(schema(serde_json::Value::Null, vec![remarks_required()]));

        let failed = validator.validate(&payload(OverallResult::Failed, "  ")).unwrap();
        assert!(!failed.passed);
        assert_eq!(failed.failures[0].rule_id, "remarks-on-failure");
        assert!(failed.failures[0].message.contains("remarks"));

        let passed = validator.validate(&payload(OverallResult::Passed, "")).unwrap();
        assert!(passed.passed);

        let explained = validator.validate(&payload(OverallResult::Failed, "timeout")).unwrap();
        assert!(explained.passed);
    }

    #[test]
    fn test_unset_result_fails_required_result() {
        let validator = SchemaValidator::new(schema(
            serde_json::Value::Null,
            vec![rule(
                "result-selected",
                &[],
                ValidationRuleType::RequiredField {
                    field_path: "result".to_string(),
                },
            )],
        ));

        let report = validator.validate(&payload(OverallResult::Unset, "")).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("empty"));
    }

    // ── Other rule types ──────────────────────────────────────────────────────

    #[test]
    fn test_allowed_values() {
        let validator = SchemaValidator::new(schema(
            serde_json::Value::Null,
            vec![rule(
                "result-kind",
                &[],
                ValidationRuleType::AllowedValues {
                    field_path: "result".to_string(),
                    allowed: vec![json!("Passed"), json!("Failed")],
                },
            )],
        ));

        assert!(validator.validate(&payload(OverallResult::Failed, "x")).unwrap().passed);
        let report = validator.validate(&payload(OverallResult::Blocked, "")).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("Blocked"));
    }

    #[test]
    fn test_forbidden_pattern() {
        let validator = SchemaValidator::new(schema(
            serde_json::Value::Null,
            vec![rule(
                "no-placeholder",
                &[],
                ValidationRuleType::ForbiddenPattern {
                    field_path: "remarks".to_string(),
                    pattern: "TODO".to_string(),
                },
            )],
        ));

        assert!(validator.validate(&payload(OverallResult::Passed, "fine")).unwrap().passed);
        assert!(!validator.validate(&payload(OverallResult::Passed, "TODO fill in")).unwrap().passed);
    }

    #[test]
    fn test_min_items_on_test_steps() {
        let validator = SchemaValidator::new(schema(
            serde_json::Value::Null,
            vec![rule(
                "some-steps",
                &[],
                ValidationRuleType::MinItems {
                    field_path: "testSteps".to_string(),
                    min: 2,
                },
            )],
        ));

        let report = validator.validate(&payload(OverallResult::Passed, "")).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("1 item(s)"));
    }

    #[test]
    fn test_all_failures_collected() {
        let validator = SchemaValidator::new(schema(
            json!({ "type": "object", "required": ["linkedIssueId"] }),
            vec![remarks_required()],
        ));

        let mut p = payload(OverallResult::Failed, "");
        p.linked_issue_id = None;
        let report = validator.validate(&p).unwrap();
        assert_eq!(report.failures.len(), 2);

        p.linked_issue_id = Some(IssueId::new("abc123"));
        p.remarks = "see linked issue".to_string();
        assert!(validator.validate(&p).unwrap().passed);
    }
}
