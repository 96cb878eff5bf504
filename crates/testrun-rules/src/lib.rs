//! # testrun-rules
//!
//! Submission validation for execution moderation.
//!
//! ## Overview
//!
//! This crate provides [`SchemaValidator`], which implements the
//! [`SubmissionValidator`](testrun_core::traits::SubmissionValidator) trait.
//! Payloads are checked in two phases:
//!
//! 1. **Structural** — JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic** — rules (`required-field`, `allowed-values`,
//!    `forbidden-pattern`, `min-items`) declared in TOML, each optionally
//!    limited to certain overall results.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use testrun_rules::{RuleConfig, SchemaValidator};
//!
//! let schema = RuleConfig::from_file(Path::new("rules/submission.toml"))?.into_schema()?;
//! let validator = SchemaValidator::new(schema);
//! // Pass `validator` to `testrun_core::Moderator::new(...)`.
//! ```

pub mod config;
pub mod validator;

pub use config::{CheckKind, RuleConfig, RuleEntry};
pub use validator::SchemaValidator;

use testrun_contracts::error::TestRunResult;

/// A validator loaded with the built-in rules.
pub fn default_validator() -> TestRunResult<SchemaValidator> {
    Ok(SchemaValidator::new(RuleConfig::builtin()?.into_schema()?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
