//! Error types for execution moderation.
//!
//! All fallible operations in the workspace return `TestRunResult<T>`.
//! Variants carry enough context to be written to the session journal or
//! surfaced to the person editing the execution.

use thiserror::Error;

/// The unified error type for execution moderation.
#[derive(Debug, Error)]
pub enum TestRunError {
    /// A step index outside the range fixed when the session started.
    ///
    /// This is a programmer error: the step count never changes after the
    /// session starts, so a correct caller can never produce it.
    #[error("step index {index} is out of range for an execution with {len} steps")]
    StepOutOfRange { index: usize, len: usize },

    /// A string could not be interpreted as an overall execution result.
    #[error("unknown execution result '{value}'")]
    UnknownResult { value: String },

    /// The issue selected for linking does not exist in the issue directory.
    #[error("issue '{issue_id}' was not found")]
    IssueNotFound { issue_id: String },

    /// The issue directory could not be queried.
    #[error("issue lookup failed: {reason}")]
    IssueLookupFailed { reason: String },

    /// The persistence collaborator rejected or failed to store the payload.
    ///
    /// Session state is left intact so the submission can be retried.
    #[error("submission failed: {reason}")]
    SubmissionFailed { reason: String },

    /// The session journal could not record an action.
    #[error("journal write failed: {reason}")]
    JournalWriteFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the workspace.
pub type TestRunResult<T> = Result<T, TestRunError>;
