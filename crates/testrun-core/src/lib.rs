//! # testrun-core
//!
//! Overall-result aggregation and session moderation for test case
//! executions.
//!
//! This crate provides:
//! - [`aggregate`]: the pure rule that turns step outcomes into an overall
//!   result, plus issue proposal and payload preparation
//! - [`session::ExecutionSession`]: the state of one execution being edited
//! - The four collaborator traits (`ExecutionStore`, `IssueDirectory`,
//!   `SessionJournal`, `SubmissionValidator`)
//! - [`Moderator`], which journals every session action and gates submission
//!
//! ## Usage
//!
//! ```rust,ignore
//! use testrun_core::{Moderator, session::ExecutionSession};
//!
//! let mut session = moderator.start(&definition, Some(cycle_id))?;
//! moderator.record_step(&mut session, 0, StepOutcome::Passed)?;
//! moderator.submit(&session)?;
//! ```

pub mod aggregate;
pub mod moderator;
pub mod session;
pub mod traits;

pub use moderator::{Moderator, SubmissionOutcome};
pub use session::ExecutionSession;
