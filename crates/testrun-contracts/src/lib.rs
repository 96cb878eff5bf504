//! # testrun-contracts
//!
//! Shared types, payloads, and errors for test execution moderation.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod execution;
pub mod issue;
pub mod journal;
pub mod outcome;
pub mod submission;
pub mod validate;
