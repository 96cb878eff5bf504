//! # testrun-ledger
//!
//! Session history and in-memory collaborators for execution moderation.
//!
//! ## Overview
//!
//! Every action the moderator takes on a session is wrapped in a
//! `JournalEvent` that links to the previous event via its SHA-256 hash.
//! Tampering with any event breaks the chain and is detected by
//! `verify_chain`.
//!
//! The crate also ships `InMemoryExecutionStore` and
//! `InMemoryIssueDirectory`, stand-ins for the persistence API and the
//! defect tracker.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use testrun_ledger::InMemorySessionJournal;
//!
//! let journal = InMemorySessionJournal::new();
//! let moderator = Moderator::new(store, issues, Box::new(journal.clone()), validator);
//! // ... drive a session ...
//! assert!(journal.verify_integrity(&session.execution_id)?);
//! ```

pub mod chain;
pub mod event;
pub mod memory;
pub mod store;

pub use chain::{hash_event, verify_chain};
pub use event::{JournalEvent, SessionHistory};
pub use memory::InMemorySessionJournal;
pub use store::{InMemoryExecutionStore, InMemoryIssueDirectory};

// ── Tests ─────────────────────────────────────────────────────────────────────
