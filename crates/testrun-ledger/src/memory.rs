//! In-memory implementation of `SessionJournal`.
//!
//! `InMemorySessionJournal` keeps one hash chain per execution behind a
//! `Mutex`, so a single journal can serve every session a moderator drives.
//! Use `export_history()` to obtain a `SessionHistory` snapshot and
//! `verify_integrity()` to confirm a chain has not been altered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    execution::ExecutionId,
    journal::SessionRecord,
};
use testrun_core::traits::SessionJournal;

use crate::{
    chain::{hash_event, verify_chain},
    event::{JournalEvent, SessionHistory},
};

// ── Internal mutable state ────────────────────────────────────────────────────

/// One execution's chain.
#[derive(Default)]
pub(crate) struct ChainState {
    pub(crate) events: Vec<JournalEvent>,
    pub(crate) finalized: bool,
}

impl ChainState {
    fn last_hash(&self) -> String {
        self.events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_else(|| JournalEvent::GENESIS_HASH.to_string())
    }
}

// ── Public journal ────────────────────────────────────────────────────────────

/// An in-memory, append-only session journal backed by SHA-256 hash chains.
///
/// Cloning shares the underlying chains, so a caller can keep a handle for
/// inspection after boxing a clone into a `Moderator`.
#[derive(Clone, Default)]
pub struct InMemorySessionJournal {
    pub(crate) chains: Arc<Mutex<HashMap<String, ChainState>>>,
}

impl InMemorySessionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export every event recorded for `execution_id`.
    ///
    /// An execution that was never journaled exports as an empty history.
    pub fn export_history(&self, execution_id: &ExecutionId) -> TestRunResult<SessionHistory> {
        let key = execution_id.to_string();
        let chains = self.lock()?;
        let (events, finalized) = chains
            .get(&key)
            .map(|c| (c.events.clone(), c.finalized))
            .unwrap_or_default();
        let terminal_hash = events.last().map(|e| e.this_hash.clone()).unwrap_or_default();

        Ok(SessionHistory {
            execution_id: key,
            events,
            exported_at: Utc::now(),
            terminal_hash,
            finalized,
        })
    }

    /// Verify that the chain for `execution_id` has not been tampered with.
    pub fn verify_integrity(&self, execution_id: &ExecutionId) -> TestRunResult<bool> {
        let chains = self.lock()?;
        Ok(chains
            .get(&execution_id.to_string())
            .map_or(true, |c| verify_chain(&c.events)))
    }

    fn lock(&self) -> TestRunResult<std::sync::MutexGuard<'_, HashMap<String, ChainState>>> {
        self.chains.lock().map_err(|e| TestRunError::JournalWriteFailed {
            reason: format!("journal state lock poisoned: {}", e),
        })
    }
}

// ── SessionJournal impl ───────────────────────────────────────────────────────

impl SessionJournal for InMemorySessionJournal {
    /// Append one record to the execution's chain.
    ///
    /// A write after `finalize` reopens the history: the session was edited
    /// or submitted again, and the chain simply continues.
    fn write(&self, execution_id: &ExecutionId, record: &SessionRecord) -> TestRunResult<()> {
        let key = execution_id.to_string();
        let mut chains = self.lock()?;
        let chain = chains.entry(key.clone()).or_default();

        if chain.finalized {
            chain.finalized = false;
            debug!(execution_id = %key, "session journal reopened after submission");
        }

        let prev_hash = chain.last_hash();
        let sequence = chain.events.len() as u64;
        let this_hash = hash_event(&key, sequence, record, &prev_hash)?;

        chain.events.push(JournalEvent {
            sequence,
            execution_id: key,
            record: record.clone(),
            prev_hash,
            this_hash,
        });

        Ok(())
    }

    fn finalize(&self, execution_id: &ExecutionId) -> TestRunResult<()> {
        let key = execution_id.to_string();
        let mut chains = self.lock()?;
        let chain = chains.entry(key.clone()).or_default();
        chain.finalized = true;

        info!(
            execution_id = %key,
            event_count = chain.events.len(),
            terminal_hash = %chain.last_hash(),
            "session journal finalized"
        );

        Ok(())
    }
}
