//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. execution_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of record (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use testrun_contracts::{
    error::{TestRunError, TestRunResult},
    journal::SessionRecord,
};

use crate::event::JournalEvent;

/// Compute the SHA-256 hash for a single journal event.
///
/// Returns a lowercase 64-character hex string, or `JournalWriteFailed` if
/// the record cannot be serialized.
pub fn hash_event(
    execution_id: &str,
    sequence: u64,
    record: &SessionRecord,
    prev_hash: &str,
) -> TestRunResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| TestRunError::JournalWriteFailed {
        reason: format!("session record could not be serialized: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(execution_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event links to its predecessor (or `GENESIS_HASH`), its
/// sequence follows on, and its stored hash matches the recomputed one. An
/// empty chain is valid.
pub fn verify_chain(events: &[JournalEvent]) -> bool {
    let mut expected_prev = JournalEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.prev_hash != expected_prev || event.sequence != position as u64 {
            return false;
        }

        match hash_event(&event.execution_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
