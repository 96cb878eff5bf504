//! Journal event and history types.
//!
//! `JournalEvent` is a single entry in the hash chain: it wraps a
//! `SessionRecord` with sequence numbering and the SHA-256 hashes that make
//! tampering detectable. `SessionHistory` is an export of one execution's
//! journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use testrun_contracts::journal::SessionRecord;

/// A single entry in the SHA-256 hash chain for one execution session.
///
/// Modifying any field, including those of the embedded `record`,
/// invalidates `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub execution_id: String,

    pub record: SessionRecord,

    /// Hash of the previous event, or `GENESIS_HASH` for the first one.
    pub prev_hash: String,

    /// Hash over (execution_id, sequence, prev_hash, canonical JSON of record).
    pub this_hash: String,
}

impl JournalEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Every journal event recorded for one execution, in chain order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistory {
    pub execution_id: String,

    pub events: Vec<JournalEvent>,

    /// Wall-clock time (UTC) the history was exported.
    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event. Empty when there are no events.
    pub terminal_hash: String,

    /// True when the last thing recorded was a finalized submission.
    pub finalized: bool,
}
