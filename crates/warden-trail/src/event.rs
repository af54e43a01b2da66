//! Trail event and sealed log types.
//!
//! `TrailEvent` is a single entry in the hash chain — it wraps a
//! `GateRecord` with sequence numbering and the SHA-256 hashes that make
//! tampering detectable. `SessionTrailLog` is the sealed record produced
//! when a session ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_contracts::gate::GateRecord;

/// A single entry in the SHA-256 hash chain for one session.
///
/// Each event commits to the previous event via `prev_hash`, forming an
/// append-only chain. Modifying any field — including those of the embedded
/// `record` — invalidates `this_hash` and every subsequent `prev_hash`,
/// which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailEvent {
    /// Monotonically increasing position in the chain, starting at 0.
    pub sequence: u64,

    /// The session this event belongs to.
    pub session_id: String,

    /// The immutable gate record produced for one gated call.
    pub record: GateRecord,

    /// SHA-256 hash (hex) of the previous event, or `GENESIS_HASH` for the
    /// first event.
    pub prev_hash: String,

    /// SHA-256 hash (hex) of this event's canonical content, computed by
    /// `hash_event()` over (session_id, sequence, prev_hash, record JSON).
    pub this_hash: String,
}

impl TrailEvent {
    /// The sentinel `prev_hash` used for the first event in every chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed trail for one finished session.
///
/// The `terminal_hash` is the `this_hash` of the last event and serves as a
/// compact commitment to the entire trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTrailLog {
    /// The session whose gated calls are recorded here.
    pub session_id: String,

    /// All trail events in chain order (sequence 0 first).
    pub events: Vec<TrailEvent>,

    /// Wall-clock time (UTC) the trail was exported / sealed.
    pub sealed_at: DateTime<Utc>,

    /// The `this_hash` of the last event. Empty string if the trail is empty.
    pub terminal_hash: String,
}
