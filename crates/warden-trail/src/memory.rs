//! In-memory implementation of `TrailWriter`.
//!
//! `InMemoryTrailWriter` keeps all events in a `Vec` protected by a `Mutex`,
//! making it safe to hand to the gate while other code holds a clone of the
//! interior `Arc` for inspection. Use `export_log()` after the session ends
//! to obtain a sealed `SessionTrailLog`, and `verify_integrity()` at any
//! time to confirm the chain has not been tampered with in memory.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use warden_contracts::{
    error::{WardenError, WardenResult},
    gate::GateRecord,
};
use warden_core::traits::TrailWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{SessionTrailLog, TrailEvent},
};

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryTrailWriter`.
pub(crate) struct TrailState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<TrailEvent>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// The `this_hash` of the last written event, or `GENESIS_HASH` before
    /// any event has been written.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An in-memory, append-only trail writer backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `record()` and `seal()` both acquire a `Mutex` internally, so clones of
/// the interior `Arc` may be observed from other threads without additional
/// synchronization.
pub struct InMemoryTrailWriter {
    session_id: String,
    pub(crate) state: Arc<Mutex<TrailState>>,
}

impl InMemoryTrailWriter {
    /// Create a new writer for the given session.
    ///
    /// The internal `last_hash` starts at `TrailEvent::GENESIS_HASH` so the
    /// first event's `prev_hash` is automatically correct.
    pub fn new(session_id: impl Into<String>) -> Self {
        let state = TrailState {
            events: Vec::new(),
            sequence: 0,
            last_hash: TrailEvent::GENESIS_HASH.to_string(),
        };
        Self {
            session_id: session_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Export a sealed `SessionTrailLog` containing all events so far.
    pub fn export_log(&self) -> SessionTrailLog {
        let state = self.state.lock().expect("trail state lock poisoned");
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        SessionTrailLog {
            session_id: self.session_id.clone(),
            events: state.events.clone(),
            sealed_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("trail state lock poisoned");
        verify_chain(&state.events)
    }
}

// ── TrailWriter impl ──────────────────────────────────────────────────────────

impl TrailWriter for InMemoryTrailWriter {
    /// Append one gate record to the hash chain.
    ///
    /// Computes `this_hash` from (session_id, sequence, prev_hash, record),
    /// wraps the record in a `TrailEvent`, appends it, then advances the
    /// sequence counter and `last_hash`.
    fn record(&self, record: &GateRecord) -> WardenResult<()> {
        let mut state = self.state.lock().map_err(|e| WardenError::TrailWriteFailed {
            reason: format!("trail state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;

        let this_hash = hash_event(&self.session_id, sequence, record, &prev_hash);

        let event = TrailEvent {
            sequence,
            session_id: self.session_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        };

        state.events.push(event);
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    /// Mark the session as finished.
    ///
    /// The in-memory writer has nothing to flush; it logs a structured
    /// summary via `tracing`.
    fn seal(&self, session_id: &str) -> WardenResult<()> {
        let state = self.state.lock().map_err(|e| WardenError::TrailWriteFailed {
            reason: format!("trail state lock poisoned: {}", e),
        })?;

        info!(
            session_id = %session_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "session trail sealed"
        );

        Ok(())
    }
}
