//! # warden-trail
//!
//! Immutable, append-only, SHA-256 hash-chained session trail of warden gate
//! outcomes.
//!
//! ## Overview
//!
//! Every call through the consent gate is wrapped in a `TrailEvent` that
//! links to the previous event via its SHA-256 hash. Tampering with any
//! event — even a single byte — breaks the chain and is detected by
//! `verify_chain`. The trail is session-scoped, in-memory state; persisting
//! it anywhere is the host's concern.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_trail::InMemoryTrailWriter;
//! use warden_core::traits::TrailWriter;
//!
//! let writer = InMemoryTrailWriter::new(session_id.to_string());
//! writer.record(&gate_record)?;
//! writer.seal(&session_id.to_string())?;
//!
//! assert!(writer.verify_integrity());
//! let log = writer.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{SessionTrailLog, TrailEvent};
pub use memory::InMemoryTrailWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────
