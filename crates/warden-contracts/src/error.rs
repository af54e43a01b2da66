//! Runtime error types for the warden gating pipeline.
//!
//! All fallible operations in the warden crates return `WardenResult<T>`.
//! Routine governance outcomes (a policy deny, withheld consent, an action
//! with no applicable policy) are NOT errors; they travel as ordinary values
//! (`Decision`, `GateOutcome`). Error variants are reserved for genuinely
//! broken situations: unreadable configuration, merge conflicts, failed
//! collaborators.

use thiserror::Error;

/// The unified error type for the warden crates.
#[derive(Debug, Error)]
pub enum WardenError {
    /// A declared policy document path does not exist.
    ///
    /// The loader skips missing paths and reports them as warnings; this
    /// variant exists for callers that demand a single explicit file.
    #[error("policy document not found: {path}")]
    ConfigNotFound { path: String },

    /// A policy document could not be parsed, or a known key carried a value
    /// of the wrong type.
    ///
    /// Fatal to `reload`, but the previously published rule set stays in
    /// force; a broken edit never takes down the gating system.
    #[error("policy document parse error: {reason}")]
    ConfigParse { reason: String },

    /// A later document tried to merge an array into an existing non-array.
    #[error("merge conflict at '{path}': {reason}")]
    MergeConflict { path: String, reason: String },

    /// The session trail writer could not append a gate record.
    ///
    /// Treated as fatal by the gate: an action whose outcome cannot be
    /// recorded must not be reported as completed.
    #[error("trail write failed: {reason}")]
    TrailWriteFailed { reason: String },

    /// The side-effecting action runner failed while executing an action.
    #[error("action '{action}' failed: {reason}")]
    ActionFailed { action: String, reason: String },
}

/// Convenience alias used throughout the warden crates.
pub type WardenResult<T> = Result<T, WardenError>;
