//! Per-session consent state.
//!
//! Gates of this kind tend to accumulate independent mutable flags (consent
//! granted, already asked, dry-run only, ...) that can drift out of
//! agreement. Collapsing them into one `ConsentState { mode, asked_once }`
//! value makes disagreeing flags unrepresentable.

use serde::{Deserialize, Serialize};

/// How the human has told the gate to treat state-changing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentMode {
    /// No human response recorded yet.
    Undecided,
    /// Execute state-changing actions for the rest of the session.
    Execute,
    /// Dry-run state-changing actions; never perform the side effect.
    Simulate,
    /// Block state-changing actions for the rest of the session.
    Deny,
}

impl ConsentMode {
    /// Parse a raw human response line.
    ///
    /// Accepted (case-insensitive, trimmed): `yes`/`y` → Execute,
    /// `dry run`/`dry-run`/`dryrun`/`simulate` → Simulate,
    /// `no`/`n`/`cancel` → Deny. Anything else returns `None` and the
    /// caller should ask again.
    pub fn parse_response(raw: &str) -> Option<ConsentMode> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Some(ConsentMode::Execute),
            "dry run" | "dry-run" | "dryrun" | "simulate" => Some(ConsentMode::Simulate),
            "no" | "n" | "cancel" => Some(ConsentMode::Deny),
            _ => None,
        }
    }
}

/// Consent state for one conversation session.
///
/// Created undecided at session start, mutated only by explicit human input,
/// never reset mid-session. A policy deny does not touch this state; only a
/// human response does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentState {
    /// The recorded mode, replayed for every subsequent state-changing call.
    pub mode: ConsentMode,
    /// Whether the human has been prompted. The gate prompts at most once
    /// per session.
    pub asked_once: bool,
}

impl ConsentState {
    /// Fresh state for a new session: undecided, never asked.
    pub fn new() -> Self {
        Self {
            mode: ConsentMode::Undecided,
            asked_once: false,
        }
    }

    /// Record an explicit human response, latching `asked_once`.
    pub fn record(&mut self, mode: ConsentMode) {
        self.mode = mode;
        self.asked_once = true;
    }

    /// True once the human has chosen execute, simulate, or deny.
    pub fn is_decided(&self) -> bool {
        self.mode != ConsentMode::Undecided
    }
}

impl Default for ConsentState {
    fn default() -> Self {
        Self::new()
    }
}
