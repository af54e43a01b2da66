//! Gate outcome and trail record types.
//!
//! `GateOutcome` is what the consent gate returns to the conversation loop.
//! `GateRecord` is what gets appended to the session trail, exactly one per
//! gated call, whatever the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decision::Decision;

/// What happened to a gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    /// The side-effecting runner was invoked and completed.
    Executed,
    /// A synthetic dry-run result was produced; the runner was not invoked.
    Simulated,
    /// The call was withheld, by policy deny or by withheld consent.
    Blocked,
}

impl GateStatus {
    /// Lowercase string form for wire output and trail records.
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Executed => "executed",
            GateStatus::Simulated => "simulated",
            GateStatus::Blocked => "blocked",
        }
    }
}

/// The outcome of one call through the consent gate.
///
/// Callers pattern-match on `status`:
/// - `Executed`  → `result` holds the runner's return value
/// - `Simulated` → `result` holds the synthetic "would have happened" value
/// - `Blocked`   → inspect `decision.reasons` and `note`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateOutcome {
    /// What the gate did with the call.
    pub status: GateStatus,
    /// The governance decision for this call.
    pub decision: Decision,
    /// Runner result or synthetic dry-run result; absent when blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Gate-level explanation (read-only bypass, session denial, dry-run).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An immutable record of one gated call, appended to the session trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateRecord {
    /// The namespaced action name.
    pub action: String,
    /// The call's argument object as submitted.
    pub arguments: Value,
    /// The decision the engine returned for this call.
    pub decision: Decision,
    /// What the gate did.
    pub status: GateStatus,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}

/// The pending plan presented to the human at the consent prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPlan {
    /// The first state-changing action awaiting consent.
    pub action: String,
    /// Its argument object.
    pub arguments: Value,
    /// The decision for that action, shown so warnings and suggestions are
    /// visible before the human chooses.
    pub decision: Decision,
}
