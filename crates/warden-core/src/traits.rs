//! Collaborator trait definitions for the consent-gating pipeline.
//!
//! Four seams define the gate's trust boundary:
//!
//! - `Evaluator`:       trusted, pure: action to `Decision`
//! - `ActionRunner`:    the side-effecting tool layer being governed
//! - `ConsentPrompter`: the human-response read; suspends the session loop
//! - `TrailWriter`:     trusted sink recording every gated call
//!
//! The gate wires them so the runner is never invoked for a state-changing
//! action without policy approval and recorded human consent.

use serde_json::Value;

use warden_contracts::{
    action::ActionRequest,
    decision::Decision,
    error::WardenResult,
    gate::{GateRecord, PendingPlan},
};

/// The decision engine seam.
///
/// Implementations are **trusted** and must be deterministic and
/// side-effect-free. Evaluation is safe to call speculatively (planning,
/// previews) and never fails: every well-formed input yields a `Decision`.
pub trait Evaluator: Send + Sync {
    /// Evaluate one planned action against the active rule set.
    fn evaluate(&self, request: &ActionRequest) -> Decision;
}

/// The side-effecting collaborator that actually performs actions.
///
/// The gate guarantees `execute` is never called for a state-changing action
/// unless policy permits it and the session's consent mode is `Execute`.
/// Read-only actions bypass the gate and call straight through.
pub trait ActionRunner: Send + Sync {
    /// Perform the action and return its provider result.
    fn execute(&self, action: &str, arguments: &Value) -> WardenResult<Value>;
}

/// The human-response read.
///
/// `request_consent` blocks (cooperatively, within the session's own turn
/// loop) until the human answers. Returning `None` means the prompt was
/// cancelled, which the gate records as a `no`. There is deliberately no
/// timeout on this read.
pub trait ConsentPrompter: Send + Sync {
    /// Present the pending plan and read one raw response line.
    fn request_consent(&self, plan: &PendingPlan) -> Option<String>;
}

/// The session trail sink.
///
/// Every gated call (executed, simulated, or blocked) produces exactly one
/// `GateRecord`. A failed append is fatal: an action whose outcome cannot be
/// recorded must not be reported as completed.
pub trait TrailWriter: Send + Sync {
    /// Append one gate record to the session trail.
    fn record(&self, record: &GateRecord) -> WardenResult<()>;

    /// Seal the trail for a finished session.
    ///
    /// Implementations may use this to flush, sign, or log a summary.
    fn seal(&self, session_id: &str) -> WardenResult<()>;
}
