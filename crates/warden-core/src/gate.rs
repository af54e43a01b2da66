//! The consent gate: a per-session state machine between the conversation
//! loop and the side-effecting action runner.
//!
//! Behavior per state-changing call:
//!
//! 1. Evaluate. A `deny` verdict blocks immediately; a policy deny is not a
//!    human deny and does not consume the one consent prompt.
//! 2. `undecided` and never asked → present the pending plan, read one human
//!    response (`yes` / `dry run` / `no`), latch it into `ConsentState`.
//! 3. A decided mode replays without re-prompting: execute calls through,
//!    simulate fabricates a dry-run result, deny blocks. A fresh policy
//!    deny always wins over a stale `execute` consent.
//!
//! Read-only actions (anything outside the state-changing prefix list)
//! bypass consent entirely and always execute.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use warden_contracts::{
    action::ActionRequest,
    consent::{ConsentMode, ConsentState},
    decision::Decision,
    error::WardenResult,
    gate::{GateOutcome, GateRecord, GateStatus, PendingPlan},
};

use crate::traits::{ActionRunner, ConsentPrompter, Evaluator, TrailWriter};

/// The fixed namespace-prefix allow-list that classifies actions as
/// state-changing.
///
/// Supplied by the host at construction; the gate itself has no opinion on
/// which namespaces mutate state.
#[derive(Debug, Clone, Default)]
pub struct StateChangingScope {
    prefixes: Vec<String>,
}

impl StateChangingScope {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the action name starts with any configured prefix.
    pub fn is_state_changing(&self, action: &str) -> bool {
        self.prefixes.iter().any(|p| action.starts_with(p.as_str()))
    }
}

/// The consent gate for one conversation session.
///
/// Owns the trusted collaborators and the session's single `ConsentState`.
/// One gate per session; the state is never shared across sessions.
pub struct ConsentGate {
    evaluator: Box<dyn Evaluator>,
    runner: Box<dyn ActionRunner>,
    prompter: Box<dyn ConsentPrompter>,
    trail: Box<dyn TrailWriter>,
    scope: StateChangingScope,
    state: ConsentState,
}

impl ConsentGate {
    /// Create a gate with the given collaborators and a fresh, undecided
    /// consent state.
    pub fn new(
        evaluator: Box<dyn Evaluator>,
        runner: Box<dyn ActionRunner>,
        prompter: Box<dyn ConsentPrompter>,
        trail: Box<dyn TrailWriter>,
        scope: StateChangingScope,
    ) -> Self {
        Self {
            evaluator,
            runner,
            prompter,
            trail,
            scope,
            state: ConsentState::new(),
        }
    }

    /// The session's current consent state.
    pub fn consent_state(&self) -> ConsentState {
        self.state
    }

    /// Record a raw human response read by the conversation loop itself.
    ///
    /// Unparsable input leaves the state untouched; the loop should ask
    /// again.
    pub fn record_human_response(&mut self, raw: &str) {
        match ConsentMode::parse_response(raw) {
            Some(mode) => {
                info!(mode = ?mode, "human consent recorded");
                self.state.record(mode);
            }
            None => warn!(raw = %raw, "unrecognized consent response ignored"),
        }
    }

    /// Gate one action.
    ///
    /// Returns the outcome for every routine path (executed, simulated, or
    /// blocked). `Err` is reserved for broken collaborators (a failed runner
    /// call or trail append).
    pub fn gate(&mut self, action: &str, arguments: &Value) -> WardenResult<GateOutcome> {
        // Read-only actions bypass consent entirely and always execute.
        if !self.scope.is_state_changing(action) {
            debug!(action = %action, "read-only action; bypassing consent gate");
            let result = self.runner.execute(action, arguments)?;
            let outcome = GateOutcome {
                status: GateStatus::Executed,
                decision: Decision::allow("read-only action; consent gate bypassed"),
                result: Some(result),
                note: Some("read-only bypass".to_string()),
            };
            self.record(action, arguments, &outcome)?;
            return Ok(outcome);
        }

        let request = ActionRequest::new(action, arguments.clone());
        let decision = self.evaluator.evaluate(&request);

        // A fresh policy deny always blocks, even under a recorded
        // `execute` consent, and never touches the consent state.
        if !decision.permits_execution() {
            warn!(action = %action, reasons = ?decision.reasons, "action blocked by policy");
            let outcome = GateOutcome {
                status: GateStatus::Blocked,
                decision,
                result: None,
                note: Some("blocked by policy".to_string()),
            };
            self.record(action, arguments, &outcome)?;
            return Ok(outcome);
        }

        if !self.state.is_decided() {
            if self.state.asked_once {
                // Cannot arise through this API (every recorded response
                // sets a mode), but the state is a plain value: fail closed.
                let outcome = GateOutcome {
                    status: GateStatus::Blocked,
                    decision,
                    result: None,
                    note: Some("consent not granted".to_string()),
                };
                self.record(action, arguments, &outcome)?;
                return Ok(outcome);
            }
            self.prompt_for_consent(action, arguments, &decision);
        }

        match self.state.mode {
            ConsentMode::Execute => {
                let result = self.runner.execute(action, arguments)?;
                info!(action = %action, "state-changing action executed");
                let outcome = GateOutcome {
                    status: GateStatus::Executed,
                    decision,
                    result: Some(result),
                    note: None,
                };
                self.record(action, arguments, &outcome)?;
                Ok(outcome)
            }
            ConsentMode::Simulate => {
                // Synthetic "would have happened" result; the runner is
                // never touched in this mode.
                let result = json!({
                    "simulated": true,
                    "action": action,
                    "arguments": arguments,
                });
                info!(action = %action, "state-changing action simulated");
                let outcome = GateOutcome {
                    status: GateStatus::Simulated,
                    decision,
                    result: Some(result),
                    note: Some("dry run; no changes were made".to_string()),
                };
                self.record(action, arguments, &outcome)?;
                Ok(outcome)
            }
            ConsentMode::Deny | ConsentMode::Undecided => {
                info!(action = %action, "state-changing action blocked by withheld consent");
                let outcome = GateOutcome {
                    status: GateStatus::Blocked,
                    decision,
                    result: None,
                    note: Some("consent declined for this session".to_string()),
                };
                self.record(action, arguments, &outcome)?;
                Ok(outcome)
            }
        }
    }

    /// Present the pending plan and read responses until one parses.
    ///
    /// Cancellation (`None` from the prompter) is recorded as a `no`.
    fn prompt_for_consent(&mut self, action: &str, arguments: &Value, decision: &Decision) {
        let plan = PendingPlan {
            action: action.to_string(),
            arguments: arguments.clone(),
            decision: decision.clone(),
        };
        loop {
            match self.prompter.request_consent(&plan) {
                None => {
                    info!("consent prompt cancelled; recording as 'no'");
                    self.state.record(ConsentMode::Deny);
                    return;
                }
                Some(raw) => match ConsentMode::parse_response(&raw) {
                    Some(mode) => {
                        info!(mode = ?mode, "human consent recorded");
                        self.state.record(mode);
                        return;
                    }
                    None => {
                        warn!(raw = %raw, "unrecognized consent response; asking again");
                    }
                },
            }
        }
    }

    fn record(&self, action: &str, arguments: &Value, outcome: &GateOutcome) -> WardenResult<()> {
        self.trail.record(&GateRecord {
            action: action.to_string(),
            arguments: arguments.clone(),
            decision: outcome.decision.clone(),
            status: outcome.status,
            timestamp: Utc::now(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
