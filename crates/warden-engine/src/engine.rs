//! The decision engine: rule selection, check evaluation, severity folding.
//!
//! Evaluation algorithm:
//!
//! 1. Iterate rules in compiled order; a rule is applicable when its target
//!    matches the action (exact name or namespace segment).
//! 2. Run ALL of an applicable rule's checks; failures are collected, not
//!    short-circuited, so the emitted reasons are complete. A rule with no
//!    checks triggers unconditionally.
//! 3. Fold severity: any triggered warn raises the verdict to `warn`; any
//!    triggered deny raises it to `deny`, which is terminal.
//! 4. No applicable rule at all is an explicit `allow` with a "no applicable
//!    policy" reason, deliberately distinguishable from "allowed because
//!    compliant" in audit output.

use std::path::PathBuf;

use tracing::{debug, warn};

use warden_contracts::{
    action::ActionRequest,
    decision::{Decision, Suggestion, Verdict},
    error::WardenResult,
    rule::{Rule, RuleEffect},
};

use warden_core::traits::Evaluator;

use crate::checks::run_check;
use crate::ruleset::{reload, ReloadSummary, RuleSet, RuleSetHandle};

/// The decision engine.
///
/// Holds an injectable handle to the active compiled rule set. Evaluation is
/// pure with respect to the handle's current contents, is safe to call
/// concurrently and speculatively, and never fails: every well-formed input
/// produces a `Decision`.
pub struct DecisionEngine {
    rules: RuleSetHandle,
}

impl DecisionEngine {
    /// Create an engine over an existing handle (shared with whoever drives
    /// reloads).
    pub fn new(rules: RuleSetHandle) -> Self {
        Self { rules }
    }

    /// Build an engine by loading and compiling the documents at `paths`.
    pub fn from_paths(paths: &[PathBuf]) -> WardenResult<(Self, ReloadSummary)> {
        let handle = RuleSetHandle::default();
        let summary = reload(&handle, paths)?;
        Ok((Self::new(handle), summary))
    }

    /// A clone of the rule-set handle, for hosts that reload externally.
    pub fn handle(&self) -> RuleSetHandle {
        self.rules.clone()
    }

    /// Re-run loader → validator → compiler and atomically republish.
    ///
    /// Never partially applies: on error the previous rule set stays active.
    pub fn reload(&self, paths: &[PathBuf]) -> WardenResult<ReloadSummary> {
        reload(&self.rules, paths)
    }

    /// Evaluate one action against the active rule set.
    pub fn evaluate(&self, request: &ActionRequest) -> Decision {
        let set: std::sync::Arc<RuleSet> = self.rules.current();
        evaluate_against(&set.rules, request)
    }
}

impl Evaluator for DecisionEngine {
    fn evaluate(&self, request: &ActionRequest) -> Decision {
        DecisionEngine::evaluate(self, request)
    }
}

/// Evaluate a request against a fixed rule slice, in order.
pub fn evaluate_against(rules: &[Rule], request: &ActionRequest) -> Decision {
    let action = request.action.as_str();
    debug!(action = %action, "evaluating action");

    let mut verdict = Verdict::Allow;
    let mut reasons: Vec<String> = Vec::new();
    let mut matched_rule_ids: Vec<String> = Vec::new();
    let mut suggestions: Vec<Suggestion> = Vec::new();
    let mut control_ids: Vec<String> = Vec::new();
    let mut any_applicable = false;

    for rule in rules {
        if !rule.target.matches(action) {
            continue;
        }
        any_applicable = true;

        let violations: Vec<String> = rule
            .checks
            .iter()
            .filter_map(|check| run_check(&request.arguments, check))
            .collect();

        // A rule with no checks is an always-on advisory.
        let triggered = if rule.checks.is_empty() {
            true
        } else {
            !violations.is_empty()
        };
        if !triggered {
            continue;
        }

        debug!(rule_id = %rule.id, effect = ?rule.effect, "rule triggered");
        matched_rule_ids.push(rule.id.clone());
        if violations.is_empty() {
            reasons.push(rule.description.clone());
        } else {
            reasons.extend(violations);
        }
        suggestions.extend(rule.suggestions.iter().cloned());
        for control in &rule.control_ids {
            if !control_ids.contains(control) {
                control_ids.push(control.clone());
            }
        }

        let effect_verdict = match rule.effect {
            RuleEffect::Warn => Verdict::Warn,
            RuleEffect::Deny => Verdict::Deny,
        };
        verdict = verdict.max(effect_verdict);
    }

    if !any_applicable {
        debug!(action = %action, "no applicable policy");
        return Decision::allow(format!("no applicable policy for action '{action}'"));
    }

    if matched_rule_ids.is_empty() {
        // Applicable rules exist and every check passed: the distinct
        // "allowed because compliant" audit outcome.
        return Decision::allow("all applicable policy rules satisfied");
    }

    if verdict == Verdict::Deny {
        warn!(action = %action, rules = ?matched_rule_ids, "action denied by policy");
    }

    Decision {
        verdict,
        reasons,
        matched_rule_ids,
        suggestions,
        control_ids,
    }
}
