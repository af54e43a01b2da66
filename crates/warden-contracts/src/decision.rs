//! Decision and verdict types.
//!
//! The decision engine consumes an `ActionRequest` and produces a `Decision`.
//! `Verdict` variants are ordered by severity: `Allow < Warn < Deny`. When
//! several rules trigger for one action, the strictest verdict wins and a
//! deny is terminal and can never be downgraded by a later warn rule.

use serde::{Deserialize, Serialize};

/// The severity outcome of evaluating one action against the rule set.
///
/// The derive order is load-bearing: severity folding uses `Ord`, so the
/// variants must stay declared from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The action is permitted as-is.
    Allow,
    /// The action is permitted but carries advisory findings.
    Warn,
    /// The action violates a hard constraint and must not be performed.
    Deny,
}

impl Verdict {
    /// Lowercase string form used in wire output and trail records.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Warn => "warn",
            Verdict::Deny => "deny",
        }
    }
}

/// Remediation advice attached to a warn rule and surfaced in decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Optional short heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Advisory text shown to the operator.
    pub text: String,
    /// Optional ready-to-apply alternative argument object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_fix: Option<serde_json::Value>,
}

impl Suggestion {
    /// A plain-text suggestion with no title or fix.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
            proposed_fix: None,
        }
    }
}

/// The full outcome of one evaluation call.
///
/// Produced fresh per call and never stored by the engine itself; the gate
/// embeds it in trail records and callers may log it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The folded severity across every triggered rule.
    pub verdict: Verdict,
    /// Human-readable reasons, in rule-then-check order. Never empty: a
    /// deny/warn lists every failed check, and an allow states whether policy
    /// was satisfied or simply absent, which are two different audit outcomes.
    pub reasons: Vec<String>,
    /// Ids of every rule that triggered, in compiled rule order.
    pub matched_rule_ids: Vec<String>,
    /// Suggestions aggregated from triggered rules, in rule order.
    pub suggestions: Vec<Suggestion>,
    /// Compliance-control identifiers from triggered advisory rules,
    /// deduplicated in first-seen order.
    pub control_ids: Vec<String>,
}

impl Decision {
    /// An allow decision carrying a single reason and nothing else.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Allow,
            reasons: vec![reason.into()],
            matched_rule_ids: Vec::new(),
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        }
    }

    /// True when the verdict permits execution (allow or warn).
    pub fn permits_execution(&self) -> bool {
        self.verdict != Verdict::Deny
    }
}
