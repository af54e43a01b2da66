//! Compiled policy rule types.
//!
//! A `Rule` is one atomic, independently evaluable policy unit produced by
//! the compiler from a declarative policy document. Rules are immutable once
//! compiled and are discarded wholesale when a reload publishes a new set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::namespace_of;
use crate::decision::Suggestion;

/// What a rule applies to.
///
/// Exactly one targeting mode per rule, enforced by the type rather than by
/// a pair of optional fields that could both (or neither) be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleTarget {
    /// Matches one exact namespaced action name.
    Action(String),
    /// Matches every action whose namespace segment equals this value.
    Namespace(String),
}

impl RuleTarget {
    /// Return true if this target selects the given action name.
    pub fn matches(&self, action: &str) -> bool {
        match self {
            RuleTarget::Action(name) => name == action,
            RuleTarget::Namespace(ns) => namespace_of(action) == ns,
        }
    }
}

/// The severity a triggered rule contributes to the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    /// Advisory: raises the verdict to `warn` at most.
    Warn,
    /// Hard constraint: raises the verdict to `deny`.
    Deny,
}

/// One atomic predicate over a single field of an action's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Dot-separated path into the argument object, e.g. "tags.owner".
    pub field_path: String,
    /// The predicate applied to the resolved value.
    pub kind: CheckKind,
    /// Optional operator-authored message replacing the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The closed set of check predicates.
///
/// The evaluator matches on this exhaustively. Unrecognized kind strings
/// exist only at the compiler boundary (advisory-document ingestion), where
/// they are skipped and can never reach the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// The value must be a string that matches (`must_match = true`) or does
    /// not match (`must_match = false`) `pattern`.
    RegexMatch {
        pattern: String,
        case_insensitive: bool,
        must_match: bool,
    },
    /// The value must be a string containing no whitespace.
    NoWhitespace,
    /// The value, coerced to a string, must be one of `allowed`.
    ValueInAllowedSet { allowed: Vec<String> },
    /// The value must be an object containing every key in `keys`.
    RequiredKeysPresent { keys: Vec<String> },
    /// The value must be boolean `true`.
    BooleanMustBeTrue,
    /// The value must be present; an empty or whitespace-only string counts
    /// as absent.
    FieldMustBePresent,
    /// The value must equal `expected`.
    Equals { expected: Value },
    /// The value must be present and differ from `expected`.
    NotEquals { expected: Value },
}

/// One compiled, independently evaluable policy unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier used in decisions and trail records.
    pub id: String,
    /// Human-readable statement of what the rule enforces.
    pub description: String,
    /// Which actions this rule applies to.
    pub target: RuleTarget,
    /// Severity contributed when the rule triggers.
    pub effect: RuleEffect,
    /// Predicates evaluated against the call's arguments. A rule with no
    /// checks triggers unconditionally whenever its target matches; this is
    /// how suggestion-only advisory rules fire on compliant input.
    pub checks: Vec<Check>,
    /// Remediation advice attached when the rule triggers.
    pub suggestions: Vec<Suggestion>,
    /// Compliance-control identifiers carried into the decision.
    pub control_ids: Vec<String>,
}
