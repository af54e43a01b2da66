//! Rule compiler: policy intents → flat, independently evaluable rules.
//!
//! Each fragment intent lowers to at most one rule; advisory entries lower
//! to warn rules with explicit kind/path/parameter checks. Emission order is
//! deterministic: providers, action kinds, and advisory profile/domain/code
//! keys iterate in sorted (BTreeMap) order, and intents emit in a fixed
//! sequence, so the compiled rule order (and therefore decision reason
//! order) is stable across runs.
//!
//! Hard constraints that cannot be enforced (an invalid `name_pattern`) fail
//! compilation outright. Advisory entries degrade instead: an unknown check
//! kind or a malformed parameter skips that check with a warning log, never
//! failing the load.

use regex::Regex;
use tracing::warn;

use warden_contracts::{
    decision::Suggestion,
    error::{WardenError, WardenResult},
    rule::{Check, CheckKind, Rule, RuleEffect, RuleTarget},
};

use crate::document::{
    ActionFragment, AdvisoryCheckSpec, AdvisoryRule, PolicyDocument, SuggestionSpec,
};

/// Compile a validated document into the flat rule list.
pub fn compile(doc: &PolicyDocument) -> WardenResult<Vec<Rule>> {
    let mut rules = Vec::new();

    for (provider, kinds) in &doc.providers {
        for (kind, fragment) in kinds {
            let (target, label) = if kind == "*" {
                (RuleTarget::Namespace(provider.clone()), provider.clone())
            } else {
                let action = format!("{provider}.{kind}");
                (RuleTarget::Action(action.clone()), action)
            };
            compile_fragment(&mut rules, &target, &label, fragment)?;
        }
    }

    for (profile, domains) in &doc.advisory {
        for (domain, codes) in domains {
            for (code, entry) in codes {
                if let Some(rule) = compile_advisory(profile, domain, code, entry) {
                    rules.push(rule);
                }
            }
        }
    }

    Ok(rules)
}

/// Lower one fragment's intents, in fixed order.
fn compile_fragment(
    rules: &mut Vec<Rule>,
    target: &RuleTarget,
    label: &str,
    fragment: &ActionFragment,
) -> WardenResult<()> {
    if !fragment.banned_name_terms.is_empty() {
        rules.push(banned_terms_rule(target, label, &fragment.banned_name_terms));
    }

    if let Some(pattern) = &fragment.name_pattern {
        ensure_valid_pattern(pattern, label)?;
        rules.push(Rule {
            id: format!("{label}/name-pattern"),
            description: format!("name for {label} must match the pattern '{pattern}'"),
            target: target.clone(),
            effect: RuleEffect::Deny,
            checks: vec![Check {
                field_path: "name".to_string(),
                kind: CheckKind::RegexMatch {
                    pattern: pattern.clone(),
                    case_insensitive: false,
                    must_match: true,
                },
                message: Some(format!("name must match the pattern '{pattern}'")),
            }],
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        });
    }

    if !fragment.no_whitespace_fields.is_empty() {
        rules.push(Rule {
            id: format!("{label}/no-whitespace"),
            description: format!(
                "fields of {label} that must not contain whitespace: {}",
                fragment.no_whitespace_fields.join(", ")
            ),
            target: target.clone(),
            effect: RuleEffect::Deny,
            checks: fragment
                .no_whitespace_fields
                .iter()
                .map(|path| Check {
                    field_path: path.clone(),
                    kind: CheckKind::NoWhitespace,
                    message: None,
                })
                .collect(),
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        });
    }

    if !fragment.allowed_values.is_empty() {
        rules.push(Rule {
            id: format!("{label}/allowed-values"),
            description: format!("allowed values for fields of {label}"),
            target: target.clone(),
            effect: RuleEffect::Deny,
            checks: fragment
                .allowed_values
                .iter()
                .map(|(path, allowed)| Check {
                    field_path: path.clone(),
                    kind: CheckKind::ValueInAllowedSet {
                        allowed: allowed.clone(),
                    },
                    message: None,
                })
                .collect(),
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        });
    }

    if !fragment.required_tags.is_empty() {
        rules.push(Rule {
            id: format!("{label}/required-tags"),
            description: format!(
                "required tags for {label}: {}",
                fragment.required_tags.join(", ")
            ),
            target: target.clone(),
            effect: RuleEffect::Deny,
            checks: vec![Check {
                field_path: "tags".to_string(),
                kind: CheckKind::RequiredKeysPresent {
                    keys: fragment.required_tags.clone(),
                },
                message: None,
            }],
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        });
    }

    if !fragment.required_fields.is_empty() {
        rules.push(Rule {
            id: format!("{label}/required-fields"),
            description: format!(
                "required arguments for {label}: {}",
                fragment.required_fields.join(", ")
            ),
            target: target.clone(),
            effect: RuleEffect::Deny,
            checks: fragment
                .required_fields
                .iter()
                .map(|path| Check {
                    field_path: path.clone(),
                    kind: CheckKind::FieldMustBePresent,
                    message: None,
                })
                .collect(),
            suggestions: Vec::new(),
            control_ids: Vec::new(),
        });
    }

    if !fragment.suggestions.is_empty() {
        rules.push(Rule {
            id: format!("{label}/suggestions"),
            description: fragment
                .description
                .clone()
                .unwrap_or_else(|| format!("recommendations for {label}")),
            target: target.clone(),
            effect: RuleEffect::Warn,
            // No checks: the rule triggers whenever its target matches, so
            // the advice is surfaced even for fully compliant calls.
            checks: Vec::new(),
            suggestions: fragment.suggestions.iter().map(to_suggestion).collect(),
            control_ids: Vec::new(),
        });
    }

    Ok(())
}

fn to_suggestion(spec: &SuggestionSpec) -> Suggestion {
    Suggestion {
        title: spec.title.clone(),
        text: spec.text.clone(),
        proposed_fix: spec.proposed_fix.clone(),
    }
}

/// Build the single deny-list rule: one case-insensitive alternation of
/// escaped terms, so one violation reason names the banned terms at once
/// instead of emitting N separate equality checks.
fn banned_terms_rule(target: &RuleTarget, label: &str, terms: &[String]) -> Rule {
    // regex::escape handles every metacharacter, so any operator-supplied
    // term is safe inside the alternation.
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("(?:{alternation})");

    Rule {
        id: format!("{label}/name-deny-list"),
        description: format!("name for {label} must not contain: {}", terms.join(", ")),
        target: target.clone(),
        effect: RuleEffect::Deny,
        checks: vec![Check {
            field_path: "name".to_string(),
            kind: CheckKind::RegexMatch {
                pattern,
                case_insensitive: true,
                must_match: false,
            },
            message: Some(format!(
                "name must not contain any of the banned terms: {}",
                terms.join(", ")
            )),
        }],
        suggestions: Vec::new(),
        control_ids: Vec::new(),
    }
}

/// A hard-constraint pattern that does not compile fails the whole load;
/// an unenforceable hard constraint must not silently pass everything.
fn ensure_valid_pattern(pattern: &str, label: &str) -> WardenResult<()> {
    Regex::new(pattern).map(|_| ()).map_err(|e| WardenError::ConfigParse {
        reason: format!("invalid regex in hard constraint for {label}: {e}"),
    })
}

/// Compile one advisory entry into a warn rule.
///
/// Unknown or malformed check entries are skipped; an entry that loses all
/// its checks still compiles as an always-on advisory carrying its controls
/// and suggestion.
fn compile_advisory(profile: &str, domain: &str, code: &str, entry: &AdvisoryRule) -> Option<Rule> {
    let id = format!("advisory/{profile}/{domain}/{code}");

    if entry.applies_to.is_empty() {
        warn!(rule = %id, "advisory entry has no applies_to target; skipped");
        return None;
    }
    let target = if entry.applies_to.contains('.') {
        RuleTarget::Action(entry.applies_to.clone())
    } else {
        RuleTarget::Namespace(entry.applies_to.clone())
    };

    let checks: Vec<Check> = entry
        .checks
        .iter()
        .filter_map(|spec| compile_advisory_check(&id, spec))
        .collect();

    let mut suggestions = Vec::new();
    if let Some(text) = &entry.suggestion {
        suggestions.push(Suggestion::text_only(text.clone()));
    }

    Some(Rule {
        id,
        description: entry
            .description
            .clone()
            .unwrap_or_else(|| format!("advisory rule {code} ({domain})")),
        target,
        effect: RuleEffect::Warn,
        checks,
        suggestions,
        control_ids: entry.control_ids.clone(),
    })
}

/// Map one advisory check spec onto a `CheckKind`.
///
/// Returns `None`, with a warning log, for unknown kinds, missing
/// parameters, or an invalid pattern. The unknown-kind fallback lives here,
/// at the compiler boundary, so the evaluator's enum stays closed.
fn compile_advisory_check(rule_id: &str, spec: &AdvisoryCheckSpec) -> Option<Check> {
    if spec.path.is_empty() {
        warn!(rule = %rule_id, kind = %spec.kind, "advisory check has no path; skipped");
        return None;
    }

    let kind = match spec.kind.as_str() {
        "regex-match" => {
            let pattern = match &spec.pattern {
                Some(p) => p.clone(),
                None => {
                    warn!(rule = %rule_id, "regex-match check missing 'pattern'; skipped");
                    return None;
                }
            };
            if let Err(e) = Regex::new(&pattern) {
                warn!(rule = %rule_id, pattern = %pattern, error = %e, "invalid advisory pattern; skipped");
                return None;
            }
            CheckKind::RegexMatch {
                pattern,
                case_insensitive: spec.case_insensitive,
                must_match: spec.must_match.unwrap_or(true),
            }
        }
        "no-whitespace" => CheckKind::NoWhitespace,
        "value-in-allowed-set" => {
            if spec.values.is_empty() {
                warn!(rule = %rule_id, "value-in-allowed-set check has no 'values'; skipped");
                return None;
            }
            CheckKind::ValueInAllowedSet {
                allowed: spec.values.clone(),
            }
        }
        "required-keys-present" => {
            if spec.keys.is_empty() {
                warn!(rule = %rule_id, "required-keys-present check has no 'keys'; skipped");
                return None;
            }
            CheckKind::RequiredKeysPresent {
                keys: spec.keys.clone(),
            }
        }
        "boolean-must-be-true" => CheckKind::BooleanMustBeTrue,
        "field-must-be-present" => CheckKind::FieldMustBePresent,
        "equals" => match &spec.expected {
            Some(expected) => CheckKind::Equals {
                expected: expected.clone(),
            },
            None => {
                warn!(rule = %rule_id, "equals check missing 'expected'; skipped");
                return None;
            }
        },
        "not-equals" => match &spec.expected {
            Some(expected) => CheckKind::NotEquals {
                expected: expected.clone(),
            },
            None => {
                warn!(rule = %rule_id, "not-equals check missing 'expected'; skipped");
                return None;
            }
        },
        other => {
            warn!(rule = %rule_id, kind = %other, "unknown advisory check kind; skipped");
            return None;
        }
    };

    Some(Check {
        field_path: spec.path.clone(),
        kind,
        message: spec.message.clone(),
    })
}
