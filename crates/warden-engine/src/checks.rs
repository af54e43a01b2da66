//! Check evaluation: one typed predicate against one resolved field.
//!
//! Field resolution walks the dotted path through nested objects; a missing
//! segment or JSON null resolves to absent, and every check kind fails on an
//! absent value with a message that says so. Checks are evaluated
//! independently and side-effect-free; evaluation order never changes a
//! result.

use regex::RegexBuilder;
use serde_json::Value;

use warden_contracts::rule::{Check, CheckKind};

/// Resolve a dotted field path against a JSON value.
///
/// Returns `None` when any segment is missing or the value is JSON null.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

/// Run one check against an argument object.
///
/// Returns `Some(message)` describing the violation, or `None` when the
/// check is satisfied. A check's own `message` replaces the generated text.
pub fn run_check(arguments: &Value, check: &Check) -> Option<String> {
    evaluate_kind(arguments, check)
        .map(|generated| check.message.clone().unwrap_or(generated))
}

fn evaluate_kind(arguments: &Value, check: &Check) -> Option<String> {
    let path = &check.field_path;
    let resolved = resolve_path(arguments, path);

    match &check.kind {
        CheckKind::RegexMatch {
            pattern,
            case_insensitive,
            must_match,
        } => {
            let Some(value) = resolved else {
                return Some(format!("field '{path}' is missing"));
            };
            let Some(text) = value.as_str() else {
                return Some(format!("field '{path}' is not a string"));
            };
            let regex = match RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
            {
                Ok(r) => r,
                // Patterns are validated at compile time; fail closed if an
                // invalid one ever reaches evaluation.
                Err(e) => {
                    return Some(format!(
                        "field '{path}' could not be checked: invalid pattern: {e}"
                    ))
                }
            };
            if *must_match {
                if regex.is_match(text) {
                    None
                } else {
                    Some(format!(
                        "field '{path}' value '{text}' does not match required pattern '{pattern}'"
                    ))
                }
            } else {
                let hits: Vec<&str> = regex.find_iter(text).map(|m| m.as_str()).collect();
                if hits.is_empty() {
                    None
                } else {
                    Some(format!(
                        "field '{path}' value '{text}' contains forbidden term(s): {}",
                        hits.join(", ")
                    ))
                }
            }
        }

        CheckKind::NoWhitespace => {
            let Some(value) = resolved else {
                return Some(format!("field '{path}' is missing"));
            };
            let Some(text) = value.as_str() else {
                return Some(format!("field '{path}' is not a string"));
            };
            if text.chars().any(char::is_whitespace) {
                Some(format!("field '{path}' must not contain whitespace"))
            } else {
                None
            }
        }

        CheckKind::ValueInAllowedSet { allowed } => {
            let Some(value) = resolved else {
                return Some(format!("field '{path}' is missing"));
            };
            let Some(text) = scalar_to_string(value) else {
                return Some(format!("field '{path}' is not a comparable scalar value"));
            };
            if allowed.iter().any(|candidate| candidate == &text) {
                None
            } else {
                Some(format!(
                    "field '{path}' value '{text}' is not in the allowed set [{}]",
                    allowed.join(", ")
                ))
            }
        }

        CheckKind::RequiredKeysPresent { keys } => {
            let Some(value) = resolved else {
                return Some(format!("field '{path}' is missing"));
            };
            let Some(map) = value.as_object() else {
                return Some(format!("field '{path}' is not an object"));
            };
            let missing: Vec<&str> = keys
                .iter()
                .filter(|key| !map.contains_key(key.as_str()))
                .map(|key| key.as_str())
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(format!(
                    "field '{path}' is missing required key(s): {}",
                    missing.join(", ")
                ))
            }
        }

        CheckKind::BooleanMustBeTrue => match resolved.and_then(Value::as_bool) {
            Some(true) => None,
            Some(false) => Some(format!("field '{path}' must be true")),
            None => Some(format!("field '{path}' is missing or not a boolean")),
        },

        CheckKind::FieldMustBePresent => match resolved {
            None => Some(format!("field '{path}' must be present")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Some(format!("field '{path}' must not be empty"))
            }
            Some(_) => None,
        },

        CheckKind::Equals { expected } => match resolved {
            Some(actual) if actual == expected => None,
            Some(actual) => Some(format!(
                "field '{path}' value {actual} does not equal expected {expected}"
            )),
            None => Some(format!("field '{path}' is missing")),
        },

        CheckKind::NotEquals { expected } => match resolved {
            Some(actual) if actual != expected => None,
            Some(_) => Some(format!("field '{path}' must not equal {expected}")),
            None => Some(format!("field '{path}' is missing")),
        },
    }
}

/// Coerce a scalar JSON value to its string form for set comparison.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use warden_contracts::rule::{Check, CheckKind};

    use super::{resolve_path, run_check};

    fn check(path: &str, kind: CheckKind) -> Check {
        Check {
            field_path: path.to_string(),
            kind,
            message: None,
        }
    }

    // ── Path resolution ──────────────────────────────────────────────────────

    #[test]
    fn resolves_nested_paths() {
        let args = json!({ "tags": { "owner": "alice" } });
        assert_eq!(resolve_path(&args, "tags.owner"), Some(&json!("alice")));
    }

    #[test]
    fn missing_intermediate_resolves_to_absent() {
        let args = json!({ "name": "rg" });
        assert!(resolve_path(&args, "tags.owner").is_none());
        assert!(resolve_path(&args, "a.b.c").is_none());
    }

    #[test]
    fn null_resolves_to_absent() {
        let args = json!({ "location": null });
        assert!(resolve_path(&args, "location").is_none());
    }

    // ── RegexMatch ───────────────────────────────────────────────────────────

    #[test]
    fn regex_must_match_passes_and_fails() {
        let c = check(
            "name",
            CheckKind::RegexMatch {
                pattern: "^[a-z-]+$".to_string(),
                case_insensitive: false,
                must_match: true,
            },
        );
        assert!(run_check(&json!({ "name": "my-rg" }), &c).is_none());
        let violation = run_check(&json!({ "name": "My RG" }), &c).unwrap();
        assert!(violation.contains("does not match"));
    }

    #[test]
    fn forbidden_regex_names_the_matched_terms() {
        let c = check(
            "name",
            CheckKind::RegexMatch {
                pattern: "(?:prod\\-legacy|classic)".to_string(),
                case_insensitive: true,
                must_match: false,
            },
        );
        assert!(run_check(&json!({ "name": "fresh-rg" }), &c).is_none());
        let violation = run_check(&json!({ "name": "PROD-LEGACY-test" }), &c).unwrap();
        assert!(violation.contains("PROD-LEGACY"), "got: {violation}");
    }

    #[test]
    fn regex_on_non_string_fails() {
        let c = check(
            "name",
            CheckKind::RegexMatch {
                pattern: ".*".to_string(),
                case_insensitive: false,
                must_match: true,
            },
        );
        assert!(run_check(&json!({ "name": 42 }), &c).unwrap().contains("not a string"));
        assert!(run_check(&json!({}), &c).unwrap().contains("missing"));
    }

    // ── NoWhitespace ─────────────────────────────────────────────────────────

    #[test]
    fn no_whitespace_rejects_spaces() {
        let c = check("name", CheckKind::NoWhitespace);
        assert!(run_check(&json!({ "name": "clean-name" }), &c).is_none());
        assert!(run_check(&json!({ "name": "has space" }), &c).is_some());
        assert!(run_check(&json!({ "name": "has\ttab" }), &c).is_some());
    }

    // ── ValueInAllowedSet ────────────────────────────────────────────────────

    #[test]
    fn allowed_set_compares_coerced_strings() {
        let c = check(
            "location",
            CheckKind::ValueInAllowedSet {
                allowed: vec!["eastus".to_string(), "westeurope".to_string()],
            },
        );
        assert!(run_check(&json!({ "location": "eastus" }), &c).is_none());
        let violation = run_check(&json!({ "location": "moon-base" }), &c).unwrap();
        assert!(violation.contains("moon-base"));
        assert!(violation.contains("eastus"));
    }

    #[test]
    fn allowed_set_coerces_numbers() {
        let c = check(
            "replicas",
            CheckKind::ValueInAllowedSet {
                allowed: vec!["1".to_string(), "3".to_string()],
            },
        );
        assert!(run_check(&json!({ "replicas": 3 }), &c).is_none());
        assert!(run_check(&json!({ "replicas": 2 }), &c).is_some());
    }

    // ── RequiredKeysPresent ──────────────────────────────────────────────────

    #[test]
    fn required_keys_lists_the_missing_subset() {
        let c = check(
            "tags",
            CheckKind::RequiredKeysPresent {
                keys: vec!["owner".to_string(), "env".to_string()],
            },
        );
        assert!(run_check(&json!({ "tags": { "owner": "alice", "env": "dev" } }), &c).is_none());

        let violation = run_check(&json!({ "tags": { "owner": "alice" } }), &c).unwrap();
        assert!(violation.contains("env"), "got: {violation}");
        assert!(!violation.contains("owner,"), "satisfied keys must not be listed: {violation}");
    }

    #[test]
    fn required_keys_on_non_object_fails() {
        let c = check(
            "tags",
            CheckKind::RequiredKeysPresent {
                keys: vec!["owner".to_string()],
            },
        );
        assert!(run_check(&json!({ "tags": "owner=alice" }), &c).unwrap().contains("not an object"));
        assert!(run_check(&json!({}), &c).unwrap().contains("missing"));
    }

    // ── Presence and comparisons ─────────────────────────────────────────────

    #[test]
    fn boolean_must_be_true_semantics() {
        let c = check("confirmed", CheckKind::BooleanMustBeTrue);
        assert!(run_check(&json!({ "confirmed": true }), &c).is_none());
        assert!(run_check(&json!({ "confirmed": false }), &c).is_some());
        assert!(run_check(&json!({ "confirmed": "true" }), &c).is_some());
        assert!(run_check(&json!({}), &c).is_some());
    }

    #[test]
    fn field_must_be_present_treats_blank_strings_as_absent() {
        let c = check("description", CheckKind::FieldMustBePresent);
        assert!(run_check(&json!({ "description": "a repo" }), &c).is_none());
        assert!(run_check(&json!({ "description": "" }), &c).is_some());
        assert!(run_check(&json!({ "description": "   " }), &c).is_some());
        assert!(run_check(&json!({}), &c).is_some());
        // Non-string presence counts.
        assert!(run_check(&json!({ "description": 0 }), &c).is_none());
    }

    #[test]
    fn equals_and_not_equals() {
        let eq = check("visibility", CheckKind::Equals { expected: json!("private") });
        assert!(run_check(&json!({ "visibility": "private" }), &eq).is_none());
        assert!(run_check(&json!({ "visibility": "public" }), &eq).is_some());
        assert!(run_check(&json!({}), &eq).is_some());

        let ne = check("visibility", CheckKind::NotEquals { expected: json!("public") });
        assert!(run_check(&json!({ "visibility": "private" }), &ne).is_none());
        assert!(run_check(&json!({ "visibility": "public" }), &ne).is_some());
        // Absent fails even for not-equals: undefined is never a pass.
        assert!(run_check(&json!({}), &ne).is_some());
    }

    // ── Message override ─────────────────────────────────────────────────────

    #[test]
    fn custom_message_replaces_generated_text() {
        let c = Check {
            field_path: "name".to_string(),
            kind: CheckKind::NoWhitespace,
            message: Some("names with spaces break downstream tooling".to_string()),
        };
        let violation = run_check(&json!({ "name": "bad name" }), &c).unwrap();
        assert_eq!(violation, "names with spaces break downstream tooling");
    }
}
