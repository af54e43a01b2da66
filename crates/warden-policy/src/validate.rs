//! Two-pass schema validation.
//!
//! The permissive pass (`validate_permissive`) produces the `PolicyDocument`
//! that is actually used for compilation; it accepts unknown keys silently.
//! The strict pass (`validate_strict`) exists purely to surface operator
//! typos: it validates the merged value against an embedded JSON Schema that
//! closes the key sets which are closed in practice, and it never aborts
//! loading; every finding comes back as a warning string.

use serde_json::{json, Value};
use tracing::warn;

use warden_contracts::error::WardenResult;

use crate::document::PolicyDocument;

/// Parse the merged value into a `PolicyDocument`, tolerating unknown keys.
pub fn validate_permissive(merged: &Value) -> WardenResult<PolicyDocument> {
    PolicyDocument::from_merged(merged)
}

/// The strict document schema.
///
/// Fragment and advisory-entry key sets are closed
/// (`additionalProperties: false`); provider, profile, and domain levels stay
/// open because their key sets are operator-defined.
fn strict_schema() -> Value {
    let fragment = json!({
        "type": "object",
        "properties": {
            "description": { "type": "string" },
            "banned_name_terms": { "type": "array", "items": { "type": "string" } },
            "name_pattern": { "type": "string" },
            "no_whitespace_fields": { "type": "array", "items": { "type": "string" } },
            "allowed_values": {
                "type": "object",
                "additionalProperties": { "type": "array", "items": { "type": "string" } }
            },
            "required_tags": { "type": "array", "items": { "type": "string" } },
            "required_fields": { "type": "array", "items": { "type": "string" } },
            "suggestions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "text": { "type": "string" },
                        "proposed_fix": {}
                    },
                    "required": ["text"],
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false
    });

    let advisory_check = json!({
        "type": "object",
        "properties": {
            "kind": { "type": "string" },
            "path": { "type": "string" },
            "pattern": { "type": "string" },
            "case_insensitive": { "type": "boolean" },
            "must_match": { "type": "boolean" },
            "values": { "type": "array", "items": { "type": "string" } },
            "keys": { "type": "array", "items": { "type": "string" } },
            "expected": {},
            "message": { "type": "string" }
        },
        "required": ["kind", "path"],
        "additionalProperties": false
    });

    let advisory_rule = json!({
        "type": "object",
        "properties": {
            "description": { "type": "string" },
            "applies_to": { "type": "string" },
            "control_ids": { "type": "array", "items": { "type": "string" } },
            "suggestion": { "type": "string" },
            "checks": { "type": "array", "items": advisory_check }
        },
        "required": ["applies_to"],
        "additionalProperties": false
    });

    json!({
        "type": "object",
        "properties": {
            "advisory": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "object",
                        "additionalProperties": advisory_rule
                    }
                }
            }
        },
        "additionalProperties": {
            "type": "object",
            "additionalProperties": fragment
        }
    })
}

/// Validate the merged value against the strict schema, returning one
/// warning per violation.
///
/// Never fails: a strict schema that cannot be compiled is itself reported
/// as a single warning, because the strict pass must not be able to take
/// down loading.
pub fn validate_strict(merged: &Value) -> Vec<String> {
    let schema = strict_schema();
    match jsonschema::validator_for(&schema) {
        Ok(validator) => validator
            .iter_errors(merged)
            .map(|error| {
                let message = format!(
                    "unsupported or misspelled policy key at {}: {}",
                    error.instance_path, error
                );
                warn!(%message, "strict schema warning");
                message
            })
            .collect(),
        Err(e) => {
            let message = format!("strict policy schema failed to compile: {e}");
            warn!(%message, "strict schema unavailable");
            vec![message]
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{validate_permissive, validate_strict};

    #[test]
    fn clean_document_produces_no_warnings() {
        let merged = json!({
            "azure": {
                "create_resource_group": {
                    "banned_name_terms": ["prod-legacy"],
                    "required_tags": ["owner", "env"],
                    "allowed_values": { "location": ["eastus"] }
                }
            },
            "advisory": {
                "baseline": {
                    "tagging": {
                        "adv-cost-center": {
                            "applies_to": "azure",
                            "control_ids": ["FIN-TAG-02"],
                            "checks": [
                                { "kind": "required-keys-present", "path": "tags", "keys": ["costCenter"] }
                            ]
                        }
                    }
                }
            }
        });

        assert!(validate_strict(&merged).is_empty());
        assert!(validate_permissive(&merged).is_ok());
    }

    #[test]
    fn misspelled_fragment_key_warns_but_still_parses() {
        let merged = json!({
            "azure": {
                "create_resource_group": {
                    "requird_tags": ["owner"],
                    "banned_name_terms": ["classic"]
                }
            }
        });

        let warnings = validate_strict(&merged);
        assert!(
            warnings.iter().any(|w| w.contains("requird_tags") || w.contains("create_resource_group")),
            "expected a warning naming the typo location, got: {warnings:?}"
        );

        // The permissive pass still accepts the document.
        let doc = validate_permissive(&merged).unwrap();
        assert_eq!(
            doc.providers["azure"]["create_resource_group"].banned_name_terms,
            vec!["classic"]
        );
    }

    #[test]
    fn unknown_advisory_entry_key_warns() {
        let merged = json!({
            "advisory": {
                "baseline": {
                    "naming": {
                        "adv-x": {
                            "applies_to": "azure",
                            "sugestion": "typo'd key"
                        }
                    }
                }
            }
        });

        let warnings = validate_strict(&merged);
        assert!(!warnings.is_empty());
    }

    #[test]
    fn strict_pass_never_reports_on_empty_document() {
        assert!(validate_strict(&json!({})).is_empty());
    }
}
