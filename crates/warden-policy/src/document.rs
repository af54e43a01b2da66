//! Policy document model and permissive extraction.
//!
//! A `PolicyDocument` is the merged, in-memory form of one or more TOML
//! policy files. The top level maps provider namespaces (e.g. `azure`,
//! `github`) to per-action-kind fragments, plus an `advisory` section
//! organized as `profile -> domain -> rule-code -> entry`.
//!
//! Extraction is deliberately permissive: unknown keys land in opaque bags
//! instead of failing, so an operator typo never takes the gating system
//! down. The strict warning pass (`validate::validate_strict`) is what
//! surfaces those typos. A wrong *type* on a known key is still fatal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use warden_contracts::error::{WardenError, WardenResult};

/// A suggestion entry as authored in a policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionSpec {
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    #[serde(default)]
    pub proposed_fix: Option<Value>,
}

/// One per-action-kind policy fragment under a provider table.
///
/// Every field is a policy intent the compiler knows how to lower into
/// rules; anything else is preserved in `extra` for the strict pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionFragment {
    /// Optional operator-facing description, reused in rule descriptions.
    pub description: Option<String>,
    /// Terms that must not appear (case-insensitively) in the `name`
    /// argument. Compiles to a single alternation-regex deny rule.
    pub banned_name_terms: Vec<String>,
    /// Regex the `name` argument must match.
    pub name_pattern: Option<String>,
    /// Field paths whose string values must not contain whitespace.
    pub no_whitespace_fields: Vec<String>,
    /// Per-field allow-lists: field path → permitted values.
    pub allowed_values: BTreeMap<String, Vec<String>>,
    /// Keys that must be present in the `tags` argument object.
    pub required_tags: Vec<String>,
    /// Field paths that must be present and non-empty.
    pub required_fields: Vec<String>,
    /// Advisory suggestions, attached as one warn rule with no checks.
    pub suggestions: Vec<SuggestionSpec>,
    /// Unrecognized keys, preserved for the strict warning pass.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One advisory check entry: an explicit kind/path/parameter triple.
///
/// `kind` is a free string here; the compiler maps known kebab-case kinds
/// onto `CheckKind` and skips anything it does not recognize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryCheckSpec {
    /// Kebab-case check kind, e.g. "regex-match", "required-keys-present".
    pub kind: String,
    /// Dot-separated field path into the action's arguments.
    pub path: String,
    pub pattern: Option<String>,
    pub case_insensitive: bool,
    pub must_match: Option<bool>,
    pub values: Vec<String>,
    pub keys: Vec<String>,
    pub expected: Option<Value>,
    /// Optional message overriding the generated violation text.
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One advisory rule entry under `advisory.{profile}.{domain}.{code}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryRule {
    pub description: Option<String>,
    /// Target: an exact action name when it contains `.`, otherwise a
    /// provider namespace.
    pub applies_to: String,
    /// Compliance-control identifiers carried into decisions.
    pub control_ids: Vec<String>,
    /// Remediation text attached as a suggestion.
    pub suggestion: Option<String>,
    pub checks: Vec<AdvisoryCheckSpec>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `profile -> domain -> rule-code -> entry`.
pub type AdvisorySection = BTreeMap<String, BTreeMap<String, BTreeMap<String, AdvisoryRule>>>;

/// The merged, validated policy configuration.
#[derive(Debug, Clone, Default)]
pub struct PolicyDocument {
    /// Provider namespace → action kind → fragment. The compiled target
    /// action name is `{provider}.{kind}`; the kind `"*"` targets the whole
    /// provider namespace.
    pub providers: BTreeMap<String, BTreeMap<String, ActionFragment>>,
    /// Advisory section.
    pub advisory: AdvisorySection,
    /// Top-level and provider-level values that were not recognizable as
    /// tables, keyed by their dotted location.
    pub opaque: BTreeMap<String, Value>,
}

impl PolicyDocument {
    /// Permissively extract a document from a merged JSON value.
    ///
    /// Unknown keys are preserved; a wrong type on a known key is a fatal
    /// `ConfigParse`. See `validate::validate_strict` for the non-fatal pass
    /// that turns the preserved unknowns into warnings.
    pub fn from_merged(merged: &Value) -> WardenResult<Self> {
        let top = match merged {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(WardenError::ConfigParse {
                    reason: format!(
                        "policy document root must be a table, got {}",
                        json_type_name(other)
                    ),
                })
            }
        };

        let mut doc = Self::default();
        for (key, value) in top {
            if key == "advisory" {
                doc.advisory = parse_advisory(value)?;
                continue;
            }
            match value {
                Value::Object(kinds) => {
                    let mut fragments = BTreeMap::new();
                    for (kind, frag_value) in kinds {
                        if frag_value.is_object() {
                            let fragment: ActionFragment =
                                serde_json::from_value(frag_value.clone()).map_err(|e| {
                                    WardenError::ConfigParse {
                                        reason: format!("invalid fragment '{key}.{kind}': {e}"),
                                    }
                                })?;
                            fragments.insert(kind.clone(), fragment);
                        } else {
                            // A scalar directly under a provider table is not
                            // a fragment; keep it for the strict pass.
                            doc.opaque.insert(format!("{key}.{kind}"), frag_value.clone());
                        }
                    }
                    doc.providers.insert(key.clone(), fragments);
                }
                other => {
                    doc.opaque.insert(key.clone(), other.clone());
                }
            }
        }
        Ok(doc)
    }
}

fn parse_advisory(value: &Value) -> WardenResult<AdvisorySection> {
    serde_json::from_value(value.clone()).map_err(|e| WardenError::ConfigParse {
        reason: format!("invalid advisory section: {e}"),
    })
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}
