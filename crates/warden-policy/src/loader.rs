//! Policy source loading and deep merge.
//!
//! `load_merged` reads one or more TOML documents and folds them into a
//! single JSON value. A directory contributes its `*.toml` entries in
//! lexicographic filename order, so override files sort after the documents
//! they override (the shipped samples use numeric prefixes for this).
//! Missing paths are skipped and reported as warnings, never errors.
//!
//! Merge semantics per value pair (earlier `a`, later `b`):
//! - table + table → merge key-wise, recursing
//! - array + array → `b` replaces `a` wholly (allow-lists must be fully
//!   replaceable by an override document, not concatenated)
//! - array + existing non-array → fatal `MergeConflict`
//! - anything else → `b` wins

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use warden_contracts::error::{WardenError, WardenResult};

/// Expand `paths` into concrete TOML files plus warnings for skipped paths.
///
/// Directory entries are sorted by filename so merge order is deterministic.
fn expand_paths(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<String>) {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = match fs::read_dir(path) {
                Ok(read_dir) => read_dir
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|p| p.extension().map(|ext| ext == "toml").unwrap_or(false))
                    .collect(),
                Err(e) => {
                    warnings.push(format!(
                        "policy directory '{}' unreadable: {}",
                        path.display(),
                        e
                    ));
                    continue;
                }
            };
            entries.sort();
            files.extend(entries);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            warnings.push(
                WardenError::ConfigNotFound {
                    path: path.display().to_string(),
                }
                .to_string(),
            );
        }
    }

    (files, warnings)
}

/// Read one TOML document and convert it to a JSON value.
fn read_document(path: &Path) -> WardenResult<Value> {
    let contents = fs::read_to_string(path).map_err(|e| WardenError::ConfigParse {
        reason: format!("failed to read policy file '{}': {}", path.display(), e),
    })?;
    let parsed: toml::Value = toml::from_str(&contents).map_err(|e| WardenError::ConfigParse {
        reason: format!("failed to parse policy TOML '{}': {}", path.display(), e),
    })?;
    serde_json::to_value(parsed).map_err(|e| WardenError::ConfigParse {
        reason: format!(
            "failed to convert policy file '{}' to JSON: {}",
            path.display(),
            e
        ),
    })
}

/// Deep-merge `overlay` into `base`.
///
/// `path` names the current location for `MergeConflict` messages (empty at
/// the root). Merging nothing leaves `base` untouched, so folding a single
/// document over an empty table reproduces that document exactly.
pub fn deep_merge(base: &mut Value, overlay: Value, path: &str) -> WardenResult<()> {
    match overlay {
        Value::Object(overlay_map) => {
            if let Value::Object(base_map) = base {
                for (key, value) in overlay_map {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    match base_map.get_mut(&key) {
                        Some(existing) => deep_merge(existing, value, &child)?,
                        None => {
                            base_map.insert(key, value);
                        }
                    }
                }
            } else {
                *base = Value::Object(overlay_map);
            }
            Ok(())
        }
        Value::Array(items) => {
            if base.is_array() || base.is_null() {
                *base = Value::Array(items);
                Ok(())
            } else {
                Err(WardenError::MergeConflict {
                    path: path.to_string(),
                    reason: "cannot merge an array into a non-array value".to_string(),
                })
            }
        }
        other => {
            *base = other;
            Ok(())
        }
    }
}

/// Load and fold every document reachable from `paths` into one merged
/// value, returning it together with non-fatal warnings.
///
/// Zero readable documents is not an error: it yields an empty table (and
/// therefore an empty rule set downstream).
pub fn load_merged(paths: &[PathBuf]) -> WardenResult<(Value, Vec<String>)> {
    let (files, warnings) = expand_paths(paths);

    if files.is_empty() {
        warn!("no policy documents found; the rule set will be empty");
    }

    let mut merged = Value::Object(serde_json::Map::new());
    for file in &files {
        debug!(path = %file.display(), "loading policy document");
        let document = read_document(file)?;
        deep_merge(&mut merged, document, "")?;
    }

    Ok((merged, warnings))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use serde_json::json;

    use super::{deep_merge, load_merged};

    // ── deep_merge semantics ─────────────────────────────────────────────────

    #[test]
    fn merge_recurses_through_tables() {
        let mut base = json!({
            "azure": {
                "create_resource_group": { "required_tags": ["owner"] },
                "create_storage_account": { "name_pattern": "^[a-z0-9]+$" }
            }
        });
        let overlay = json!({
            "azure": {
                "create_resource_group": { "name_pattern": "^[a-z-]+$" }
            }
        });

        deep_merge(&mut base, overlay, "").unwrap();

        // Sibling fragments survive; the overlaid fragment gains the new key.
        assert_eq!(
            base["azure"]["create_resource_group"]["required_tags"],
            json!(["owner"])
        );
        assert_eq!(
            base["azure"]["create_resource_group"]["name_pattern"],
            json!("^[a-z-]+$")
        );
        assert_eq!(
            base["azure"]["create_storage_account"]["name_pattern"],
            json!("^[a-z0-9]+$")
        );
    }

    #[test]
    fn later_array_replaces_earlier_array_wholly() {
        let mut base = json!({ "terms": ["a", "b", "c"] });
        deep_merge(&mut base, json!({ "terms": ["x"] }), "").unwrap();
        // Replacement, not concatenation: allow-lists must be overridable.
        assert_eq!(base["terms"], json!(["x"]));
    }

    #[test]
    fn later_scalar_wins_over_earlier_scalar() {
        let mut base = json!({ "limit": 10 });
        deep_merge(&mut base, json!({ "limit": 20 }), "").unwrap();
        assert_eq!(base["limit"], json!(20));
    }

    #[test]
    fn merging_nothing_leaves_base_unchanged() {
        let mut base = json!({ "azure": { "create_resource_group": { "required_tags": ["owner"] } } });
        let snapshot = base.clone();
        deep_merge(&mut base, json!({}), "").unwrap();
        assert_eq!(base, snapshot);
    }

    #[test]
    fn array_into_non_array_is_a_conflict() {
        let mut base = json!({ "azure": { "region": "eastus" } });
        let err = deep_merge(&mut base, json!({ "azure": { "region": ["eastus"] } }), "")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("merge conflict"), "got: {msg}");
        assert!(msg.contains("azure.region"), "conflict path missing: {msg}");
    }

    #[test]
    fn array_into_table_is_a_conflict() {
        let mut base = json!({ "azure": { "create_resource_group": {} } });
        let result = deep_merge(
            &mut base,
            json!({ "azure": { "create_resource_group": ["nope"] } }),
            "",
        );
        assert!(result.is_err());
    }

    // ── file loading ─────────────────────────────────────────────────────────

    #[test]
    fn directory_merges_in_lexicographic_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order on purpose; the loader must sort by name.
        fs::write(
            dir.path().join("10-override.toml"),
            "[azure.create_resource_group]\nbanned_name_terms = [\"classic\"]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("00-base.toml"),
            "[azure.create_resource_group]\nbanned_name_terms = [\"prod-legacy\", \"old\"]\nrequired_tags = [\"owner\"]\n",
        )
        .unwrap();

        let (merged, warnings) = load_merged(&[dir.path().to_path_buf()]).unwrap();

        assert!(warnings.is_empty());
        // The 10- file sorts after the 00- file and replaces the array wholly.
        assert_eq!(
            merged["azure"]["create_resource_group"]["banned_name_terms"],
            json!(["classic"])
        );
        // Keys only present in the earlier file survive the merge.
        assert_eq!(
            merged["azure"]["create_resource_group"]["required_tags"],
            json!(["owner"])
        );
    }

    #[test]
    fn missing_path_is_a_warning_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00-base.toml"), "[azure.create_resource_group]\n").unwrap();

        let missing = PathBuf::from("/definitely/not/a/real/policy/dir");
        let (merged, warnings) =
            load_merged(&[missing.clone(), dir.path().to_path_buf()]).unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not found"));
        assert!(merged["azure"]["create_resource_group"].is_object());
    }

    #[test]
    fn zero_documents_yield_an_empty_table() {
        let (merged, warnings) =
            load_merged(&[PathBuf::from("/nowhere/at/all")]).unwrap();
        assert_eq!(merged, json!({}));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn malformed_toml_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.toml"), "this is not ][[ valid toml").unwrap();

        let err = load_merged(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
