//! # warden-policy
//!
//! Declarative policy documents for the warden gating engine: loading,
//! merging, validation, and rule compilation.
//!
//! ## Overview
//!
//! Policy is authored as one or more TOML documents, conventionally a
//! hard-constraint document plus an advisory document, merged in filename
//! order. The pipeline is:
//!
//! 1. [`loader::load_merged`]: read and deep-merge the documents.
//! 2. [`validate::validate_strict`]: collect typo warnings (never fatal).
//! 3. [`validate::validate_permissive`]: produce the [`document::PolicyDocument`].
//! 4. [`compiler::compile`]: lower policy intents into flat
//!    [`warden_contracts::rule::Rule`]s.
//!
//! [`load_rules`] runs the whole pipeline. Any error leaves nothing
//! published; callers keep whatever rule set they already had.

pub mod compiler;
pub mod document;
pub mod loader;
pub mod validate;

use std::path::PathBuf;

use warden_contracts::{error::WardenResult, rule::Rule};

/// Load, merge, validate, and compile everything reachable from `paths`.
///
/// Returns the compiled rules plus all non-fatal warnings (skipped paths and
/// strict-schema findings), in that order.
pub fn load_rules(paths: &[PathBuf]) -> WardenResult<(Vec<Rule>, Vec<String>)> {
    let (merged, mut warnings) = loader::load_merged(paths)?;
    warnings.extend(validate::validate_strict(&merged));
    let doc = validate::validate_permissive(&merged)?;
    let rules = compiler::compile(&doc)?;
    Ok((rules, warnings))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
