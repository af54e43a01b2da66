//! The active compiled rule set and its atomic reload.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::info;

use warden_contracts::{error::WardenResult, rule::Rule};

/// An immutable compiled rule set.
#[derive(Debug, Default)]
pub struct RuleSet {
    /// Rules in compiled (deterministic) order.
    pub rules: Vec<Rule>,
}

/// Shared, atomically swappable handle to the active rule set.
///
/// Readers take a cheap `Arc` clone of the current set and keep evaluating
/// against it even while a reload publishes a replacement. A half-built set
/// is never visible: `publish` swaps in a fully constructed value.
///
/// The handle is injectable: the engine's constructor takes one, so hosts
/// and tests own the rule set's lifecycle explicitly instead of sharing a
/// hidden process-wide singleton.
#[derive(Clone, Default)]
pub struct RuleSetHandle {
    inner: Arc<RwLock<Arc<RuleSet>>>,
}

impl RuleSetHandle {
    /// A handle starting with the given rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(RuleSet { rules }))),
        }
    }

    /// Snapshot the currently published rule set.
    pub fn current(&self) -> Arc<RuleSet> {
        self.inner.read().expect("rule set lock poisoned").clone()
    }

    /// Atomically replace the published rule set.
    pub fn publish(&self, set: RuleSet) {
        *self.inner.write().expect("rule set lock poisoned") = Arc::new(set);
    }
}

/// Summary of a successful reload.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    /// Number of rules in the newly published set.
    pub rule_count: usize,
    /// Non-fatal findings from the load: skipped paths and strict-schema
    /// warnings.
    pub warnings: Vec<String>,
}

/// Load → validate → compile the documents at `paths`, then publish.
///
/// All-or-nothing: any error returns before `publish`, leaving the
/// previously active rule set serving evaluations.
pub fn reload(handle: &RuleSetHandle, paths: &[PathBuf]) -> WardenResult<ReloadSummary> {
    let (rules, warnings) = warden_policy::load_rules(paths)?;
    let rule_count = rules.len();
    handle.publish(RuleSet { rules });
    info!(rule_count, warning_count = warnings.len(), "rule set published");
    Ok(ReloadSummary {
        rule_count,
        warnings,
    })
}
