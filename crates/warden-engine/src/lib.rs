//! # warden-engine
//!
//! Check evaluation, decision aggregation, and the reloadable rule set for
//! the warden gating engine.
//!
//! ## Overview
//!
//! [`DecisionEngine`] implements the
//! [`warden_core::traits::Evaluator`] seam over an atomically swappable
//! [`ruleset::RuleSetHandle`]. Evaluation selects every compiled rule whose
//! target matches the action, runs all of each rule's checks, and folds the
//! outcomes into one `Decision` with severity precedence, aggregated
//! reasons, suggestions, and compliance-control ids.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use warden_engine::DecisionEngine;
//!
//! let (engine, summary) = DecisionEngine::from_paths(&[policy_dir])?;
//! let decision = engine.evaluate(&ActionRequest::new(
//!     "azure.create_resource_group",
//!     serde_json::json!({ "name": "rg-app", "tags": { "owner": "sre" } }),
//! ));
//! ```

pub mod checks;
pub mod engine;
pub mod ruleset;

pub use engine::DecisionEngine;
pub use ruleset::{ReloadSummary, RuleSet, RuleSetHandle};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use warden_contracts::{action::ActionRequest, decision::Verdict};

    use crate::DecisionEngine;

    const POLICY: &str = r#"
[azure.create_resource_group]
banned_name_terms = ["prod-legacy"]
required_tags = ["owner", "env"]

[advisory.baseline.tagging.adv-cost-center]
applies_to = "azure"
control_ids = ["FIN-TAG-02"]
suggestion = "Add a 'costCenter' tag so spend can be attributed."

[[advisory.baseline.tagging.adv-cost-center.checks]]
kind = "required-keys-present"
path = "tags"
keys = ["costCenter"]
"#;

    fn engine_from(policy: &str) -> DecisionEngine {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00-policy.toml"), policy).unwrap();
        let (engine, _) = DecisionEngine::from_paths(&[dir.path().to_path_buf()]).unwrap();
        engine
    }

    /// Full pipeline: a banned name both denies (hard constraint) and the
    /// advisory warning's control id rides along in the same decision.
    #[test]
    fn evaluate_end_to_end_from_toml() {
        let engine = engine_from(POLICY);

        let decision = engine.evaluate(&ActionRequest::new(
            "azure.create_resource_group",
            json!({ "name": "prod-legacy-app", "tags": { "owner": "sre" } }),
        ));

        assert_eq!(decision.verdict, Verdict::Deny);
        assert!(decision.reasons.iter().any(|r| r.contains("prod-legacy")));
        assert!(decision.reasons.iter().any(|r| r.contains("env")));
        assert!(decision.control_ids.contains(&"FIN-TAG-02".to_string()));
        assert!(!decision.suggestions.is_empty());
    }

    /// Compliant arguments against the same policy only warn (the advisory
    /// costCenter check), never deny.
    #[test]
    fn compliant_input_warns_from_advisory_only() {
        let engine = engine_from(POLICY);

        let decision = engine.evaluate(&ActionRequest::new(
            "azure.create_resource_group",
            json!({
                "name": "rg-app",
                "tags": { "owner": "sre", "env": "dev", "costCenter": "1234" }
            }),
        ));

        assert_eq!(decision.verdict, Verdict::Allow);
        assert!(decision.reasons[0].contains("satisfied"));
    }

    /// Reload swaps behavior atomically: the same engine handle serves the
    /// new rules after a successful reload.
    #[test]
    fn reload_changes_served_rules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("00-policy.toml"),
            "[azure.create_resource_group]\nbanned_name_terms = [\"prod-legacy\"]\n",
        )
        .unwrap();
        let (engine, summary) = DecisionEngine::from_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(summary.rule_count, 1);

        let req = ActionRequest::new(
            "azure.create_resource_group",
            json!({ "name": "prod-legacy-app" }),
        );
        assert_eq!(engine.evaluate(&req).verdict, Verdict::Deny);

        fs::write(
            dir.path().join("00-policy.toml"),
            "[azure.create_resource_group]\nbanned_name_terms = [\"something-else\"]\n",
        )
        .unwrap();
        engine.reload(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(engine.evaluate(&req).verdict, Verdict::Allow);
    }
}
