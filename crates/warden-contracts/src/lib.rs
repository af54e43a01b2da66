//! # warden-contracts
//!
//! Shared types, verdicts, and contracts for the warden gating engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, small value-type methods, and error
//! types.

pub mod action;
pub mod consent;
pub mod decision;
pub mod error;
pub mod gate;
pub mod rule;

#[cfg(test)]
mod tests {
    use super::*;
    use action::namespace_of;
    use consent::{ConsentMode, ConsentState};
    use decision::{Decision, Verdict};
    use error::WardenError;
    use gate::GateStatus;
    use rule::RuleTarget;

    // ── Verdict ordering ─────────────────────────────────────────────────────

    #[test]
    fn verdict_severity_ordering() {
        // Severity folding relies on this total order.
        assert!(Verdict::Allow < Verdict::Warn);
        assert!(Verdict::Warn < Verdict::Deny);
        assert_eq!(Verdict::Warn.max(Verdict::Deny), Verdict::Deny);
        assert_eq!(Verdict::Allow.max(Verdict::Warn), Verdict::Warn);
    }

    #[test]
    fn verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Allow).unwrap(), "\"allow\"");
        assert_eq!(serde_json::to_string(&Verdict::Warn).unwrap(), "\"warn\"");
        assert_eq!(serde_json::to_string(&Verdict::Deny).unwrap(), "\"deny\"");
    }

    // ── Decision ─────────────────────────────────────────────────────────────

    #[test]
    fn decision_round_trips() {
        let original = Decision {
            verdict: Verdict::Deny,
            reasons: vec!["name contains a banned term".to_string()],
            matched_rule_ids: vec!["azure.create_resource_group/name-deny-list".to_string()],
            suggestions: vec![decision::Suggestion::text_only("rename the resource")],
            control_ids: vec!["CAF-NAME-01".to_string()],
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn deny_does_not_permit_execution() {
        let mut d = Decision::allow("fine");
        assert!(d.permits_execution());
        d.verdict = Verdict::Warn;
        assert!(d.permits_execution());
        d.verdict = Verdict::Deny;
        assert!(!d.permits_execution());
    }

    // ── Namespaces and targets ───────────────────────────────────────────────

    #[test]
    fn namespace_is_segment_before_first_dot() {
        assert_eq!(namespace_of("azure.create_resource_group"), "azure");
        assert_eq!(namespace_of("github.repos.create"), "github");
        assert_eq!(namespace_of("standalone"), "standalone");
    }

    #[test]
    fn action_target_matches_exact_name_only() {
        let target = RuleTarget::Action("azure.create_resource_group".to_string());
        assert!(target.matches("azure.create_resource_group"));
        assert!(!target.matches("azure.create_storage_account"));
        assert!(!target.matches("azure"));
    }

    #[test]
    fn namespace_target_matches_whole_provider() {
        let target = RuleTarget::Namespace("azure".to_string());
        assert!(target.matches("azure.create_resource_group"));
        assert!(target.matches("azure.delete_resource_group"));
        assert!(!target.matches("github.create_repo"));
        // A bare name equal to the namespace is inside the namespace.
        assert!(target.matches("azure"));
    }

    // ── Consent parsing and latch ────────────────────────────────────────────

    #[test]
    fn consent_response_parsing_table() {
        assert_eq!(ConsentMode::parse_response("yes"), Some(ConsentMode::Execute));
        assert_eq!(ConsentMode::parse_response(" Y "), Some(ConsentMode::Execute));
        assert_eq!(ConsentMode::parse_response("dry run"), Some(ConsentMode::Simulate));
        assert_eq!(ConsentMode::parse_response("DRY-RUN"), Some(ConsentMode::Simulate));
        assert_eq!(ConsentMode::parse_response("simulate"), Some(ConsentMode::Simulate));
        assert_eq!(ConsentMode::parse_response("no"), Some(ConsentMode::Deny));
        assert_eq!(ConsentMode::parse_response("cancel"), Some(ConsentMode::Deny));
        assert_eq!(ConsentMode::parse_response("maybe"), None);
        assert_eq!(ConsentMode::parse_response(""), None);
    }

    #[test]
    fn consent_state_latches_on_record() {
        let mut state = ConsentState::new();
        assert!(!state.asked_once);
        assert!(!state.is_decided());

        state.record(ConsentMode::Simulate);
        assert!(state.asked_once);
        assert!(state.is_decided());
        assert_eq!(state.mode, ConsentMode::Simulate);
    }

    // ── GateStatus serde ─────────────────────────────────────────────────────

    #[test]
    fn gate_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GateStatus::Executed).unwrap(), "\"executed\"");
        assert_eq!(serde_json::to_string(&GateStatus::Simulated).unwrap(), "\"simulated\"");
        assert_eq!(serde_json::to_string(&GateStatus::Blocked).unwrap(), "\"blocked\"");
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn error_merge_conflict_display() {
        let err = WardenError::MergeConflict {
            path: "azure.create_resource_group.required_tags".to_string(),
            reason: "cannot merge an array into a non-array value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("merge conflict"));
        assert!(msg.contains("required_tags"));
    }

    #[test]
    fn error_config_parse_display() {
        let err = WardenError::ConfigParse {
            reason: "invalid fragment 'azure.create_resource_group'".to_string(),
        };
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn error_action_failed_display() {
        let err = WardenError::ActionFailed {
            action: "azure.create_resource_group".to_string(),
            reason: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("azure.create_resource_group"));
        assert!(msg.contains("quota exceeded"));
    }
}
