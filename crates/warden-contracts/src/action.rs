//! Action identity types.
//!
//! An action is a namespaced operation name plus a JSON argument object,
//! e.g. `azure.create_resource_group` with `{"name": ..., "location": ...}`.
//! The namespace is the part of the name before the first `.` and is what
//! namespace-targeted rules match on.

use serde::{Deserialize, Serialize};

/// Unique identifier for one conversation session.
///
/// Consent state and the session trail are both scoped to this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Create a new, unique session ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One planned action submitted for evaluation or gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Namespaced action name, e.g. "azure.create_resource_group".
    pub action: String,
    /// The call's argument object. Checks resolve field paths against this.
    pub arguments: serde_json::Value,
    /// Optional caller-supplied context (conversation id, plan step, ...).
    /// Carried for callers and logging; rules never inspect it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ActionRequest {
    /// Build a request with no context.
    pub fn new(action: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            arguments,
            context: None,
        }
    }
}

/// Return the namespace segment of an action name: the part before the
/// first `.`, or the whole name when there is no separator.
pub fn namespace_of(action: &str) -> &str {
    action.split('.').next().unwrap_or(action)
}
