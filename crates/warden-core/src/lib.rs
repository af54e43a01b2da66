//! # warden-core
//!
//! The consent-gating core for the warden engine.
//!
//! This crate provides:
//! - The four collaborator traits (`Evaluator`, `ActionRunner`,
//!   `ConsentPrompter`, `TrailWriter`)
//! - The [`ConsentGate`] state machine that wires them together so no
//!   state-changing action runs without policy approval and one explicit
//!   human acknowledgment per session
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_core::{ConsentGate, StateChangingScope};
//!
//! let mut gate = ConsentGate::new(evaluator, runner, prompter, trail,
//!     StateChangingScope::new(["azure.create", "azure.delete"]));
//! let outcome = gate.gate("azure.create_resource_group", &arguments)?;
//! ```

pub mod gate;
pub mod traits;

pub use gate::{ConsentGate, StateChangingScope};
