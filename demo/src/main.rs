//! warden demo: policy evaluation and consent gate CLI
//!
//! Exercises the full pipeline (loader → validator → compiler → decision
//! engine → consent gate → session trail) against the documents in the
//! policy directory.
//!
//! Usage:
//!   cargo run -p demo -- lint
//!   cargo run -p demo -- evaluate --action azure.create_resource_group \
//!       --arguments '{"name":"prod-legacy-app"}'
//!   cargo run -p demo -- session
//!
//! The policy directory comes from `--policy-dir`, then the
//! `WARDEN_POLICY_DIR` environment variable, then the relative default
//! `policies`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use warden_contracts::{
    action::{ActionRequest, SessionId},
    error::{WardenError, WardenResult},
    gate::{GateRecord, GateStatus, PendingPlan},
    rule::RuleEffect,
};
use warden_core::{
    traits::{ActionRunner, ConsentPrompter, TrailWriter},
    ConsentGate, StateChangingScope,
};
use warden_engine::DecisionEngine;
use warden_trail::InMemoryTrailWriter;

// ── CLI definition ────────────────────────────────────────────────────────────

/// warden: policy evaluation and consent gating for assistant tool calls.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "warden policy evaluation and consent gate demo",
    long_about = "Loads the declarative policy documents, compiles them into rules,\n\
                  and runs evaluations or a gated multi-step session against them."
)]
struct Cli {
    /// Policy document directory (overrides WARDEN_POLICY_DIR).
    #[arg(long, global = true)]
    policy_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate the policy documents; print rule count and warnings.
    Lint,
    /// Evaluate one action speculatively and print the decision as JSON.
    Evaluate {
        /// Namespaced action name, e.g. azure.create_resource_group.
        #[arg(long)]
        action: String,
        /// Argument object as a JSON string.
        #[arg(long, default_value = "{}")]
        arguments: String,
    },
    /// Run a scripted multi-step plan through the consent gate.
    Session,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging; set RUST_LOG=debug for verbose evaluation traces.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let paths = policy_paths(cli.policy_dir);

    let result = match cli.command {
        Command::Lint => run_lint(&paths),
        Command::Evaluate { action, arguments } => run_evaluate(&paths, &action, &arguments),
        Command::Session => run_session(&paths),
    };

    if let Err(e) = result {
        eprintln!("demo error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the policy directory: flag, then environment, then `policies`.
fn policy_paths(flag: Option<PathBuf>) -> Vec<PathBuf> {
    let dir = flag
        .or_else(|| std::env::var_os("WARDEN_POLICY_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("policies"));
    vec![dir]
}

fn effect_label(effect: RuleEffect) -> &'static str {
    match effect {
        RuleEffect::Warn => "warn",
        RuleEffect::Deny => "deny",
    }
}

// ── lint ──────────────────────────────────────────────────────────────────────

fn run_lint(paths: &[PathBuf]) -> WardenResult<()> {
    let (rules, warnings) = warden_policy::load_rules(paths)?;

    println!("compiled {} rule(s)", rules.len());
    for rule in &rules {
        println!(
            "  [{}] {}  {}",
            effect_label(rule.effect),
            rule.id,
            rule.description
        );
    }
    if warnings.is_empty() {
        println!("no warnings");
    } else {
        println!("{} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  {warning}");
        }
    }
    Ok(())
}

// ── evaluate ──────────────────────────────────────────────────────────────────

fn run_evaluate(paths: &[PathBuf], action: &str, arguments: &str) -> WardenResult<()> {
    let arguments: Value =
        serde_json::from_str(arguments).map_err(|e| WardenError::ConfigParse {
            reason: format!("--arguments is not valid JSON: {e}"),
        })?;

    let (engine, summary) = DecisionEngine::from_paths(paths)?;
    for warning in &summary.warnings {
        eprintln!("warning: {warning}");
    }

    let decision = engine.evaluate(&ActionRequest::new(action, arguments));
    println!(
        "{}",
        serde_json::to_string_pretty(&decision).expect("decisions serialize")
    );
    Ok(())
}

// ── session ───────────────────────────────────────────────────────────────────

/// A runner that pretends to call the cloud/repository providers.
struct DemoRunner;

impl ActionRunner for DemoRunner {
    fn execute(&self, action: &str, arguments: &Value) -> WardenResult<Value> {
        println!("  -> provider call: {action}");
        Ok(json!({
            "ok": true,
            "action": action,
            "arguments": arguments,
        }))
    }
}

/// A prompter that prints the pending plan and reads one stdin line.
struct StdinPrompter;

impl ConsentPrompter for StdinPrompter {
    fn request_consent(&self, plan: &PendingPlan) -> Option<String> {
        println!();
        println!("About to perform a state-changing action:");
        println!("  action:    {}", plan.action);
        println!("  arguments: {}", plan.arguments);
        for reason in &plan.decision.reasons {
            println!("  note:      {reason}");
        }
        for suggestion in &plan.decision.suggestions {
            println!("  suggest:   {}", suggestion.text);
        }
        print!("Proceed? [yes / dry run / no]: ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None, // EOF or read failure = cancellation
            Ok(_) => Some(line),
        }
    }
}

/// Delegating wrapper so the demo keeps a handle to the trail after the gate
/// takes ownership of its boxed writer.
struct SharedTrail(Arc<InMemoryTrailWriter>);

impl TrailWriter for SharedTrail {
    fn record(&self, record: &GateRecord) -> WardenResult<()> {
        self.0.record(record)
    }

    fn seal(&self, session_id: &str) -> WardenResult<()> {
        self.0.seal(session_id)
    }
}

fn run_session(paths: &[PathBuf]) -> WardenResult<()> {
    let (engine, summary) = DecisionEngine::from_paths(paths)?;
    println!("loaded {} rule(s)", summary.rule_count);
    for warning in &summary.warnings {
        println!("warning: {warning}");
    }

    let session_id = SessionId::new();
    let trail = Arc::new(InMemoryTrailWriter::new(session_id.to_string()));

    let mut gate = ConsentGate::new(
        Box::new(engine),
        Box::new(DemoRunner),
        Box::new(StdinPrompter),
        Box::new(SharedTrail(trail.clone())),
        StateChangingScope::new([
            "azure.create",
            "azure.delete",
            "github.create",
            "github.delete",
        ]),
    );

    // A small scripted plan: one read-only call, then three mutations.
    let plan: Vec<(&str, Value)> = vec![
        ("azure.list_resource_groups", json!({})),
        (
            "azure.create_resource_group",
            json!({
                "name": "rg-demo-app",
                "location": "eastus",
                "tags": { "owner": "sre", "env": "dev" }
            }),
        ),
        (
            "azure.create_storage_account",
            json!({
                "name": "rgdemostorage",
                "sku": "Standard_LRS",
                "tags": { "owner": "sre", "env": "dev" }
            }),
        ),
        (
            "github.create_repo",
            json!({ "name": "demo-tooling", "visibility": "private" }),
        ),
    ];

    println!();
    println!("session {session_id}");
    for (action, arguments) in plan {
        println!("step: {action}");
        let outcome = gate.gate(action, &arguments)?;
        match outcome.status {
            GateStatus::Executed => println!("  executed"),
            GateStatus::Simulated => println!("  simulated (dry run)"),
            GateStatus::Blocked => {
                println!("  blocked");
                for reason in &outcome.decision.reasons {
                    println!("    reason: {reason}");
                }
            }
        }
    }

    trail.seal(&session_id.to_string())?;
    let log = trail.export_log();
    println!();
    println!(
        "trail: {} event(s), terminal hash {}",
        log.events.len(),
        if log.terminal_hash.is_empty() {
            "(empty)"
        } else {
            &log.terminal_hash[..12]
        }
    );
    println!(
        "trail integrity: {}",
        if trail.verify_integrity() { "ok" } else { "BROKEN" }
    );

    Ok(())
}
