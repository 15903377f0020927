// crates/mc-planner-core/src/bundle.rs
// ============================================================================
// Module: Solve Bundle
// Description: Input/output envelope attached to every solver invocation.
// Purpose: Stamp a content-addressed, audit-stable identity on every solve,
//          independent of the nondeterministic fields riding along with it.
// Dependencies: crate::canon, serde, serde_json
// ============================================================================

//! ## Overview
//! A solve bundle is the audit record of one solver invocation: its inputs
//! (as hashes, never raw payloads), its outputs, and a compat-lint report.
//! `bundleHash` is computed over everything except timestamps and external
//! identity fields, so attaching sterling identity after the fact never
//! perturbs it.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::canon::CanonicalizeError;
use crate::canon::ContentHash;
use crate::canon::Definition;
use crate::canon::Step;
use crate::canon::content_hash;
use crate::canon::content_hash_str;
use crate::canon::hash_definition;
use crate::canon::hash_goal;
use crate::canon::hash_inventory_state;
use crate::canon::hash_nearby_blocks;
use crate::canon::hash_steps;
use crate::time::Timestamp;

// ============================================================================
// SECTION: Bundle Input
// ============================================================================

/// Where the effective objective weights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveWeightsSource {
    /// The caller supplied explicit objective weights.
    Provided,
    /// No weights were supplied; the solver's default was used.
    Default,
}

/// The input half of a solve bundle: everything that determined the solve,
/// carried as content hashes rather than raw payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveBundleInput {
    /// Identifier of the solver that produced this bundle.
    pub solver_id: String,
    /// Optional execution mode tag (e.g. `"dev"`, `"certifying"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<String>,
    /// Contract version the solver was invoked under.
    pub contract_version: String,
    /// Hash of the sorted operator/recipe definition set.
    pub definition_hash: ContentHash,
    /// Hash of the initial inventory state (audit identity only).
    pub initial_state_hash: ContentHash,
    /// Hash of the goal.
    pub goal_hash: ContentHash,
    /// Hash of the nearby-blocks observation.
    pub nearby_blocks_hash: ContentHash,
    /// Version of the core that produced this bundle.
    pub code_version: String,
    /// Optional tool-tier matrix version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_matrix_version: Option<String>,
    /// Number of definitions considered.
    pub definition_count: usize,
    /// The objective weights actually used for this solve.
    pub objective_weights_effective: Value,
    /// Where `objective_weights_effective` came from.
    pub objective_weights_source: ObjectiveWeightsSource,
    /// The caller-provided weights, if any were provided at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_weights_provided: Option<Value>,
    /// Observation-derived context tokens injected into this solve's wire
    /// inventory, if any were injected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_tokens_injected: Option<Vec<String>>,
}

/// Computes a [`SolveBundleInput`] from raw domain inputs.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when any component fails to canonicalize.
#[allow(clippy::too_many_arguments, reason = "mirrors the wire shape of SolveBundleInput one-to-one")]
pub fn compute_bundle_input(
    solver_id: impl Into<String>,
    execution_mode: Option<String>,
    contract_version: impl Into<String>,
    definitions: &[Definition],
    inventory: &HashMap<String, u64>,
    goal: &Value,
    nearby_blocks: &Value,
    code_version: impl Into<String>,
    tier_matrix_version: Option<String>,
    objective_weights_provided: Option<Value>,
    objective_weights_default: Value,
    context_tokens_injected: Option<Vec<String>>,
) -> Result<SolveBundleInput, CanonicalizeError> {
    let objective_weights_source = if objective_weights_provided.is_some() {
        ObjectiveWeightsSource::Provided
    } else {
        ObjectiveWeightsSource::Default
    };
    let objective_weights_effective = objective_weights_provided
        .clone()
        .unwrap_or(objective_weights_default);

    Ok(SolveBundleInput {
        solver_id: solver_id.into(),
        execution_mode,
        contract_version: contract_version.into(),
        definition_hash: hash_definition(definitions)?,
        initial_state_hash: hash_inventory_state(inventory)?,
        goal_hash: hash_goal(goal)?,
        nearby_blocks_hash: hash_nearby_blocks(nearby_blocks)?,
        code_version: code_version.into(),
        tier_matrix_version,
        definition_count: definitions.len(),
        objective_weights_effective,
        objective_weights_source,
        objective_weights_provided,
        context_tokens_injected,
    })
}

// ============================================================================
// SECTION: Bundle Output
// ============================================================================

/// Search-effort counters reported by a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total nodes expanded or visited during search.
    pub total_nodes: u64,
    /// Wall-clock duration of the search, in milliseconds.
    pub duration_ms: u64,
    /// Length of the returned solution path, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_path_length: Option<u64>,
}

/// A degeneracy reason surfaced in a bundle's search-termination rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneracyReason {
    /// More than half of expanded nodes shared the same heuristic value.
    HeuristicNotDiscriminating,
    /// The heuristic had zero variance across more than 10 expansions.
    ConstantHeuristic,
    /// Branching estimate exceeded 8 and search terminated on the node cap.
    UnguidedBlowup,
}

/// Inputs needed to build a bundle's rationale block. Supplying this is
/// optional; when omitted, [`SolveBundleOutput::rationale`] is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationaleContext {
    /// Node-expansion cap in effect for this solve.
    pub max_nodes: u64,
    /// Objective weights used, echoed into the rationale for audit.
    pub objective_weights: Value,
    /// Compat report produced for this solve.
    pub compat_report: CompatReport,
    /// Fraction of expanded nodes sharing the same heuristic value.
    pub pct_same_h: f64,
    /// Variance of the heuristic across expanded nodes.
    pub h_variance: f64,
    /// Total nodes expanded.
    pub nodes_expanded: u64,
    /// Estimated branching factor.
    pub branching_estimate: f64,
    /// Why the search terminated (e.g. `"max_nodes"`, `"goal_reached"`).
    pub termination_reason: String,
}

/// The four-block rationale attached to a bundle output when a
/// [`RationaleContext`] was supplied to [`compute_bundle_output`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    /// Bounding constraints in effect (node cap, etc.), as supplied context.
    pub bounding_constraints: Value,
    /// Search-effort counters, echoed for audit convenience.
    pub search_effort: Value,
    /// Why search terminated, plus any detected degeneracy.
    pub search_termination: SearchTermination,
    /// Compat-lint evidence used to shape the solve.
    pub shaping_evidence: Value,
}

/// The search-termination block of a [`Rationale`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTermination {
    /// Why the search terminated.
    pub reason: String,
    /// Degeneracy reasons detected (zero, one, or more — all rules apply
    /// independently).
    pub degeneracy: Vec<DegeneracyReason>,
}

/// Detects search degeneracy per three independent rules.
/// All applicable rules fire; none of them are mutually exclusive.
#[must_use]
pub fn detect_degeneracy(ctx: &RationaleContext) -> Vec<DegeneracyReason> {
    let mut reasons = Vec::new();
    if ctx.pct_same_h > 0.5 {
        reasons.push(DegeneracyReason::HeuristicNotDiscriminating);
    }
    if ctx.h_variance == 0.0 && ctx.nodes_expanded > 10 {
        reasons.push(DegeneracyReason::ConstantHeuristic);
    }
    if ctx.branching_estimate > 8.0 && ctx.termination_reason == "max_nodes" {
        reasons.push(DegeneracyReason::UnguidedBlowup);
    }
    reasons
}

/// External reasoner identity, attached to a bundle post-hash via
/// [`attach_sterling_identity`]. Never participates in `bundle_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SterlingIdentity {
    /// Hash of the reasoner's own trace bundle, if it reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_bundle_hash: Option<ContentHash>,
    /// Reasoner engine commitment identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_commitment: Option<String>,
    /// Hash of the reasoner's operator registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_registry_hash: Option<ContentHash>,
    /// Reasoner completeness declaration payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness_declaration: Option<Value>,
    /// Domain-separated join key linking this bundle to the reasoner's
    /// trace, computed by [`attach_sterling_identity`] when
    /// `trace_bundle_hash` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_hash: Option<ContentHash>,
}

/// The output half of a solve bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveBundleOutput {
    /// Identifier of the produced plan, if the solve succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// Whether the solve found a solution.
    pub solved: bool,
    /// Hash of the solution's step-action sequence.
    pub steps_digest: ContentHash,
    /// Search-effort counters.
    pub search_stats: SearchStats,
    /// Opaque search-health payload, forwarded from the reasoner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_health: Option<Value>,
    /// Rationale block, present only when a [`RationaleContext`] was
    /// supplied to [`compute_bundle_output`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
    /// External reasoner identity, attached post-hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sterling_identity: Option<SterlingIdentity>,
}

/// Computes a [`SolveBundleOutput`] from raw solve results.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when the step sequence fails to canonicalize.
pub fn compute_bundle_output(
    plan_id: Option<String>,
    solved: bool,
    steps: &[Step],
    search_stats: SearchStats,
    search_health: Option<Value>,
    rationale_ctx: Option<RationaleContext>,
) -> Result<SolveBundleOutput, CanonicalizeError> {
    let rationale = rationale_ctx.map(|ctx| Rationale {
        bounding_constraints: serde_json::json!({ "max_nodes": ctx.max_nodes }),
        search_effort: serde_json::json!({
            "nodes_expanded": ctx.nodes_expanded,
            "branching_estimate": ctx.branching_estimate,
        }),
        search_termination: SearchTermination {
            reason: ctx.termination_reason.clone(),
            degeneracy: detect_degeneracy(&ctx),
        },
        shaping_evidence: serde_json::json!({
            "objective_weights": ctx.objective_weights,
            "compat_report": ctx.compat_report,
        }),
    });

    Ok(SolveBundleOutput {
        plan_id,
        solved,
        steps_digest: hash_steps(steps)?,
        search_stats,
        search_health,
        rationale,
        sterling_identity: None,
    })
}

// ============================================================================
// SECTION: Compat Report
// ============================================================================

/// Severity of a compat-lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only; does not affect validity.
    Info,
    /// A warning; does not affect validity.
    Warning,
    /// An error; makes the compat report invalid.
    Error,
}

/// A single structured compat-lint issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatIssue {
    /// Stable issue code.
    pub code: String,
    /// Issue severity.
    pub severity: Severity,
    /// Optional human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Structured result of linting a definition set for compatibility.
///
/// `valid` is a pure function of `issues`: it is `true` exactly when no
/// issue has [`Severity::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatReport {
    /// Whether the definitions are compatible (no error-severity issues).
    pub valid: bool,
    /// Structured issues found.
    pub issues: Vec<CompatIssue>,
    /// When the check ran. Excluded from `bundle_hash`.
    pub checked_at: Timestamp,
    /// Number of definitions checked.
    pub definition_count: usize,
}

/// Builds a [`CompatReport`] from a set of issues; `valid` is derived, never
/// asserted independently.
#[must_use]
pub fn compat_report(issues: Vec<CompatIssue>, definition_count: usize, checked_at: Timestamp) -> CompatReport {
    let valid = !issues.iter().any(|issue| issue.severity == Severity::Error);
    CompatReport { valid, issues, checked_at, definition_count }
}

// ============================================================================
// SECTION: Solve Bundle
// ============================================================================

/// The complete, content-addressed audit record of one solver invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveBundle {
    /// `"${solver_id}:${bundle_hash}"`.
    pub bundle_id: String,
    /// Content hash over everything except nondeterministic fields.
    pub bundle_hash: ContentHash,
    /// When this bundle was created. Excluded from `bundle_hash`.
    pub timestamp: Timestamp,
    /// Bundle input.
    pub input: SolveBundleInput,
    /// Bundle output.
    pub output: SolveBundleOutput,
    /// Compat report.
    pub compat_report: CompatReport,
}

/// A copy of the fields that participate in `bundle_hash`: a stripped
/// output (no `sterling_identity`) and a stripped compat report (no
/// `checked_at`). Built fresh for each hash computation; never stored.
#[derive(Serialize)]
struct HashableBundle<'a> {
    input: &'a SolveBundleInput,
    output_sans_sterling: OutputSansSterling<'a>,
    compat_sans_checked_at: CompatSansCheckedAt<'a>,
}

#[derive(Serialize)]
struct OutputSansSterling<'a> {
    plan_id: &'a Option<String>,
    solved: bool,
    steps_digest: &'a ContentHash,
    search_stats: SearchStats,
    search_health: &'a Option<Value>,
    rationale: &'a Option<Rationale>,
}

#[derive(Serialize)]
struct CompatSansCheckedAt<'a> {
    valid: bool,
    issues: &'a [CompatIssue],
    definition_count: usize,
}

/// Creates a [`SolveBundle`], stripping nondeterministic fields
/// (`timestamp`, `compat_report.checked_at`, `output.sterling_identity`)
/// before hashing.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] when the stripped envelope fails to
/// canonicalize.
pub fn create_solve_bundle(
    input: SolveBundleInput,
    output: SolveBundleOutput,
    compat: CompatReport,
    timestamp: Timestamp,
) -> Result<SolveBundle, CanonicalizeError> {
    let hashable = HashableBundle {
        input: &input,
        output_sans_sterling: OutputSansSterling {
            plan_id: &output.plan_id,
            solved: output.solved,
            steps_digest: &output.steps_digest,
            search_stats: output.search_stats,
            search_health: &output.search_health,
            rationale: &output.rationale,
        },
        compat_sans_checked_at: CompatSansCheckedAt {
            valid: compat.valid,
            issues: &compat.issues,
            definition_count: compat.definition_count,
        },
    };
    let bundle_hash = content_hash(&hashable)?;
    let bundle_id = format!("{}:{}", input.solver_id, bundle_hash);

    Ok(SolveBundle {
        bundle_id,
        bundle_hash,
        timestamp,
        input,
        output,
        compat_report: compat,
    })
}

/// Attaches an external reasoner identity to a bundle after hashing. Never
/// changes `bundle_hash`. When `identity.trace_bundle_hash` is present,
/// computes the domain-separated `binding_hash` joining this bundle's
/// identity to the reasoner's trace.
pub fn attach_sterling_identity(bundle: &mut SolveBundle, identity: Option<SterlingIdentity>) {
    let Some(mut identity) = identity else {
        bundle.output.sterling_identity = None;
        return;
    };
    if let Some(trace_hash) = &identity.trace_bundle_hash {
        let joined = format!("binding:v1:{trace_hash}:{}", bundle.bundle_hash);
        identity.binding_hash = Some(content_hash_str(&joined));
    }
    bundle.output.sterling_identity = Some(identity);
}
