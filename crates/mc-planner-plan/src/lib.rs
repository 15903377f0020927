// crates/mc-planner-plan/src/lib.rs
// ============================================================================
// Crate: mc-planner-plan
// Description: Rig G — partial-order plan construction, deterministic
//              linearization, commuting-pair detection, feasibility
//              checking, and the execution advisor.
// ============================================================================

//! ## Overview
//! This crate turns module declarations and their steps into a DAG
//! ([`dag::build_dag_from_modules`]), linearizes it deterministically
//! ([`linearize::linearize`]), finds reorderable step pairs
//! ([`commuting::find_commuting_pairs`]), checks domain constraints
//! ([`feasibility::check_feasibility`]), summarizes the pass
//! ([`signals::compute_rig_g_signals`]), and gates proceed/replan
//! ([`advisor::advise_execution`]).
//!
//! Every step returns a [`types::PlanningDecision`] rather than raising:
//! `Blocked` and `Error` are expected outcomes a caller inspects, not
//! exceptions it catches.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod advisor;
pub mod commuting;
pub mod dag;
pub mod error;
pub mod feasibility;
pub mod linearize;
pub mod signals;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use advisor::advise_execution;
pub use commuting::find_commuting_pairs;
pub use dag::ModuleDecl;
pub use dag::build_dag_from_modules;
pub use error::PlanError;
pub use feasibility::check_feasibility;
pub use linearize::linearize;
pub use signals::compute_rig_g_signals;
pub use types::AdvisorMeta;
pub use types::CommutingPair;
pub use types::ExecutionAdvice;
pub use types::FeasibilityResult;
pub use types::FeasibilityViolation;
pub use types::LinearizationResult;
pub use types::PartialOrderPlan;
pub use types::PlanConstraint;
pub use types::PlanEdge;
pub use types::PlanNode;
pub use types::PlanningDecision;
pub use types::RigGSignals;
pub use types::SignalsInput;
pub use types::CURRENT_VERSION;
pub use types::MAX_DAG_NODES;
