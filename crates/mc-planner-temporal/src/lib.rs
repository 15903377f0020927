// crates/mc-planner-temporal/src/lib.rs
// ============================================================================
// Crate: mc-planner-temporal
// Description: Temporal adapter, contingency planner, risk-aware planner,
//              and commitment planner (P03, P09, P10, P13).
// ============================================================================

//! Time-bucket scheduling, policy-graph contingency planning, exact-mass
//! risk expansion, and reversibility-tagged commitment tracking.

pub mod commitment;
pub mod contingency;
pub mod error;
pub mod resource_slots;
pub mod risk;

pub use commitment::CommitOperator;
pub use commitment::CommitmentCost;
pub use commitment::CommitmentState;
pub use commitment::ReversibilityTag;
pub use commitment::VerificationState;
pub use commitment::OPTION_VALUE_MAX;
pub use commitment::apply_verification;
pub use commitment::calculate_commitment_cost;
pub use commitment::can_commit;
pub use commitment::commit;

pub use contingency::ActionDecl;
pub use contingency::EdgeKind;
pub use contingency::ForcedTransition;
pub use contingency::PolicyEdge;
pub use contingency::PolicyGraph;
pub use contingency::PolicyNode;
pub use contingency::SafetyInvariant;
pub use contingency::Trigger;
pub use contingency::TruncationReason as PolicyTruncationReason;
pub use contingency::MAX_BRANCH_FACTOR;
pub use contingency::MAX_HORIZON;
pub use contingency::MAX_POLICY_NODES;
pub use contingency::apply_action;
pub use contingency::build_policy_graph;
pub use contingency::check_safety;
pub use contingency::evaluate_triggers;

pub use error::TemporalError;

pub use resource_slots::BatchOperator;
pub use resource_slots::BucketWindow;
pub use resource_slots::DeadlockedNeed;
pub use resource_slots::ResourceNeed;
pub use resource_slots::ResourceSlot;
pub use resource_slots::ScheduleEntry;
pub use resource_slots::canonical_order;
pub use resource_slots::check_deadlock;
pub use resource_slots::compute_makespan;
pub use resource_slots::find_available_slot;
pub use resource_slots::operator_snapshot_hash;
pub use resource_slots::prefer_batch;
pub use resource_slots::reserve_slot;
pub use resource_slots::slots_identity_hash;

pub use risk::BudgetSource;
pub use risk::ConstraintStatus;
pub use risk::ExpansionOutcome;
pub use risk::ExpansionRejection;
pub use risk::ObservationCounts;
pub use risk::OutcomeDecl;
pub use risk::OutcomeResult;
pub use risk::RejectedAction;
pub use risk::RiskAggregation;
pub use risk::RiskInvariant;
pub use risk::RiskLedger;
pub use risk::ScenarioEdge;
pub use risk::ScenarioExplanation;
pub use risk::ScenarioGraph;
pub use risk::ScenarioNode;
pub use risk::ScenarioTruncationReason;
pub use risk::StochasticAction;
pub use risk::TerminalReason;
pub use risk::MASS_TOTAL;
pub use risk::MAX_OUTCOMES_PER_ACTION;
pub use risk::MAX_SCENARIO_DEPTH;
pub use risk::MAX_SCENARIO_NODES;
pub use risk::aggregate_risk;
pub use risk::expand_action;
pub use risk::initialize_ledger;
pub use risk::plan_risk_graph;
pub use risk::update_risk_model;
