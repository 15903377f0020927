// crates/mc-planner-plan/tests/scenarios.rs
// ============================================================================
// Module: Rig G Seed Scenarios
// Description: Integration tests for the planning-constraint seed scenarios
//              S1-S5.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use mc_planner_plan::AdvisorMeta;
use mc_planner_plan::CURRENT_VERSION;
use mc_planner_plan::ModuleDecl;
use mc_planner_plan::PlanConstraint;
use mc_planner_plan::PlanningDecision;
use mc_planner_plan::SignalsInput;
use mc_planner_plan::advise_execution;
use mc_planner_plan::build_dag_from_modules;
use mc_planner_plan::check_feasibility;
use mc_planner_plan::compute_rig_g_signals;
use mc_planner_plan::find_commuting_pairs;
use mc_planner_plan::linearize;

fn shelter_modules() -> Vec<ModuleDecl> {
    vec![
        ModuleDecl { module_id: "clear_site".to_string(), module_type: "site_prep".to_string(), depends_on: vec![] },
        ModuleDecl {
            module_id: "foundation_5x5".to_string(),
            module_type: "foundation".to_string(),
            depends_on: vec!["clear_site".to_string()],
        },
        ModuleDecl {
            module_id: "walls_cobble_3h".to_string(),
            module_type: "walls".to_string(),
            depends_on: vec!["foundation_5x5".to_string()],
        },
        ModuleDecl {
            module_id: "place_bed".to_string(),
            module_type: "place_feature".to_string(),
            depends_on: vec!["walls_cobble_3h".to_string()],
        },
        ModuleDecl {
            module_id: "roof_slab".to_string(),
            module_type: "roof".to_string(),
            depends_on: vec!["walls_cobble_3h".to_string()],
        },
        ModuleDecl {
            module_id: "door_south".to_string(),
            module_type: "place_feature".to_string(),
            depends_on: vec!["walls_cobble_3h".to_string()],
        },
        ModuleDecl {
            module_id: "lighting_pass".to_string(),
            module_type: "place_feature".to_string(),
            depends_on: vec!["roof_slab".to_string()],
        },
    ]
}

fn shelter_steps() -> Vec<String> {
    shelter_modules().iter().map(|m| m.module_id.clone()).collect()
}

// S1: the execution advisor fails closed on an unrecognized metadata version.
#[test]
fn s1_advisor_fails_closed_on_unknown_version() {
    let modules = shelter_modules();
    let steps = shelter_steps();
    let plan = build_dag_from_modules(1, &modules, &steps).unwrap().into_value().unwrap();
    let linearization = linearize(&plan).unwrap().into_value().unwrap();
    let commuting_pairs = find_commuting_pairs(&plan);
    let signals = compute_rig_g_signals(&SignalsInput {
        node_count: plan.nodes.len(),
        edge_count: plan.edges.len(),
        plan_digest: &plan.plan_digest,
        linearization: &linearization,
        feasibility: None,
        commuting_pairs: &commuting_pairs,
        degraded_to_raw_steps: false,
    });

    let advice = advise_execution(&AdvisorMeta { version: 99, signals: &signals, commuting_pairs: &commuting_pairs });
    assert!(!advice.should_proceed);
    assert!(advice.should_replan);
    assert_eq!(advice.suggested_parallelism, 1);
    assert!(advice.block_reason.unwrap().contains("Unknown rigG metadata version"));
}

// S2: suggested parallelism clamps the floored ready-set mean into [1, 3].
#[test]
fn s2_suggested_parallelism_clamps_into_bounds() {
    let modules = shelter_modules();
    let steps = shelter_steps();
    let plan = build_dag_from_modules(1, &modules, &steps).unwrap().into_value().unwrap();
    let linearization = linearize(&plan).unwrap().into_value().unwrap();
    let commuting_pairs = find_commuting_pairs(&plan);

    for (ready_set_sizes, expected) in [(vec![10, 10, 10], 3u32), (vec![0, 0, 1], 1u32), (vec![2, 3, 3], 2u32)] {
        let mut linearization = linearization.clone();
        linearization.ready_set_sizes = ready_set_sizes;
        let signals = compute_rig_g_signals(&SignalsInput {
            node_count: plan.nodes.len(),
            edge_count: plan.edges.len(),
            plan_digest: &plan.plan_digest,
            linearization: &linearization,
            feasibility: None,
            commuting_pairs: &commuting_pairs,
            degraded_to_raw_steps: false,
        });
        let advice = advise_execution(&AdvisorMeta {
            version: CURRENT_VERSION,
            signals: &signals,
            commuting_pairs: &commuting_pairs,
        });
        assert!(advice.should_proceed);
        assert_eq!(advice.suggested_parallelism, expected);
    }
}

// S3: a seven-module shelter DAG; place_feature modules share a conflict key
// and never commute with each other, while walls_cobble_3h precedes
// roof_slab in every linearization.
#[test]
fn s3_shelter_dag_shape_and_conflict_keys() {
    let modules = shelter_modules();
    let steps = shelter_steps();
    let plan = build_dag_from_modules(1, &modules, &steps).unwrap().into_value().unwrap();
    assert_eq!(plan.nodes.len(), 7);

    let door_south = plan.nodes.iter().find(|n| n.module_id == "door_south").unwrap();
    let lighting_pass = plan.nodes.iter().find(|n| n.module_id == "lighting_pass").unwrap();
    assert!(door_south.conflict_keys.contains("type:place_feature"));
    assert_eq!(door_south.conflict_keys, lighting_pass.conflict_keys);

    let commuting_pairs = find_commuting_pairs(&plan);
    let names_for = |id: &mc_planner_core::canon::ContentHash| {
        plan.nodes.iter().find(|n| &n.id == id).map(|n| n.module_id.as_str()).unwrap_or("")
    };
    let has_pair = commuting_pairs.iter().any(|p| {
        let (a, b) = (names_for(&p.node_a), names_for(&p.node_b));
        (a == "door_south" && b == "lighting_pass") || (a == "lighting_pass" && b == "door_south")
    });
    assert!(!has_pair, "door_south and lighting_pass share a conflict key and must not commute");

    let linearization = linearize(&plan).unwrap().into_value().unwrap();
    let walls_id = plan.nodes.iter().find(|n| n.module_id == "walls_cobble_3h").unwrap().id.clone();
    let roof_id = plan.nodes.iter().find(|n| n.module_id == "roof_slab").unwrap().id.clone();
    let walls_pos = linearization.order.iter().position(|id| *id == walls_id).unwrap();
    let roof_pos = linearization.order.iter().position(|id| *id == roof_id).unwrap();
    assert!(walls_pos < roof_pos);
}

// S4: a plan exceeding the node-count bound is blocked, not built.
#[test]
fn s4_bound_exceeded_reports_both_counts() {
    let modules: Vec<ModuleDecl> = (0..300)
        .map(|i| ModuleDecl {
            module_id: format!("m{i}"),
            module_type: "generic".to_string(),
            depends_on: if i == 0 { Vec::new() } else { vec![format!("m{}", i - 1)] },
        })
        .collect();
    let steps: Vec<String> = (0..300).map(|i| format!("step{i}")).collect();

    let decision = build_dag_from_modules(1, &modules, &steps).unwrap();
    match decision {
        PlanningDecision::Blocked { reason, detail } => {
            assert_eq!(reason, "bound_exceeded");
            assert!(detail.contains("300"));
            assert!(detail.contains("200"));
        }
        PlanningDecision::Ok { .. } | PlanningDecision::Error { .. } => panic!("expected blocked"),
    }
}

// S5: a shelter plan missing its foundation step fails feasibility with an
// `infeasible_dependency` violation naming the missing module.
#[test]
fn s5_missing_foundation_blocks_feasibility() {
    let mut modules = shelter_modules();
    modules.retain(|m| m.module_id != "foundation_5x5");
    for module in &mut modules {
        module.depends_on.retain(|d| d != "foundation_5x5");
    }
    let steps: Vec<String> = modules.iter().map(|m| m.module_id.clone()).collect();

    let plan = build_dag_from_modules(1, &modules, &steps).unwrap().into_value().unwrap();

    let constraints = vec![PlanConstraint::Dependency {
        dependent_module_id: "walls_cobble_3h".to_string(),
        required_module_id: "foundation_5x5".to_string(),
    }];
    let result = check_feasibility(&plan, &constraints);
    assert!(!result.passed());
    match result.decision() {
        PlanningDecision::Blocked { reason, detail } => {
            assert_eq!(reason, "infeasible_dependency");
            assert!(detail.contains("foundation_5x5"));
        }
        PlanningDecision::Ok { .. } | PlanningDecision::Error { .. } => panic!("expected blocked"),
    }
}
