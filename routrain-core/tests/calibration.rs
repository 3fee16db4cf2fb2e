mod common;

use common::*;
use routrain_core::learning::ExampleOutcome;
use routrain_core::prelude::*;

fn detour_example() -> TrainingExample {
    TrainingExample::new(A, D, vec![B, C], "stay on the footway")
}

fn direct_route(graph: &GraphModel, rules: &RuleSet, mode: CombineMode) -> Vec<NodeId> {
    let engine = rules.compile(mode);
    Router::new(graph, &engine)
        .route(A, D)
        .unwrap()
        .unwrap()
        .node_ids()
}

#[test]
fn raises_existing_penalty_until_detour_wins() {
    let graph = detour_graph();
    let start = rule_set(&[("W:sidewalk==no", (0.1, 0.0))]);
    assert_eq!(direct_route(&graph, &start, CombineMode::Override), vec![A, D]);

    let mut learner = RuleLearner::new(&graph, vec![detour_example()], LearnerConfig::default())
        .with_rules(start);
    let outcome = learner.run(&mut LogReporter).unwrap();

    assert_eq!(outcome.state, LearnerState::Converged);
    assert!(outcome.iterations <= 5, "took {} iterations", outcome.iterations);
    let weight = outcome.rules.get(&key("W:sidewalk==no")).unwrap();
    assert!(weight.distance > 0.1);
    assert_eq!(
        direct_route(&graph, &outcome.rules, CombineMode::Override),
        vec![A, B, C, D]
    );
}

#[test]
fn introduces_rule_from_empty_rule_set() {
    let graph = detour_graph();
    let mut learner = RuleLearner::new(&graph, vec![detour_example()], LearnerConfig::default());
    let outcome = learner.run(&mut LogReporter).unwrap();

    assert_eq!(outcome.state, LearnerState::Converged);
    assert!(outcome.iterations <= 5, "took {} iterations", outcome.iterations);
    // the residential street ranks first among equally over-used candidates
    let weight = outcome.rules.get(&key("W:highway==residential")).unwrap();
    assert!(weight.distance > 0.0);
    assert_eq!(weight.fixed, 0.0);
    assert_eq!(
        direct_route(&graph, &outcome.rules, CombineMode::Override),
        vec![A, B, C, D]
    );
}

#[test]
fn skipped_node_candidates_do_not_block_convergence() {
    // The first iteration finds no node-scoped candidate with a negative
    // count, so only half the budget is spent. The learner must still
    // converge on a later iteration.
    let graph = detour_graph();
    let mut learner = RuleLearner::new(&graph, vec![detour_example()], LearnerConfig::default());

    let first = learner.step().unwrap();
    assert_eq!(first.failed, 1);
    assert_eq!(first.rules_changed, 1);
    assert_eq!(learner.rules().len(), 1);

    let second = learner.step().unwrap();
    assert_eq!(second.failed, 1);
    assert_eq!(learner.state(), LearnerState::Iterating);

    let third = learner.step().unwrap();
    assert_eq!(third.failed, 0);
    assert_eq!(third.state, LearnerState::Converged);
}

#[test]
fn additive_mode_converges_too() {
    let graph = detour_graph();
    let config = LearnerConfig {
        override_mode: false,
        ..LearnerConfig::default()
    };
    let start = rule_set(&[("W:highway==residential", (0.05, 0.0))]);
    let mut learner = RuleLearner::new(&graph, vec![detour_example()], config).with_rules(start);
    let outcome = learner.run(&mut LogReporter).unwrap();

    assert_eq!(outcome.state, LearnerState::Converged);
    assert_eq!(
        direct_route(&graph, &outcome.rules, CombineMode::Additive),
        vec![A, B, C, D]
    );
}

#[test]
fn converged_rules_are_a_fixed_point() {
    let graph = detour_graph();
    let examples = vec![detour_example()];
    let mut learner = RuleLearner::new(&graph, examples.clone(), LearnerConfig::default());
    let outcome = learner.run(&mut LogReporter).unwrap();
    assert_eq!(outcome.state, LearnerState::Converged);

    let mut again = RuleLearner::new(&graph, examples, LearnerConfig::default())
        .with_rules(outcome.rules.clone());
    let report = again.step().unwrap();

    assert_eq!(report.failed, 0);
    assert_eq!(report.rules_changed, 0);
    assert_eq!(report.state, LearnerState::Converged);
    assert_eq!(again.rules(), &outcome.rules);
    assert!(again.evaluate().unwrap().iter().all(ExampleOutcome::is_passed));
}

#[test]
fn out_of_graph_examples_are_skipped() {
    let graph = detour_graph();
    let examples = vec![
        TrainingExample::new(A, 999, vec![], "missing end"),
        detour_example(),
        TrainingExample::new(A, D, vec![998], "missing via"),
    ];
    let mut learner = RuleLearner::new(&graph, examples, LearnerConfig::default());

    assert_eq!(learner.skipped(), 2);
    assert_eq!(learner.examples().len(), 1);
    let outcome = learner.run(&mut LogReporter).unwrap();
    assert_eq!(outcome.state, LearnerState::Converged);
}

#[test]
fn unreachable_examples_fail_until_stalled() {
    let graph = detour_graph();
    let config = LearnerConfig {
        stall_limit: 3,
        ..LearnerConfig::default()
    };
    let examples = vec![TrainingExample::new(A, ISOLATED, vec![], "island")];
    let mut learner = RuleLearner::new(&graph, examples, config);

    let mut reports = Vec::new();
    let outcome = learner
        .run(&mut |report: &IterationReport| reports.push(report.clone()))
        .unwrap();

    assert_eq!(outcome.state, LearnerState::Stalled);
    assert_eq!(outcome.iterations, 5);
    assert!(reports.iter().all(|r| r.unreachable == 1 && r.failed == 1));
    assert!(outcome.rules.is_empty());
}

#[test]
fn iteration_cap_stops_learning() {
    let graph = detour_graph();
    let config = LearnerConfig {
        max_iterations: Some(1),
        ..LearnerConfig::default()
    };
    let mut learner = RuleLearner::new(&graph, vec![detour_example()], config);
    let outcome = learner.run(&mut LogReporter).unwrap();
    assert_eq!(outcome.state, LearnerState::Stalled);
    assert_eq!(outcome.iterations, 1);
}

#[test]
fn reports_track_best_errors() {
    let graph = grid_graph();
    // prefer the footway row over the parallel residential rows
    let examples = vec![
        TrainingExample::new(100, 103, vec![110, 111, 112, 113], "use the footway"),
        TrainingExample::new(130, 123, vec![122], "cross at the signals"),
    ];
    let config = LearnerConfig {
        max_iterations: Some(200),
        ..LearnerConfig::default()
    };
    let start = rule_set(&[("W:highway==footway", (0.6, 0.0))]);
    let mut learner = RuleLearner::new(&graph, examples, config).with_rules(start);

    let mut reports = Vec::new();
    let outcome = learner
        .run(&mut |report: &IterationReport| reports.push(report.clone()))
        .unwrap();

    assert_eq!(reports.len(), outcome.iterations);
    for pair in reports.windows(2) {
        assert!(pair[1].best_absolute_error <= pair[0].best_absolute_error);
        assert!(pair[1].best_relative_error <= pair[0].best_relative_error);
    }
    let last = reports.last().unwrap();
    assert_eq!(last.progress().2, outcome.rules.len());
    assert_eq!(last.state, outcome.state);
}

#[test]
fn negative_rules_abort_learning() {
    let graph = detour_graph();
    let config = LearnerConfig {
        override_mode: false,
        ..LearnerConfig::default()
    };
    let start = rule_set(&[
        ("W:highway==residential", (1.0, 0.0)),
        ("W:sidewalk==no", (-3.0, 0.0)),
    ]);
    let mut learner = RuleLearner::new(&graph, vec![detour_example()], config).with_rules(start);

    let err = learner.step().unwrap_err();
    assert!(matches!(err, Error::NegativePenalty { way: 200, .. }));
    assert!(err.is_invariant_violation());
}

/// Absolute error (inflated) and direct length of the detour example
fn detour_error(graph: &GraphModel, rules: &RuleSet) -> (f64, f64) {
    let engine = rules.compile(CombineMode::Override);
    let router = Router::new(graph, &engine);
    let direct = router.route(A, D).unwrap().unwrap();
    let learn = router.multi_route(&[A, B, C, D]).unwrap().unwrap();
    let error = (learn.cost - direct.cost) * LearnerConfig::default().error_inflation;
    (error, direct.length())
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-9 * expected.abs(),
        "expected {expected}, got {actual}"
    );
}

#[test]
fn stagnation_switches_part_of_the_error_to_new_rules() {
    let graph = detour_graph();
    let start = rule_set(&[("W:sidewalk==no", (0.1, 0.0))]);
    let (error, length) = detour_error(&graph, &start);
    // the counter starts at 1, already past a patience of 0
    let config = LearnerConfig {
        stagnation_patience: 0,
        ..LearnerConfig::default()
    };
    let mut learner =
        RuleLearner::new(&graph, vec![detour_example()], config).with_rules(start);

    let report = learner.step().unwrap();

    assert_eq!(report.rules_changed, 2);
    let rules = learner.rules();
    assert_close(
        rules.get(&key("W:sidewalk==no")).unwrap().distance,
        0.1 + 0.9 * error / length,
    );
    // the new rule only gets the way half of the exploration share
    let introduced = rules.get(&key("W:highway==residential")).unwrap();
    assert_close(introduced.distance, 0.1 * error / 2.0 / length);
    assert_eq!(introduced.fixed, 0.0);
}

#[test]
fn patience_reached_but_not_exceeded_keeps_existing_rules_only() {
    let graph = detour_graph();
    let start = rule_set(&[("W:sidewalk==no", (0.1, 0.0))]);
    let (error, length) = detour_error(&graph, &start);
    let config = LearnerConfig {
        stagnation_patience: 1,
        ..LearnerConfig::default()
    };
    let mut learner =
        RuleLearner::new(&graph, vec![detour_example()], config).with_rules(start);

    let report = learner.step().unwrap();

    assert_eq!(report.rules_changed, 1);
    assert_eq!(learner.rules().len(), 1);
    assert_close(
        learner.rules().get(&key("W:sidewalk==no")).unwrap().distance,
        0.1 + error / length,
    );
}
