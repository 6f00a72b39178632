//! Grid-search optimiser tests

use delivery_simulator_core_rs::models::Stage;
use delivery_simulator_core_rs::optimiser::{weeks_to_hours, GridSearch, OptimiserError};
use delivery_simulator_core_rs::orchestrator::{run_simulation, SimulationConfig, StageDurations};

fn base_config() -> SimulationConfig {
    let mut config = SimulationConfig::new(1, 1, 10);
    config.failure_chance = Some(0.2);
    config.durations = StageDurations::default()
        .with(Stage::Backlog, 0.0)
        .with(Stage::Develop, 8.0)
        .with(Stage::Test, 4.0)
        .with(Stage::Rework, 2.0)
        .with(Stage::Regression, 1.0)
        .with(Stage::Release, 1.0);
    config.costs.developers = 100.0;
    config.costs.testers = 80.0;
    config
}

#[test]
fn test_search_order_is_developers_testers_wip() {
    let result = GridSearch::new(1..=2, 1..=2, 2..=3).run(&base_config()).unwrap();
    let order: Vec<(usize, usize, usize)> = result
        .candidates
        .iter()
        .map(|c| (c.developers, c.testers, c.wip_limit))
        .collect();

    assert_eq!(
        order,
        vec![
            (1, 1, 2),
            (1, 1, 3),
            (1, 2, 2),
            (1, 2, 3),
            (2, 1, 2),
            (2, 1, 3),
            (2, 2, 2),
            (2, 2, 3),
        ]
    );
}

#[test]
fn test_candidate_matches_direct_run() {
    let result = GridSearch::new(2..=2, 1..=1, 4..=4).run(&base_config()).unwrap();
    let candidate = &result.candidates[0];

    let mut config = base_config();
    config.num_developers = 2;
    config.wip_limit = Some(4);
    let outcome = run_simulation(config).unwrap();

    assert_eq!(candidate.elapsed_time, outcome.elapsed_time);
    assert_eq!(candidate.total_cost, outcome.metrics.total_cost());
    assert_eq!(candidate.completed_items, 10);
    assert_eq!(candidate.cost_per_item, outcome.metrics.total_cost() / 10.0);
}

#[test]
fn test_deadline_filters_slow_configurations() {
    let all = GridSearch::new(1..=3, 1..=2, 1..=4).run(&base_config()).unwrap();
    let slowest = all
        .candidates
        .iter()
        .map(|c| c.elapsed_time)
        .fold(0.0, f64::max);
    let fastest = all
        .candidates
        .iter()
        .map(|c| c.elapsed_time)
        .fold(f64::INFINITY, f64::min);
    assert!(fastest < slowest);

    let deadline = (fastest + slowest) / 2.0;
    let filtered = GridSearch::new(1..=3, 1..=2, 1..=4)
        .with_deadline(deadline)
        .run(&base_config())
        .unwrap();

    assert_eq!(filtered.evaluated, 24);
    assert!(filtered.skipped > 0);
    assert_eq!(filtered.skipped + filtered.candidates.len(), 24);
    assert!(filtered.candidates.iter().all(|c| c.elapsed_time <= deadline));
    assert!(filtered.best.unwrap().elapsed_time <= deadline);
}

#[test]
fn test_empty_ranges_rejected() {
    #[allow(clippy::reversed_empty_ranges)]
    let testers = 2..=1;
    assert_eq!(
        GridSearch::new(1..=1, testers, 1..=1).run(&base_config()),
        Err(OptimiserError::EmptyRange("testers"))
    );
}

#[test]
fn test_weeks_to_working_hours() {
    assert_eq!(weeks_to_hours(0.0), 0.0);
    assert_eq!(weeks_to_hours(4.0), 160.0);
}
