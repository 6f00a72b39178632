//! Property tests for the engine's conservation and bound invariants

use delivery_simulator_core_rs::models::{Event, Role, Stage, WorkItemId};
use delivery_simulator_core_rs::orchestrator::{run_simulation, SimulationConfig, StageDurations};
use proptest::prelude::*;

fn standard_config() -> impl Strategy<Value = SimulationConfig> {
    (
        1usize..4,
        1usize..3,
        1usize..15,
        prop::option::of(1usize..6),
        0.0f64..=1.0,
        prop::array::uniform5(0u8..6),
        any::<u64>(),
    )
        .prop_map(|(devs, testers, items, wip, failure, hours, seed)| {
            let mut config = SimulationConfig::new(devs, testers, items);
            config.wip_limit = wip;
            config.failure_chance = Some(failure);
            config.rng_seed = seed;
            config.durations = StageDurations::default()
                .with(Stage::Backlog, f64::from(hours[0]) * 0.5)
                .with(Stage::Develop, f64::from(hours[1]) + 1.0)
                .with(Stage::Test, f64::from(hours[2]) + 0.5)
                .with(Stage::Rework, f64::from(hours[3]))
                .with(Stage::Regression, f64::from(hours[4]))
                .with(Stage::Release, 1.0);
            config.costs.developers = 100.0;
            config.costs.testers = 75.0;
            config
        })
}

fn smoke_tested_config() -> impl Strategy<Value = SimulationConfig> {
    (
        (1usize..4, 1usize..3, 1usize..3),
        1usize..15,
        prop::option::of(1usize..6),
        (0.0f64..=1.0, 0.0f64..=1.0),
        prop::array::uniform6(0u8..6),
        any::<u64>(),
    )
        .prop_map(|((devs, testers, bas), items, wip, (smoke_failure, test_failure), hours, seed)| {
            let mut config = SimulationConfig::new(devs, testers, items);
            config.num_business_analysts = bas;
            config.wip_limit = wip;
            config.smoke_test_failure_chance = Some(smoke_failure);
            config.test_failure_chance = Some(test_failure);
            config.rng_seed = seed;
            config.durations = StageDurations::default()
                .with(Stage::Backlog, f64::from(hours[0]) * 0.3)
                .with(Stage::Develop, f64::from(hours[1]) * 0.7 + 0.1)
                .with(Stage::SmokeTest, f64::from(hours[2]) * 0.2 + 0.1)
                .with(Stage::Test, f64::from(hours[3]) + 0.5)
                .with(Stage::Rework, f64::from(hours[4]) * 0.7)
                .with(Stage::Regression, f64::from(hours[5]) * 0.1)
                .with(Stage::Release, 0.3);
            config.costs.developers = 100.0;
            config.costs.testers = 75.0;
            config.costs.business_analysts = 60.0;
            config
        })
}

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    prop_oneof![standard_config(), smoke_tested_config()]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_every_item_completes(config in arb_config()) {
        let items = config.num_work_items;
        let outcome = run_simulation(config).unwrap();

        prop_assert_eq!(outcome.metrics.completed_items, items);
        prop_assert_eq!(outcome.abandoned_items, 0);
        prop_assert_eq!(outcome.event_log.events_of_type("ItemCompleted").len(), items);
        prop_assert_eq!(outcome.metrics.wip_tracker.current(), 0);
    }

    #[test]
    fn prop_capacity_and_wip_bounds(config in arb_config()) {
        let developers = config.num_developers;
        let testers = config.num_testers;
        let analysts = config.num_business_analysts;
        let wip_limit = config.wip_limit;
        let outcome = run_simulation(config).unwrap();

        prop_assert!(outcome.peak_in_use(Role::Developer) <= developers);
        prop_assert!(outcome.peak_in_use(Role::Tester) <= testers);
        prop_assert!(outcome.peak_in_use(Role::BusinessAnalyst) <= analysts);
        if let Some(limit) = wip_limit {
            prop_assert!(outcome.peak_admitted() <= limit);
            prop_assert!(outcome.snapshot().wip_log.iter().all(|s| s.wip <= limit));
        }
    }

    #[test]
    fn prop_flow_and_utilisation_bounded(config in arb_config()) {
        let outcome = run_simulation(config).unwrap();
        let snapshot = outcome.snapshot();

        for efficiency in &snapshot.flow_efficiencies {
            prop_assert!((0.0..=1.0).contains(efficiency));
        }
        for role in &snapshot.roles {
            prop_assert!((0.0..=1.0).contains(&role.utilisation));
        }
    }

    #[test]
    fn prop_time_never_runs_backwards(config in arb_config()) {
        let outcome = run_simulation(config).unwrap();
        let times: Vec<f64> = outcome.event_log.events().iter().map(Event::time).collect();

        prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(times.iter().all(|t| *t <= outcome.elapsed_time));
    }

    #[test]
    fn prop_at_most_one_rework_per_gate(config in arb_config()) {
        let items = config.num_work_items;
        let outcome = run_simulation(config).unwrap();

        for sample in outcome.metrics.flow.samples() {
            prop_assert!(sample.efficiency() <= 1.0);
        }
        for id in 0..items {
            let failures: Vec<Stage> = outcome
                .event_log
                .events_for_item(WorkItemId(id))
                .into_iter()
                .filter(|e| e.event_type() == "TestFailed")
                .filter_map(Event::stage)
                .collect();
            for gate in [Stage::SmokeTest, Stage::Test] {
                prop_assert!(failures.iter().filter(|s| **s == gate).count() <= 1);
            }
        }
    }

    #[test]
    fn prop_cost_linear_in_elapsed(config in arb_config()) {
        let burn = config.num_developers as f64 * 100.0
            + config.num_testers as f64 * 75.0
            + config.num_business_analysts as f64 * 60.0;
        let outcome = run_simulation(config).unwrap();
        let expected = outcome.elapsed_time * burn;

        prop_assert!((outcome.metrics.total_cost() - expected).abs() <= 1e-6 * expected.max(1.0));
    }
}

#[test]
fn test_fractional_durations_keep_efficiency_bounded() {
    let mut worst: f64 = 0.0;
    for seed in 0..200 {
        let mut config = SimulationConfig::new(3, 2, 20);
        config.failure_chance = Some(0.4);
        config.rng_seed = seed;
        config.durations = StageDurations::default()
            .with(Stage::Backlog, 0.3)
            .with(Stage::Develop, 0.1)
            .with(Stage::Test, 0.2)
            .with(Stage::Rework, 0.7)
            .with(Stage::Regression, 0.1)
            .with(Stage::Release, 0.3);
        let outcome = run_simulation(config).unwrap();

        for efficiency in outcome.snapshot().flow_efficiencies {
            assert!(efficiency >= 0.0, "seed {seed}: efficiency {efficiency}");
            worst = worst.max(efficiency);
        }
    }
    assert!(worst <= 1.0, "max flow efficiency {worst}");
}
