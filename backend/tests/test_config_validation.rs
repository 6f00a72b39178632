//! Configuration parsing and validation tests

use delivery_simulator_core_rs::models::{Pipeline, Role, Stage};
use delivery_simulator_core_rs::orchestrator::{
    ConfigError, SimulationConfig, SimulationError, Simulator, StageDurations, DEFAULT_RNG_SEED,
};

const TEAM_JSON: &str = r#"{
    "num_developers": 4,
    "num_testers": 2,
    "wip_limit": 6,
    "failure_chance": 0.2,
    "durations": {"Backlog": 0, "Develop": 20, "Test": 8, "Rework": 3, "ART": 2, "Release": 3},
    "num_work_items": 30,
    "costs": {"developers": 100, "testers": 80}
}"#;

const SMOKE_JSON: &str = r#"{
    "num_developers": 3,
    "num_testers": 1,
    "num_business_analysts": 1,
    "smoke_test_failure_chance": 0.1,
    "test_failure_chance": 0.25,
    "durations": {"Backlog": 1, "Develop": 16, "Smoke Test": 2, "Test": 6, "Rework": 4, "Regression": 2, "Release": 1},
    "num_work_items": 12,
    "costs": {"developers": 90, "testers": 70, "business_analysts": 60},
    "rng_seed": 7,
    "time_limit": 2000
}"#;

fn valid() -> SimulationConfig {
    SimulationConfig::from_json_str(TEAM_JSON).unwrap()
}

#[test]
fn test_parse_front_end_config() {
    let config = valid();

    assert_eq!(config.num_developers, 4);
    assert_eq!(config.num_business_analysts, 0);
    assert_eq!(config.wip_limit, Some(6));
    assert_eq!(config.durations.get(Stage::Regression), Some(2.0));
    assert_eq!(config.durations.get(Stage::SmokeTest), None);
    assert_eq!(config.costs.rate(Role::Tester), 80.0);
    assert_eq!(config.costs.rate(Role::BusinessAnalyst), 0.0);
    assert_eq!(config.rng_seed, DEFAULT_RNG_SEED);
    assert_eq!(config.time_limit, None);
    assert_eq!(config.pipeline(), Pipeline::Standard);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_parse_smoke_tested_config() {
    let config = SimulationConfig::from_json_str(SMOKE_JSON).unwrap();

    assert_eq!(config.pipeline(), Pipeline::SmokeTested);
    assert_eq!(config.durations.get(Stage::SmokeTest), Some(2.0));
    assert_eq!(config.failure_chance_for(Stage::SmokeTest), 0.1);
    assert_eq!(config.failure_chance_for(Stage::Test), 0.25);
    assert_eq!(config.rng_seed, 7);
    assert_eq!(config.time_limit, Some(2000.0));
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = SimulationConfig::from_json_str("{\"num_developers\": 2").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = SimulationConfig::from_json_reader("[]".as_bytes()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_json_round_trip_keeps_hash() {
    let config = SimulationConfig::from_json_str(SMOKE_JSON).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let reparsed = SimulationConfig::from_json_str(&json).unwrap();

    assert_eq!(config, reparsed);
    assert_eq!(config.config_hash(), reparsed.config_hash());
    assert_eq!(config.config_hash().len(), 64);
}

#[test]
fn test_hash_changes_with_config() {
    let a = valid();
    let mut b = valid();
    b.wip_limit = Some(7);
    assert_ne!(a.config_hash(), b.config_hash());
}

#[test]
fn test_rejects_zero_work_items() {
    let mut config = valid();
    config.num_work_items = 0;
    assert_eq!(config.validate(), Err(ConfigError::NoWorkItems));
}

#[test]
fn test_rejects_zero_wip_limit() {
    let mut config = valid();
    config.wip_limit = Some(0);
    assert_eq!(config.validate(), Err(ConfigError::ZeroWipLimit));
}

#[test]
fn test_rejects_probability_out_of_range() {
    let mut config = valid();
    config.failure_chance = Some(1.5);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidProbability {
            field: "failure_chance",
            value: 1.5
        })
    );

    let mut config = valid();
    config.test_failure_chance = Some(-0.1);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProbability {
            field: "test_failure_chance",
            ..
        })
    ));
}

#[test]
fn test_rejects_negative_duration() {
    let mut config = valid();
    config.durations.set(Stage::Test, -1.0);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidDuration {
            stage: Stage::Test,
            value: -1.0
        })
    );
}

#[test]
fn test_rejects_missing_active_duration() {
    let mut config = valid();
    config.durations.release = None;
    assert_eq!(config.validate(), Err(ConfigError::MissingDuration(Stage::Release)));
}

#[test]
fn test_rework_duration_only_needed_when_gates_can_fail() {
    let mut config = SimulationConfig::new(1, 1, 1);
    config.durations = StageDurations::default()
        .with(Stage::Backlog, 0.0)
        .with(Stage::Develop, 1.0)
        .with(Stage::Test, 1.0)
        .with(Stage::Regression, 1.0)
        .with(Stage::Release, 1.0);
    assert_eq!(config.validate(), Ok(()));

    config.failure_chance = Some(0.1);
    assert_eq!(config.validate(), Err(ConfigError::MissingDuration(Stage::Rework)));
}

#[test]
fn test_rejects_negative_cost() {
    let mut config = valid();
    config.costs.developers = -5.0;
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidCost {
            role: Role::Developer,
            value: -5.0
        })
    );
}

#[test]
fn test_rejects_empty_required_pool() {
    let mut config = valid();
    config.num_testers = 0;
    assert_eq!(config.validate(), Err(ConfigError::EmptyPool(Role::Tester)));

    let mut smoke = SimulationConfig::from_json_str(SMOKE_JSON).unwrap();
    smoke.num_business_analysts = 0;
    assert_eq!(smoke.validate(), Err(ConfigError::EmptyPool(Role::BusinessAnalyst)));
}

#[test]
fn test_rejects_bad_time_limit() {
    let mut config = valid();
    config.time_limit = Some(0.0);
    assert_eq!(config.validate(), Err(ConfigError::InvalidTimeLimit(0.0)));
}

#[test]
fn test_simulator_validates_eagerly() {
    let mut config = valid();
    config.num_developers = 0;
    assert_eq!(
        Simulator::new(config).unwrap_err(),
        SimulationError::InvalidConfig(ConfigError::EmptyPool(Role::Developer))
    );
}
