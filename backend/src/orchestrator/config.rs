//! Simulation configuration
//!
//! An immutable, validated value object. It is usually read from the same JSON
//! shape the planning front ends produce:
//!
//! ```json
//! {
//!   "num_developers": 4,
//!   "num_testers": 2,
//!   "wip_limit": 8,
//!   "failure_chance": 0.3,
//!   "durations": {"Backlog": 0, "Develop": 20, "Test": 8, "Rework": 3, "ART": 2, "Release": 3},
//!   "num_work_items": 300,
//!   "costs": {"developers": 150, "testers": 120}
//! }
//! ```
//!
//! Validation is eager: [`Simulator::new`](crate::orchestrator::Simulator::new)
//! refuses a config that could hang or divide by zero.

use crate::core::SimTime;
use crate::models::{Pipeline, Role, Stage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use thiserror::Error;

/// Seed used when the config does not name one
pub const DEFAULT_RNG_SEED: u64 = 42;

/// Configuration validation and parsing failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("num_work_items must be > 0")]
    NoWorkItems,

    #[error("wip_limit must be > 0 when set")]
    ZeroWipLimit,

    #[error("Missing duration for active stage {0}")]
    MissingDuration(Stage),

    #[error("Duration for {stage} must be a finite, non-negative number of hours (got {value})")]
    InvalidDuration { stage: Stage, value: f64 },

    #[error("{field} must be within [0, 1] (got {value})")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("Hourly cost for {role} must be finite and non-negative (got {value})")]
    InvalidCost { role: Role, value: f64 },

    #[error("{0} pool has zero capacity but the pipeline needs it")]
    EmptyPool(Role),

    #[error("time_limit must be finite and > 0 (got {0})")]
    InvalidTimeLimit(f64),
}

/// Nominal service duration per stage, in hours
///
/// Keys follow the front-end naming; `ART` is accepted for Regression and
/// `Smoke Test` for SmokeTest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDurations {
    #[serde(rename = "Backlog", default, skip_serializing_if = "Option::is_none")]
    pub backlog: Option<f64>,

    #[serde(rename = "Develop", default, skip_serializing_if = "Option::is_none")]
    pub develop: Option<f64>,

    #[serde(
        rename = "SmokeTest",
        alias = "Smoke Test",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub smoke_test: Option<f64>,

    #[serde(rename = "Test", default, skip_serializing_if = "Option::is_none")]
    pub test: Option<f64>,

    #[serde(rename = "Rework", default, skip_serializing_if = "Option::is_none")]
    pub rework: Option<f64>,

    #[serde(
        rename = "Regression",
        alias = "ART",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub regression: Option<f64>,

    #[serde(rename = "Release", default, skip_serializing_if = "Option::is_none")]
    pub release: Option<f64>,
}

impl StageDurations {
    /// Configured duration for `stage`, if any
    pub fn get(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::Backlog => self.backlog,
            Stage::Develop => self.develop,
            Stage::SmokeTest => self.smoke_test,
            Stage::Test => self.test,
            Stage::Rework => self.rework,
            Stage::Regression => self.regression,
            Stage::Release => self.release,
        }
    }

    /// Set the duration for `stage`
    pub fn set(&mut self, stage: Stage, hours: f64) {
        let slot = match stage {
            Stage::Backlog => &mut self.backlog,
            Stage::Develop => &mut self.develop,
            Stage::SmokeTest => &mut self.smoke_test,
            Stage::Test => &mut self.test,
            Stage::Rework => &mut self.rework,
            Stage::Regression => &mut self.regression,
            Stage::Release => &mut self.release,
        };
        *slot = Some(hours);
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, stage: Stage, hours: f64) -> Self {
        self.set(stage, hours);
        self
    }
}

/// Fully loaded hourly rate per role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleCosts {
    #[serde(default)]
    pub developers: f64,

    #[serde(default)]
    pub testers: f64,

    #[serde(default)]
    pub business_analysts: f64,
}

impl RoleCosts {
    pub fn rate(&self, role: Role) -> f64 {
        match role {
            Role::Developer => self.developers,
            Role::Tester => self.testers,
            Role::BusinessAnalyst => self.business_analysts,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Developer headcount
    pub num_developers: usize,

    /// Tester headcount
    pub num_testers: usize,

    /// Business analyst headcount (only needed by the smoke-tested pipeline)
    #[serde(default)]
    pub num_business_analysts: usize,

    /// Maximum items between admission and release (None = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<usize>,

    /// Failure chance shared by every test gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_chance: Option<f64>,

    /// Smoke-test failure chance; overrides `failure_chance` for that gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoke_test_failure_chance: Option<f64>,

    /// Test failure chance; overrides `failure_chance` for that gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_failure_chance: Option<f64>,

    /// Service duration per stage (hours)
    pub durations: StageDurations,

    /// Number of work items spawned at time zero
    pub num_work_items: usize,

    /// Hourly cost per role
    #[serde(default)]
    pub costs: RoleCosts,

    /// Explicit pipeline layout; inferred from the durations when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Pipeline>,

    /// Seed for the failure draws
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// Logical-time watchdog (hours); the run halts here if still going
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<SimTime>,
}

fn default_rng_seed() -> u64 {
    DEFAULT_RNG_SEED
}

impl SimulationConfig {
    /// Minimal standard-pipeline config; durations and costs start empty
    pub fn new(num_developers: usize, num_testers: usize, num_work_items: usize) -> Self {
        Self {
            num_developers,
            num_testers,
            num_business_analysts: 0,
            wip_limit: None,
            failure_chance: None,
            smoke_test_failure_chance: None,
            test_failure_chance: None,
            durations: StageDurations::default(),
            num_work_items,
            costs: RoleCosts::default(),
            pipeline: None,
            rng_seed: DEFAULT_RNG_SEED,
            time_limit: None,
        }
    }

    /// Parse from a JSON string (not validated)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse from any reader yielding JSON (not validated)
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Pipeline layout in effect
    ///
    /// A configured smoke-test duration selects the smoke-tested pipeline
    /// unless the layout is set explicitly.
    pub fn pipeline(&self) -> Pipeline {
        match self.pipeline {
            Some(pipeline) => pipeline,
            None if self.durations.smoke_test.is_some() => Pipeline::SmokeTested,
            None => Pipeline::Standard,
        }
    }

    /// Headcount for `role`
    pub fn headcount(&self, role: Role) -> usize {
        match role {
            Role::Developer => self.num_developers,
            Role::Tester => self.num_testers,
            Role::BusinessAnalyst => self.num_business_analysts,
        }
    }

    /// Failure chance applied after `stage` (0 for non-gates)
    pub fn failure_chance_for(&self, stage: Stage) -> f64 {
        let specific = match stage {
            Stage::Test => self.test_failure_chance,
            Stage::SmokeTest => self.smoke_test_failure_chance,
            _ => return 0.0,
        };
        specific.or(self.failure_chance).unwrap_or(0.0)
    }

    /// Duration of `stage`, 0 when unset
    ///
    /// Only meaningful after [`validate`](Self::validate), which guarantees
    /// every stage the run can reach has a duration.
    pub fn duration(&self, stage: Stage) -> SimTime {
        self.durations.get(stage).unwrap_or(0.0)
    }

    /// Stages a run can actually visit
    ///
    /// Rework is only reachable when some gate can fail.
    pub fn reachable_stages(&self) -> Vec<Stage> {
        let pipeline = self.pipeline();
        let can_fail = pipeline
            .stages()
            .into_iter()
            .filter(|s| s.is_test_gate())
            .any(|gate| self.failure_chance_for(gate) > 0.0);
        pipeline
            .stages()
            .into_iter()
            .filter(|stage| *stage != Stage::Rework || can_fail)
            .collect()
    }

    /// Check every invariant the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_work_items == 0 {
            return Err(ConfigError::NoWorkItems);
        }
        if self.wip_limit == Some(0) {
            return Err(ConfigError::ZeroWipLimit);
        }

        for (field, value) in [
            ("failure_chance", self.failure_chance),
            ("smoke_test_failure_chance", self.smoke_test_failure_chance),
            ("test_failure_chance", self.test_failure_chance),
        ] {
            if let Some(p) = value {
                if !(0.0..=1.0).contains(&p) {
                    return Err(ConfigError::InvalidProbability { field, value: p });
                }
            }
        }

        for stage in Stage::ALL {
            if let Some(value) = self.durations.get(stage) {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidDuration { stage, value });
                }
            }
        }
        for stage in self.reachable_stages() {
            if self.durations.get(stage).is_none() {
                return Err(ConfigError::MissingDuration(stage));
            }
        }

        for role in Role::ALL {
            let value = self.costs.rate(role);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { role, value });
            }
        }

        for role in self.pipeline().roles() {
            if self.headcount(role) == 0 {
                return Err(ConfigError::EmptyPool(role));
            }
        }

        if let Some(limit) = self.time_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::InvalidTimeLimit(limit));
            }
        }

        Ok(())
    }

    /// SHA-256 fingerprint of the config's JSON form
    ///
    /// Two configs with the same hash produce identical runs.
    pub fn config_hash(&self) -> String {
        // Serializing plain structs of numbers and options cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
