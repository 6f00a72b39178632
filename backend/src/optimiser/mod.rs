//! Grid-search staffing optimiser
//!
//! Runs one simulation per (developers, testers, WIP limit) combination over
//! a base configuration, discards runs that miss the delivery deadline, and
//! picks the cheapest cost per completed item.
//!
//! # Example
//!
//! ```rust
//! use delivery_simulator_core_rs::models::Stage;
//! use delivery_simulator_core_rs::optimiser::GridSearch;
//! use delivery_simulator_core_rs::orchestrator::{SimulationConfig, StageDurations};
//!
//! let mut base = SimulationConfig::new(1, 1, 4);
//! base.durations = StageDurations::default()
//!     .with(Stage::Backlog, 0.0)
//!     .with(Stage::Develop, 4.0)
//!     .with(Stage::Test, 2.0)
//!     .with(Stage::Regression, 1.0)
//!     .with(Stage::Release, 1.0);
//! base.costs.developers = 50.0;
//! base.costs.testers = 40.0;
//!
//! let search = GridSearch::new(1..=2, 1..=1, 1..=2);
//! let result = search.run(&base).unwrap();
//! assert_eq!(result.evaluated, 4);
//! assert!(result.best.is_some());
//! ```

use crate::core::SimTime;
use crate::orchestrator::{run_simulation, SimulationConfig, SimulationError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Working days per week and hours per working day
pub const WORK_DAYS_PER_WEEK: f64 = 5.0;
pub const WORK_HOURS_PER_DAY: f64 = 8.0;

/// Convert a deadline in working weeks to simulated hours
pub fn weeks_to_hours(weeks: f64) -> SimTime {
    weeks * WORK_DAYS_PER_WEEK * WORK_HOURS_PER_DAY
}

#[derive(Debug, Error, PartialEq)]
pub enum OptimiserError {
    #[error("Search range for {0} is empty")]
    EmptyRange(&'static str),

    #[error("Candidate with {developers} developers, {testers} testers, WIP {wip_limit} failed: {source}")]
    Simulation {
        developers: usize,
        testers: usize,
        wip_limit: usize,
        #[source]
        source: SimulationError,
    },
}

/// One evaluated staffing combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub developers: usize,
    pub testers: usize,
    pub wip_limit: usize,
    pub elapsed_time: SimTime,
    pub completed_items: usize,
    pub total_cost: f64,
    pub cost_per_item: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisationResult {
    /// Candidates that met the deadline, in search order
    pub candidates: Vec<Candidate>,
    /// Cheapest per item; the earliest wins a tie
    pub best: Option<Candidate>,
    /// Runs discarded for missing the deadline
    pub skipped: usize,
    /// Runs executed, including skipped ones
    pub evaluated: usize,
}

/// Exhaustive search over staffing levels and WIP limits
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearch {
    pub developers: RangeInclusive<usize>,
    pub testers: RangeInclusive<usize>,
    pub wip_limits: RangeInclusive<usize>,
    /// Runs finishing later than this (hours) are skipped
    pub delivery_deadline: Option<SimTime>,
}

impl GridSearch {
    pub fn new(
        developers: RangeInclusive<usize>,
        testers: RangeInclusive<usize>,
        wip_limits: RangeInclusive<usize>,
    ) -> Self {
        Self {
            developers,
            testers,
            wip_limits,
            delivery_deadline: None,
        }
    }

    pub fn with_deadline(mut self, hours: SimTime) -> Self {
        self.delivery_deadline = Some(hours);
        self
    }

    fn check_ranges(&self) -> Result<(), OptimiserError> {
        if self.developers.is_empty() {
            return Err(OptimiserError::EmptyRange("developers"));
        }
        if self.testers.is_empty() {
            return Err(OptimiserError::EmptyRange("testers"));
        }
        if self.wip_limits.is_empty() {
            return Err(OptimiserError::EmptyRange("wip_limits"));
        }
        Ok(())
    }

    /// Evaluate every combination against `base`
    #[instrument(skip(self, base), fields(deadline = ?self.delivery_deadline))]
    pub fn run(&self, base: &SimulationConfig) -> Result<OptimisationResult, OptimiserError> {
        self.check_ranges()?;

        let mut result = OptimisationResult {
            candidates: Vec::new(),
            best: None,
            skipped: 0,
            evaluated: 0,
        };

        for developers in self.developers.clone() {
            for testers in self.testers.clone() {
                for wip_limit in self.wip_limits.clone() {
                    let mut config = base.clone();
                    config.num_developers = developers;
                    config.num_testers = testers;
                    config.wip_limit = Some(wip_limit);

                    let outcome = run_simulation(config).map_err(|source| {
                        OptimiserError::Simulation {
                            developers,
                            testers,
                            wip_limit,
                            source,
                        }
                    })?;
                    result.evaluated += 1;

                    if let Some(deadline) = self.delivery_deadline {
                        if outcome.elapsed_time > deadline {
                            debug!(developers, testers, wip_limit, elapsed = outcome.elapsed_time, "Missed deadline");
                            result.skipped += 1;
                            continue;
                        }
                    }

                    let total_cost = outcome.metrics.total_cost();
                    let completed_items = outcome.metrics.completed_items;
                    let candidate = Candidate {
                        developers,
                        testers,
                        wip_limit,
                        elapsed_time: outcome.elapsed_time,
                        completed_items,
                        total_cost,
                        cost_per_item: total_cost / completed_items.max(1) as f64,
                    };

                    let improves = result
                        .best
                        .as_ref()
                        .map_or(true, |best| candidate.cost_per_item < best.cost_per_item);
                    if improves {
                        result.best = Some(candidate.clone());
                    }
                    result.candidates.push(candidate);
                }
            }
        }

        info!(
            evaluated = result.evaluated,
            skipped = result.skipped,
            best_cost_per_item = result.best.as_ref().map(|b| b.cost_per_item),
            "Grid search finished"
        );
        Ok(result)
    }
}
