//! Fully loaded team cost
//!
//! Cost is headcount × hourly rate × elapsed simulation time for every role.
//! It does not depend on how busy anyone was: the whole team is paid for the
//! whole span.

use crate::core::SimTime;
use crate::models::Role;
use crate::orchestrator::config::SimulationConfig;
use serde::{Deserialize, Serialize};

/// Cost attributed to one role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleCost {
    pub role: Role,
    pub headcount: usize,
    pub hourly_rate: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTracker {
    headcount: [usize; 3],
    rates: [f64; 3],
    simulation_time: SimTime,
}

impl CostTracker {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut headcount = [0; 3];
        let mut rates = [0.0; 3];
        for role in Role::ALL {
            headcount[role.index()] = config.headcount(role);
            rates[role.index()] = config.costs.rate(role);
        }
        Self {
            headcount,
            rates,
            simulation_time: 0.0,
        }
    }

    /// Stamp the elapsed time the cost is charged over
    pub fn set_simulation_time(&mut self, sim_time: SimTime) {
        self.simulation_time = sim_time;
    }

    pub fn simulation_time(&self) -> SimTime {
        self.simulation_time
    }

    /// Team cost per hour of simulated time
    pub fn hourly_burn(&self) -> f64 {
        Role::ALL
            .iter()
            .map(|role| self.headcount[role.index()] as f64 * self.rates[role.index()])
            .sum()
    }

    /// Per-role breakdown
    pub fn breakdown(&self) -> Vec<RoleCost> {
        Role::ALL
            .iter()
            .map(|&role| {
                let headcount = self.headcount[role.index()];
                let hourly_rate = self.rates[role.index()];
                RoleCost {
                    role,
                    headcount,
                    hourly_rate,
                    cost: self.simulation_time * headcount as f64 * hourly_rate,
                }
            })
            .collect()
    }

    /// Total cost over the stamped simulation time
    pub fn compute_total_cost(&self) -> f64 {
        self.breakdown().iter().map(|c| c.cost).sum()
    }
}
