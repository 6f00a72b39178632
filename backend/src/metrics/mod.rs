//! Metrics collectors
//!
//! Passive observers fed by the engine at each state-machine transition:
//!
//! - [`QueueTracker`]: wait times and time-integrated queue length per stage
//! - [`WipTracker`]: items-in-system step function
//! - [`UtilisationTracker`]: busy time per role
//! - [`FlowTracker`]: lead time and active time per completed item
//! - [`CostTracker`]: headcount cost over elapsed time
//!
//! [`Metrics`] bundles them. After a run, [`Metrics::snapshot`] produces the
//! serializable [`MetricsSnapshot`] consumed by reporting code.

pub mod cost_tracker;
pub mod flow;
pub mod queue_tracker;
pub mod utilisation;
pub mod wip_tracker;

pub use cost_tracker::{CostTracker, RoleCost};
pub use flow::{FlowSample, FlowTracker};
pub use queue_tracker::{QueueTracker, StageQueue};
pub use utilisation::UtilisationTracker;
pub use wip_tracker::{WipBand, WipSample, WipSegment, WipTracker};

use crate::core::SimTime;
use crate::models::{Pipeline, Role, Stage};
use crate::orchestrator::config::SimulationConfig;
use serde::{Deserialize, Serialize};

/// All collectors for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub queue_tracker: QueueTracker,
    pub wip_tracker: WipTracker,
    pub utilisation: UtilisationTracker,
    pub flow: FlowTracker,
    pub cost_tracker: CostTracker,
    pub completed_items: usize,
    pipeline: Pipeline,
    headcount: [usize; 3],
    elapsed_time: SimTime,
}

impl Metrics {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut headcount = [0; 3];
        for role in Role::ALL {
            headcount[role.index()] = config.headcount(role);
        }
        Self {
            queue_tracker: QueueTracker::new(),
            wip_tracker: WipTracker::new(),
            utilisation: UtilisationTracker::new(),
            flow: FlowTracker::new(),
            cost_tracker: CostTracker::new(config),
            completed_items: 0,
            pipeline: config.pipeline(),
            headcount,
            elapsed_time: 0.0,
        }
    }

    /// Close the time integrals and stamp the elapsed time into the cost
    /// calculator
    pub fn finalize(&mut self, elapsed: SimTime) {
        self.elapsed_time = elapsed;
        self.queue_tracker.finalize(elapsed);
        self.cost_tracker.set_simulation_time(elapsed);
    }

    pub fn elapsed_time(&self) -> SimTime {
        self.elapsed_time
    }

    pub fn headcount(&self, role: Role) -> usize {
        self.headcount[role.index()]
    }

    /// Reported (clamped) utilisation of `role` over the run
    pub fn utilisation_of(&self, role: Role) -> f64 {
        self.utilisation
            .utilisation(role, self.headcount(role), self.elapsed_time)
    }

    /// Mean flow efficiency across completed items
    pub fn flow_efficiency(&self) -> f64 {
        self.flow.mean_efficiency()
    }

    /// Team cost over the elapsed time
    pub fn total_cost(&self) -> f64 {
        self.cost_tracker.compute_total_cost()
    }

    /// Read-only view of every result
    pub fn snapshot(&self) -> MetricsSnapshot {
        let elapsed = self.elapsed_time;
        let stages = self
            .pipeline
            .stages()
            .into_iter()
            .map(|stage| {
                let queue = self.queue_tracker.stage(stage);
                StageMetrics {
                    stage,
                    visits: queue.wait_times.len(),
                    wait_times: queue.wait_times.clone(),
                    average_wait: self.queue_tracker.average_wait(stage),
                    average_queue_length: self.queue_tracker.average_queue_length(stage, elapsed),
                    peak_queue_length: queue.peak_length,
                }
            })
            .collect();

        let roles = self
            .pipeline
            .roles()
            .into_iter()
            .map(|role| RoleMetrics {
                role,
                headcount: self.headcount(role),
                busy_time: self.utilisation.busy_time(role),
                utilisation: self.utilisation_of(role),
            })
            .collect();

        MetricsSnapshot {
            completed_items: self.completed_items,
            elapsed_time: elapsed,
            stages,
            roles,
            wip_log: self.wip_tracker.log().to_vec(),
            peak_wip: self.wip_tracker.peak(),
            average_wip: self.wip_tracker.time_average(elapsed),
            flow_efficiencies: self.flow.efficiencies(),
            mean_flow_efficiency: self.flow.mean_efficiency(),
            lead_times: self.flow.lead_times(),
            mean_lead_time: self.flow.mean_lead_time(),
            costs: self.cost_tracker.breakdown(),
            total_cost: self.total_cost(),
        }
    }
}

/// Per-stage results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub stage: Stage,
    /// Number of granted requests
    pub visits: usize,
    pub wait_times: Vec<SimTime>,
    pub average_wait: SimTime,
    pub average_queue_length: f64,
    pub peak_queue_length: usize,
}

/// Per-role results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMetrics {
    pub role: Role,
    pub headcount: usize,
    pub busy_time: SimTime,
    /// Clamped to `[0, 1]`
    pub utilisation: f64,
}

/// Everything a run measured, detached from the collectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub completed_items: usize,
    pub elapsed_time: SimTime,
    pub stages: Vec<StageMetrics>,
    pub roles: Vec<RoleMetrics>,
    pub wip_log: Vec<WipSample>,
    pub peak_wip: usize,
    pub average_wip: f64,
    pub flow_efficiencies: Vec<f64>,
    pub mean_flow_efficiency: f64,
    pub lead_times: Vec<SimTime>,
    pub mean_lead_time: SimTime,
    pub costs: Vec<RoleCost>,
    pub total_cost: f64,
}

impl MetricsSnapshot {
    pub fn stage(&self, stage: Stage) -> Option<&StageMetrics> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn role(&self, role: Role) -> Option<&RoleMetrics> {
        self.roles.iter().find(|r| r.role == role)
    }

    /// Total cost divided by completed items (at least one)
    pub fn cost_per_item(&self) -> f64 {
        self.total_cost / self.completed_items.max(1) as f64
    }
}
