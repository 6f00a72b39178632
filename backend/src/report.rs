//! Plain-text run summary
//!
//! Collects the scalar results of one run into [`RunSummary`], whose
//! `Display` impl renders the report printed by the command-line front end.

use crate::core::SimTime;
use crate::metrics::MetricsSnapshot;
use crate::models::{Role, Stage};
use crate::orchestrator::{HaltReason, SimulationConfig, SimulationOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLine {
    pub stage: Stage,
    pub average_wait: SimTime,
    pub average_queue_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleLine {
    pub role: Role,
    pub headcount: usize,
    pub utilisation: f64,
}

/// Headline numbers of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub config_hash: String,
    pub elapsed_time: SimTime,
    pub completed_items: usize,
    pub abandoned_items: usize,
    pub halt: HaltReason,
    pub wip_limit: Option<usize>,
    pub total_cost: f64,
    pub cost_per_item: f64,
    pub mean_flow_efficiency: f64,
    pub mean_lead_time: SimTime,
    pub peak_wip: usize,
    pub roles: Vec<RoleLine>,
    pub stages: Vec<StageLine>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &SimulationOutcome, config: &SimulationConfig) -> Self {
        let snapshot = outcome.snapshot();

        // Unreachable stages (Rework with no failure chance) are left out.
        let reachable = config.reachable_stages();
        let stages = snapshot
            .stages
            .iter()
            .filter(|s| reachable.contains(&s.stage))
            .map(|s| StageLine {
                stage: s.stage,
                average_wait: s.average_wait,
                average_queue_length: s.average_queue_length,
            })
            .collect();

        let roles = snapshot
            .roles
            .iter()
            .map(|r| RoleLine {
                role: r.role,
                headcount: r.headcount,
                utilisation: r.utilisation,
            })
            .collect();

        Self {
            config_hash: outcome.config_hash.clone(),
            elapsed_time: outcome.elapsed_time,
            completed_items: snapshot.completed_items,
            abandoned_items: outcome.abandoned_items,
            halt: outcome.halt,
            wip_limit: config.wip_limit,
            total_cost: snapshot.total_cost,
            cost_per_item: snapshot.cost_per_item(),
            mean_flow_efficiency: snapshot.mean_flow_efficiency,
            mean_lead_time: snapshot.mean_lead_time,
            peak_wip: snapshot.peak_wip,
            roles,
            stages,
        }
    }
}

/// Summary plus full metrics, the machine-readable form of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SimulationConfig>,
    pub summary: RunSummary,
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    pub fn new(outcome: &SimulationOutcome, config: &SimulationConfig) -> Self {
        Self {
            config: None,
            summary: RunSummary::from_outcome(outcome, config),
            metrics: outcome.snapshot(),
        }
    }

    /// Embed the config that produced the run
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Simulation Results =====")?;
        let short_hash: String = self.config_hash.chars().take(12).collect();
        writeln!(f, "Config:            {}", short_hash)?;
        writeln!(f, "Run time:          {:.2} hours", self.elapsed_time)?;
        writeln!(f, "Completed items:   {}", self.completed_items)?;
        if self.halt == HaltReason::TimeLimit {
            writeln!(f, "Abandoned items:   {} (time limit reached)", self.abandoned_items)?;
        }
        match self.wip_limit {
            Some(limit) => writeln!(f, "WIP limit:         {}", limit)?,
            None => writeln!(f, "WIP limit:         none")?,
        }
        writeln!(f, "Peak WIP:          {}", self.peak_wip)?;
        writeln!(f, "Total cost:        ${:.2}", self.total_cost)?;
        writeln!(f, "Cost per item:     ${:.2}", self.cost_per_item)?;
        writeln!(f, "Mean lead time:    {:.2} hours", self.mean_lead_time)?;
        writeln!(f, "Flow efficiency:   {:.1}%", self.mean_flow_efficiency * 100.0)?;

        writeln!(f)?;
        writeln!(f, "Utilisation")?;
        for role in &self.roles {
            writeln!(
                f,
                "  {:<20} x{:<3} {:>6.1}%",
                role.role.label(),
                role.headcount,
                role.utilisation * 100.0
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{:<22} {:>12} {:>14}", "Stage", "Avg wait (h)", "Avg queue len")?;
        for stage in &self.stages {
            writeln!(
                f,
                "  {:<20} {:>12.2} {:>14.3}",
                stage.stage.name(),
                stage.average_wait,
                stage.average_queue_length
            )?;
        }
        Ok(())
    }
}
