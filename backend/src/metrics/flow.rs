//! Flow efficiency: active (value-adding) time over lead time

use crate::core::SimTime;
use serde::{Deserialize, Serialize};

/// Timing of one completed item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowSample {
    pub lead_time: SimTime,
    pub active_time: SimTime,
}

impl FlowSample {
    /// `active / lead` in `[0, 1]`, 0 when lead time is 0
    ///
    /// Lead time is a clock difference while active time is a separate sum
    /// of the same durations, so rounding can push the raw ratio past 1.
    pub fn efficiency(&self) -> f64 {
        if self.lead_time > 0.0 {
            (self.active_time / self.lead_time).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowTracker {
    samples: Vec<FlowSample>,
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item leaving at `now` that entered at `entry_time`
    pub fn item_exit(&mut self, entry_time: SimTime, active_time: SimTime, now: SimTime) {
        self.samples.push(FlowSample {
            lead_time: now - entry_time,
            active_time,
        });
    }

    pub fn samples(&self) -> &[FlowSample] {
        &self.samples
    }

    pub fn lead_times(&self) -> Vec<SimTime> {
        self.samples.iter().map(|s| s.lead_time).collect()
    }

    pub fn efficiencies(&self) -> Vec<f64> {
        self.samples.iter().map(FlowSample::efficiency).collect()
    }

    /// Arithmetic mean efficiency, 0 when nothing completed
    pub fn mean_efficiency(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(FlowSample::efficiency).sum::<f64>() / self.samples.len() as f64
    }

    /// Mean lead time, 0 when nothing completed
    pub fn mean_lead_time(&self) -> SimTime {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.lead_time).sum::<f64>() / self.samples.len() as f64
    }

    /// Counts of efficiencies in `bins` equal-width buckets over `[0, 1]`
    ///
    /// Values at or above 1 land in the last bucket.
    pub fn histogram(&self, bins: usize) -> Vec<usize> {
        let mut counts = vec![0; bins];
        if bins == 0 {
            return counts;
        }
        for efficiency in self.efficiencies() {
            let bucket = ((efficiency.clamp(0.0, 1.0) * bins as f64) as usize).min(bins - 1);
            counts[bucket] += 1;
        }
        counts
    }
}
