//! Event logging for simulation replay and auditing.
//!
//! Every state-machine transition a work item makes is captured as an
//! [`Event`]. The metrics collectors observe the same transitions, so the log
//! doubles as an audit trail: anything a metric claims can be recomputed from
//! the events.
//!
//! # Event Types
//!
//! - **Stage**: arrival in a queue, resource grant, service completion
//! - **Gate**: admission or blocking at the WIP limit
//! - **Branch**: a failed test gate sending the item to rework
//! - **Lifecycle**: item completion, forced halt
//!
//! # Example
//!
//! ```rust
//! use delivery_simulator_core_rs::models::{Event, EventLog, Stage, WorkItemId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::StageArrival { time: 0.0, item: WorkItemId(0), stage: Stage::Develop });
//!
//! assert_eq!(log.events_of_type("StageArrival").len(), 1);
//! ```

use crate::core::SimTime;
use crate::models::stage::{Role, Stage};
use crate::models::work_item::WorkItemId;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// Events are logged in processing order, which is non-decreasing in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Item joined a stage's resource queue
    StageArrival {
        time: SimTime,
        item: WorkItemId,
        stage: Stage,
    },

    /// Item was granted a unit of the stage's role
    ResourceGranted {
        time: SimTime,
        item: WorkItemId,
        stage: Stage,
        role: Role,
        waited: SimTime,
    },

    /// Service finished and the unit went back to the pool
    StageCompleted {
        time: SimTime,
        item: WorkItemId,
        stage: Stage,
        duration: SimTime,
    },

    /// Failure draw came up under the gate's failure chance
    TestFailed {
        time: SimTime,
        item: WorkItemId,
        stage: Stage,
    },

    /// Item passed the WIP gate
    Admitted {
        time: SimTime,
        item: WorkItemId,
        wip: usize,
    },

    /// Item is blocked at a full WIP gate
    AdmissionBlocked {
        time: SimTime,
        item: WorkItemId,
    },

    /// Item finished Release and left the system
    ItemCompleted {
        time: SimTime,
        item: WorkItemId,
        lead_time: SimTime,
        active_time: SimTime,
    },

    /// Watchdog stopped the run with items still in flight
    SimulationHalted {
        time: SimTime,
        in_flight: usize,
    },
}

impl Event {
    /// Time the event occurred
    pub fn time(&self) -> SimTime {
        match self {
            Event::StageArrival { time, .. } => *time,
            Event::ResourceGranted { time, .. } => *time,
            Event::StageCompleted { time, .. } => *time,
            Event::TestFailed { time, .. } => *time,
            Event::Admitted { time, .. } => *time,
            Event::AdmissionBlocked { time, .. } => *time,
            Event::ItemCompleted { time, .. } => *time,
            Event::SimulationHalted { time, .. } => *time,
        }
    }

    /// Short name of the event variant
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::StageArrival { .. } => "StageArrival",
            Event::ResourceGranted { .. } => "ResourceGranted",
            Event::StageCompleted { .. } => "StageCompleted",
            Event::TestFailed { .. } => "TestFailed",
            Event::Admitted { .. } => "Admitted",
            Event::AdmissionBlocked { .. } => "AdmissionBlocked",
            Event::ItemCompleted { .. } => "ItemCompleted",
            Event::SimulationHalted { .. } => "SimulationHalted",
        }
    }

    /// Work item the event concerns, if any
    pub fn item(&self) -> Option<WorkItemId> {
        match self {
            Event::StageArrival { item, .. }
            | Event::ResourceGranted { item, .. }
            | Event::StageCompleted { item, .. }
            | Event::TestFailed { item, .. }
            | Event::Admitted { item, .. }
            | Event::AdmissionBlocked { item, .. }
            | Event::ItemCompleted { item, .. } => Some(*item),
            Event::SimulationHalted { .. } => None,
        }
    }

    /// Stage the event concerns, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Event::StageArrival { stage, .. }
            | Event::ResourceGranted { stage, .. }
            | Event::StageCompleted { stage, .. }
            | Event::TestFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific work item
    pub fn events_for_item(&self, item: WorkItemId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.item() == Some(item))
            .collect()
    }

    /// Number of completed services of `stage` by `item`
    pub fn completed_visits(&self, item: WorkItemId, stage: Stage) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, Event::StageCompleted { item: i, stage: s, .. } if *i == item && *s == stage)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = Event::ResourceGranted {
            time: 3.5,
            item: WorkItemId(2),
            stage: Stage::Test,
            role: Role::Tester,
            waited: 1.0,
        };

        assert_eq!(event.time(), 3.5);
        assert_eq!(event.event_type(), "ResourceGranted");
        assert_eq!(event.item(), Some(WorkItemId(2)));
        assert_eq!(event.stage(), Some(Stage::Test));
    }

    #[test]
    fn test_halt_has_no_item() {
        let event = Event::SimulationHalted { time: 10.0, in_flight: 3 };
        assert_eq!(event.item(), None);
        assert_eq!(event.stage(), None);
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        for (item, stage) in [(0, Stage::Test), (0, Stage::Test), (1, Stage::Test), (0, Stage::Rework)] {
            log.log(Event::StageCompleted {
                time: 1.0,
                item: WorkItemId(item),
                stage,
                duration: 1.0,
            });
        }

        assert_eq!(log.len(), 4);
        assert_eq!(log.events_for_item(WorkItemId(0)).len(), 3);
        assert_eq!(log.completed_visits(WorkItemId(0), Stage::Test), 2);
        assert_eq!(log.completed_visits(WorkItemId(1), Stage::Rework), 0);
        assert_eq!(log.events_of_type("StageCompleted").len(), 4);
    }
}
