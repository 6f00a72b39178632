//! Work item model
//!
//! A work item is one unit of deliverable work. It walks its pipeline program
//! one step at a time and carries the explicit continuation state the engine
//! needs to resume it after every suspension point (resource queue, service
//! hold, admission gate).
//!
//! Lifecycle:
//! ```text
//! NotStarted → Queued → Granted → InService → Ready → ... → Done
//!                                               ↘ AwaitingAdmission ↗
//! ```

use crate::core::SimTime;
use crate::models::stage::{Pipeline, Stage, Step};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Ordinal identity of a work item (0-based spawn order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkItemId(pub usize);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item_{:05}", self.0)
    }
}

/// Where a work item currently is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Spawned but not yet run
    NotStarted,

    /// Between steps, about to pick up the next one
    Ready,

    /// Waiting in a stage's resource queue
    Queued {
        stage: Stage,
        /// When the item joined the queue
        arrival: SimTime,
    },

    /// Resource unit assigned, continuation not yet resumed
    Granted { stage: Stage, arrival: SimTime },

    /// Holding a resource unit for the stage duration
    InService {
        stage: Stage,
        /// When service began
        granted_at: SimTime,
    },

    /// Blocked at the WIP gate
    AwaitingAdmission { since: SimTime },

    /// Released; terminal
    Done { at: SimTime },
}

impl ItemStatus {
    fn label(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "NotStarted",
            ItemStatus::Ready => "Ready",
            ItemStatus::Queued { .. } => "Queued",
            ItemStatus::Granted { .. } => "Granted",
            ItemStatus::InService { .. } => "InService",
            ItemStatus::AwaitingAdmission { .. } => "AwaitingAdmission",
            ItemStatus::Done { .. } => "Done",
        }
    }
}

/// Errors raised by illegal lifecycle transitions
#[derive(Debug, Error, PartialEq)]
pub enum WorkItemError {
    #[error("{id}: cannot move to {to} from {from}")]
    InvalidTransition {
        id: WorkItemId,
        from: &'static str,
        to: &'static str,
    },
}

/// A single unit of work flowing through the pipeline
///
/// # Example
/// ```
/// use delivery_simulator_core_rs::models::{Pipeline, Stage, Step, WorkItem, WorkItemId};
///
/// let mut item = WorkItem::new(WorkItemId(0), Pipeline::Standard);
/// assert_eq!(item.next_step(), Step::Visit(Stage::Backlog));
/// assert_eq!(item.next_step(), Step::Admit);
/// ```
#[derive(Debug, Clone)]
pub struct WorkItem {
    id: WorkItemId,
    program: &'static [Step],
    /// Index of the next program step
    cursor: usize,
    /// Rework/retest visits injected by a failed test gate
    detour: VecDeque<Stage>,
    status: ItemStatus,
    /// Sum of service durations for value-adding stages
    active_time: SimTime,
    /// When the item was admitted past Backlog
    entry_time: Option<SimTime>,
    rework_count: usize,
}

impl WorkItem {
    /// Create a work item that will follow `pipeline`
    pub fn new(id: WorkItemId, pipeline: Pipeline) -> Self {
        Self {
            id,
            program: pipeline.program(),
            cursor: 0,
            detour: VecDeque::new(),
            status: ItemStatus::NotStarted,
            active_time: 0.0,
            entry_time: None,
            rework_count: 0,
        }
    }

    pub fn id(&self) -> WorkItemId {
        self.id
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn active_time(&self) -> SimTime {
        self.active_time
    }

    pub fn entry_time(&self) -> Option<SimTime> {
        self.entry_time
    }

    /// Number of failed test gates this item has been reworked for
    pub fn rework_count(&self) -> usize {
        self.rework_count
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, ItemStatus::Done { .. })
    }

    /// Take the next step, draining any pending detour first
    ///
    /// Past the end of the program this keeps returning `Complete`.
    pub fn next_step(&mut self) -> Step {
        if let Some(stage) = self.detour.pop_front() {
            return Step::Visit(stage);
        }
        match self.program.get(self.cursor) {
            Some(step) => {
                self.cursor += 1;
                *step
            }
            None => Step::Complete,
        }
    }

    /// Route the item through Rework and a single retest of `gate`
    pub fn schedule_rework(&mut self, gate: Stage) {
        self.rework_count += 1;
        self.detour.push_back(Stage::Rework);
        self.detour.push_back(gate);
    }

    /// Leave `NotStarted` (or an interrupted step) and pick up the program
    pub fn mark_ready(&mut self) {
        self.status = ItemStatus::Ready;
    }

    /// Joined the resource queue for `stage`
    pub fn mark_queued(&mut self, stage: Stage, now: SimTime) -> Result<(), WorkItemError> {
        self.require(matches!(self.status, ItemStatus::Ready | ItemStatus::NotStarted), "Queued")?;
        self.status = ItemStatus::Queued { stage, arrival: now };
        Ok(())
    }

    /// A resource unit has been assigned to this item
    pub fn mark_granted(&mut self) -> Result<(), WorkItemError> {
        match self.status {
            ItemStatus::Queued { stage, arrival } => {
                self.status = ItemStatus::Granted { stage, arrival };
                Ok(())
            }
            _ => self.reject("Granted"),
        }
    }

    /// Resume after a grant; returns the stage and the queue arrival time
    pub fn begin_service(&mut self, now: SimTime) -> Result<(Stage, SimTime), WorkItemError> {
        match self.status {
            ItemStatus::Granted { stage, arrival } => {
                self.status = ItemStatus::InService { stage, granted_at: now };
                Ok((stage, arrival))
            }
            _ => self.reject("InService"),
        }
    }

    /// Service elapsed; credits active time and returns (stage, service start)
    pub fn finish_service(&mut self, duration: SimTime) -> Result<(Stage, SimTime), WorkItemError> {
        match self.status {
            ItemStatus::InService { stage, granted_at } => {
                if stage.counts_as_active() {
                    self.active_time += duration;
                }
                self.status = ItemStatus::Ready;
                Ok((stage, granted_at))
            }
            _ => self.reject("Ready"),
        }
    }

    /// Blocked at the WIP gate
    pub fn mark_awaiting_admission(&mut self, now: SimTime) -> Result<(), WorkItemError> {
        self.require(self.status == ItemStatus::Ready, "AwaitingAdmission")?;
        self.status = ItemStatus::AwaitingAdmission { since: now };
        Ok(())
    }

    /// Passed the WIP gate; starts the lead-time clock
    pub fn admit(&mut self, now: SimTime) -> Result<(), WorkItemError> {
        self.require(
            matches!(self.status, ItemStatus::Ready | ItemStatus::AwaitingAdmission { .. }),
            "Admitted",
        )?;
        self.entry_time = Some(now);
        self.status = ItemStatus::Ready;
        Ok(())
    }

    /// Reached Done; returns the lead time
    pub fn complete(&mut self, now: SimTime) -> Result<SimTime, WorkItemError> {
        self.require(self.status == ItemStatus::Ready, "Done")?;
        self.status = ItemStatus::Done { at: now };
        Ok(now - self.entry_time.unwrap_or(now))
    }

    fn require(&self, ok: bool, to: &'static str) -> Result<(), WorkItemError> {
        if ok {
            Ok(())
        } else {
            Err(WorkItemError::InvalidTransition {
                id: self.id,
                from: self.status.label(),
                to,
            })
        }
    }

    fn reject<T>(&self, to: &'static str) -> Result<T, WorkItemError> {
        Err(WorkItemError::InvalidTransition {
            id: self.id,
            from: self.status.label(),
            to,
        })
    }
}
