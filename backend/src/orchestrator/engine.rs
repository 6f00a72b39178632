//! Simulation engine
//!
//! Drives every work item through its pipeline program over logical time.
//!
//! # Architecture
//!
//! A single-threaded event loop. Each work item is a continuation: its
//! [`WorkItem`] status records where it is suspended, and a [`Wake`] event in
//! the [`EventQueue`] says when it resumes. Only one continuation runs at a
//! time, and it runs until the next suspension point:
//!
//! ```text
//! Start ─▶ Visit(stage) ─▶ request pool ─┬─ Granted  ─▶ (wake at now)
//!                                        └─ Queued   ─▶ (woken by a release)
//! Granted ─▶ record wait ─▶ hold for duration ─▶ (wake at now + duration)
//! ServiceDone ─▶ release (hand off) ─▶ next step ...
//! Admit ─▶ gate full? ─▶ (woken when an item completes)
//! Complete ─▶ WIP −1, flow sample, vacate gate
//! ```
//!
//! All shared mutation (pools, gate, collectors) happens inside one
//! [`Simulator::step`], so no locking is needed.
//!
//! # Example
//!
//! ```rust
//! use delivery_simulator_core_rs::models::Stage;
//! use delivery_simulator_core_rs::orchestrator::{SimulationConfig, Simulator, StageDurations};
//!
//! let mut config = SimulationConfig::new(2, 1, 5);
//! config.durations = StageDurations::default()
//!     .with(Stage::Backlog, 0.0)
//!     .with(Stage::Develop, 4.0)
//!     .with(Stage::Test, 2.0)
//!     .with(Stage::Regression, 1.0)
//!     .with(Stage::Release, 1.0);
//!
//! let outcome = Simulator::new(config).unwrap().run().unwrap();
//! assert_eq!(outcome.metrics.completed_items, 5);
//! ```

use crate::core::{EventQueue, SimTime};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::models::event::{Event, EventLog};
use crate::models::stage::{Role, Step};
use crate::models::work_item::{ItemStatus, WorkItem, WorkItemError, WorkItemId};
use crate::orchestrator::config::{ConfigError, SimulationConfig};
use crate::resources::{Acquire, AdmissionGate, GateError, PoolError, ResourcePools};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Simulation error types
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Deadlock at t={time}: {completed} of {target} items completed and nothing left to process")]
    Deadlock {
        time: SimTime,
        completed: usize,
        target: usize,
    },

    #[error("Unknown work item: {0}")]
    UnknownWorkItem(WorkItemId),

    #[error("Work item error: {0}")]
    WorkItem(#[from] WorkItemError),

    #[error("Resource pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Admission gate error: {0}")]
    Gate(#[from] GateError),
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// Every work item reached Done
    AllCompleted,
    /// The logical-time watchdog fired; in-flight items were abandoned
    TimeLimit,
}

/// Resumption of a suspended work item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    /// First run at spawn time
    Start(WorkItemId),
    /// A pool unit has been assigned
    Granted(WorkItemId),
    /// The stage duration has elapsed
    ServiceDone(WorkItemId),
    /// A gate slot has been handed over
    Admitted(WorkItemId),
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Finalized collectors
    pub metrics: Metrics,
    /// Logical time at which the run stopped
    pub elapsed_time: SimTime,
    pub halt: HaltReason,
    /// Items still in flight when the run stopped
    pub abandoned_items: usize,
    /// Full transition trace
    pub event_log: EventLog,
    /// Fingerprint of the config that produced this run
    pub config_hash: String,
    peak_in_use: [usize; 3],
    peak_admitted: usize,
}

impl SimulationOutcome {
    /// Serializable view of the metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Most units of `role` ever held at once
    pub fn peak_in_use(&self, role: Role) -> usize {
        self.peak_in_use[role.index()]
    }

    /// Most items ever admitted past the WIP gate at once
    pub fn peak_admitted(&self) -> usize {
        self.peak_admitted
    }
}

/// Main engine owning all simulation state
///
/// # Determinism
///
/// The only randomness is the failure draw, taken from a seeded xorshift64*
/// generator. Same config (including seed) gives an identical event log.
pub struct Simulator {
    config: SimulationConfig,
    queue: EventQueue<Wake>,
    pools: ResourcePools,
    gate: AdmissionGate,
    items: Vec<WorkItem>,
    metrics: Metrics,
    rng: RngManager,
    event_log: EventLog,
    completed: usize,
    halt: Option<HaltReason>,
}

impl Simulator {
    /// Validate `config` and spawn every work item at time zero
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let pipeline = config.pipeline();
        let pools = ResourcePools::new(
            config.num_developers,
            config.num_testers,
            config.num_business_analysts,
        );
        let gate = AdmissionGate::new(config.wip_limit);

        let mut queue = EventQueue::new();
        let items: Vec<WorkItem> = (0..config.num_work_items)
            .map(|i| WorkItem::new(WorkItemId(i), pipeline))
            .collect();
        for item in &items {
            queue.schedule(0.0, Wake::Start(item.id()));
        }

        Ok(Self {
            metrics: Metrics::new(&config),
            rng: RngManager::new(config.rng_seed),
            config,
            queue,
            pools,
            gate,
            items,
            event_log: EventLog::new(),
            completed: 0,
            halt: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current logical time
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub fn completed_items(&self) -> usize {
        self.completed
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn pools(&self) -> &ResourcePools {
        &self.pools
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Why the run stopped, once it has
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Run until every item is done or the watchdog fires
    #[instrument(skip(self), fields(work_items = self.items.len(), seed = self.config.rng_seed))]
    pub fn run(mut self) -> Result<SimulationOutcome, SimulationError> {
        info!(
            pipeline = ?self.config.pipeline(),
            wip_limit = ?self.config.wip_limit,
            "Starting simulation"
        );
        while self.step()? {}
        let outcome = self.finish();
        info!(
            elapsed = outcome.elapsed_time,
            completed = outcome.metrics.completed_items,
            abandoned = outcome.abandoned_items,
            "Simulation finished"
        );
        Ok(outcome)
    }

    /// Process the next event
    ///
    /// Returns `Ok(false)` once the run has stopped.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        if self.halt.is_some() {
            return Ok(false);
        }

        if let (Some(limit), Some(next)) = (self.config.time_limit, self.queue.peek_time()) {
            if next > limit {
                self.halt_at(limit);
                return Ok(false);
            }
        }

        let Some((_, wake)) = self.queue.pop() else {
            if self.completed == self.items.len() {
                self.halt = Some(HaltReason::AllCompleted);
                return Ok(false);
            }
            return Err(SimulationError::Deadlock {
                time: self.now(),
                completed: self.completed,
                target: self.items.len(),
            });
        };

        match wake {
            Wake::Start(id) => {
                self.item_mut(id)?.mark_ready();
                self.advance(id)?;
            }
            Wake::Granted(id) => self.begin_service(id)?,
            Wake::ServiceDone(id) => self.end_service(id)?,
            Wake::Admitted(id) => {
                self.on_admitted(id)?;
                self.advance(id)?;
            }
        }
        Ok(true)
    }

    fn halt_at(&mut self, limit: SimTime) {
        self.queue.advance_to(limit);
        let in_flight = self.items.len() - self.completed;
        warn!(time = limit, in_flight, "Time limit reached; abandoning in-flight items");
        self.event_log.log(Event::SimulationHalted {
            time: limit,
            in_flight,
        });
        self.halt = Some(HaltReason::TimeLimit);
    }

    fn finish(mut self) -> SimulationOutcome {
        let elapsed_time = self.now();
        self.metrics.finalize(elapsed_time);

        let mut peak_in_use = [0; 3];
        for pool in self.pools.iter() {
            peak_in_use[pool.role().index()] = pool.peak_in_use();
        }

        SimulationOutcome {
            elapsed_time,
            halt: self.halt.unwrap_or(HaltReason::AllCompleted),
            abandoned_items: self.items.iter().filter(|i| !i.is_done()).count(),
            config_hash: self.config.config_hash(),
            peak_in_use,
            peak_admitted: self.gate.peak(),
            metrics: self.metrics,
            event_log: self.event_log,
        }
    }

    // ========================================================================
    // Work Item Continuations
    // ========================================================================

    fn item_mut(&mut self, id: WorkItemId) -> Result<&mut WorkItem, SimulationError> {
        self.items
            .get_mut(id.0)
            .ok_or(SimulationError::UnknownWorkItem(id))
    }

    /// Run `id` forward until it suspends
    fn advance(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        loop {
            let now = self.now();
            match self.item_mut(id)?.next_step() {
                Step::Visit(stage) => {
                    let arrival = self.metrics.queue_tracker.record_arrival(stage, now);
                    self.metrics.queue_tracker.queue_enter(stage, now);
                    self.item_mut(id)?.mark_queued(stage, arrival)?;
                    self.event_log.log(Event::StageArrival {
                        time: now,
                        item: id,
                        stage,
                    });

                    let pool = self.pools.get_mut(stage.role());
                    if pool.request(id, stage.priority()) == Acquire::Granted {
                        self.grant(id)?;
                    }
                    return Ok(());
                }
                Step::Admit => {
                    if self.gate.admit(id) {
                        self.on_admitted(id)?;
                        continue;
                    }
                    self.item_mut(id)?.mark_awaiting_admission(now)?;
                    self.event_log.log(Event::AdmissionBlocked { time: now, item: id });
                    debug!(item = %id, time = now, "Blocked at WIP gate");
                    return Ok(());
                }
                Step::ReworkCheck(gate) => {
                    let chance = self.config.failure_chance_for(gate);
                    if self.rng.chance(chance) {
                        self.item_mut(id)?.schedule_rework(gate);
                        self.event_log.log(Event::TestFailed {
                            time: now,
                            item: id,
                            stage: gate,
                        });
                        debug!(item = %id, %gate, time = now, "Failed test gate; routing to rework");
                    }
                }
                Step::Complete => return self.complete(id),
            }
        }
    }

    /// A pool unit now belongs to `id`; resume it at the current instant
    fn grant(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        self.item_mut(id)?.mark_granted()?;
        let now = self.now();
        self.queue.schedule(now, Wake::Granted(id));
        Ok(())
    }

    fn begin_service(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        let now = self.now();
        let (stage, arrival) = self.item_mut(id)?.begin_service(now)?;

        self.metrics.queue_tracker.record_wait(stage, now, arrival);
        self.metrics.queue_tracker.queue_exit(stage, now);
        self.event_log.log(Event::ResourceGranted {
            time: now,
            item: id,
            stage,
            role: stage.role(),
            waited: now - arrival,
        });

        self.queue
            .schedule_in(self.config.duration(stage), Wake::ServiceDone(id));
        Ok(())
    }

    fn end_service(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        let now = self.now();
        let stage = match self.item_mut(id)?.status() {
            ItemStatus::InService { stage, .. } => stage,
            _ => {
                // Let the work item report the illegal transition.
                self.item_mut(id)?.finish_service(0.0)?;
                return Ok(());
            }
        };
        let duration = self.config.duration(stage);
        let (stage, granted_at) = self.item_mut(id)?.finish_service(duration)?;

        self.metrics
            .utilisation
            .add_busy(stage.role(), granted_at, now);
        if let Some(next) = self.pools.get_mut(stage.role()).release()? {
            self.grant(next.item)?;
        }
        self.event_log.log(Event::StageCompleted {
            time: now,
            item: id,
            stage,
            duration,
        });

        self.advance(id)
    }

    fn on_admitted(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        let now = self.now();
        self.item_mut(id)?.admit(now)?;
        self.metrics.wip_tracker.log_wip(now, 1);
        let wip = self.metrics.wip_tracker.current();
        self.event_log.log(Event::Admitted {
            time: now,
            item: id,
            wip,
        });
        debug!(item = %id, time = now, wip, "Admitted past backlog");
        Ok(())
    }

    fn complete(&mut self, id: WorkItemId) -> Result<(), SimulationError> {
        let now = self.now();
        let item = self.item_mut(id)?;
        let lead_time = item.complete(now)?;
        let active_time = item.active_time();
        let entry_time = item.entry_time().unwrap_or(now);

        self.metrics.wip_tracker.log_wip(now, -1);
        self.metrics.completed_items += 1;
        self.completed += 1;
        self.metrics.flow.item_exit(entry_time, active_time, now);
        self.event_log.log(Event::ItemCompleted {
            time: now,
            item: id,
            lead_time,
            active_time,
        });
        debug!(item = %id, time = now, lead_time, active_time, "Work item released");

        if let Some(next) = self.gate.vacate()? {
            self.queue.schedule(now, Wake::Admitted(next));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("now", &self.now())
            .field("work_items", &self.items.len())
            .field("completed", &self.completed)
            .field("pending_events", &self.queue.len())
            .field("halt", &self.halt)
            .finish()
    }
}

/// Build a simulator for `config` and run it to the end
pub fn run_simulation(config: SimulationConfig) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new(config)?.run()
}
