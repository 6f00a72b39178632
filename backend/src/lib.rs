//! Delivery Simulator Core - Rust Engine
//!
//! Discrete-event simulation of a software delivery pipeline with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Logical clock and event queue
//! - **models**: Domain types (Stage, Role, Pipeline, WorkItem, Event)
//! - **resources**: Priority worker pools and the WIP admission gate
//! - **metrics**: Queue, WIP, utilisation, flow and cost collectors
//! - **orchestrator**: Configuration and the main event loop
//! - **optimiser**: Grid search over staffing levels
//! - **report**: Plain-text run summary
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Every work item that is admitted either completes or is counted as
//!    abandoned when the watchdog fires
//! 2. A pool never has more units in use than its capacity
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod core;
pub mod metrics;
pub mod models;
pub mod optimiser;
pub mod orchestrator;
pub mod report;
pub mod resources;
pub mod rng;

// Re-exports for convenience
pub use core::time::{EventQueue, SimTime};
pub use metrics::{Metrics, MetricsSnapshot};
pub use models::{
    event::{Event, EventLog},
    stage::{Pipeline, Role, Stage, Step},
    work_item::{ItemStatus, WorkItem, WorkItemError, WorkItemId},
};
pub use optimiser::{weeks_to_hours, Candidate, GridSearch, OptimisationResult, OptimiserError};
pub use orchestrator::{
    run_simulation, ConfigError, HaltReason, RoleCosts, SimulationConfig, SimulationError,
    SimulationOutcome, Simulator, StageDurations,
};
pub use report::{RunReport, RunSummary};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn delivery_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::optimise, m)?)?;
    Ok(())
}
