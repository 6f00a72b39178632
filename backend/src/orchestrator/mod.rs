//! Orchestrator - configuration and the main event loop
//!
//! See `engine.rs` for the loop itself and `config.rs` for the accepted
//! configuration shape.

pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{ConfigError, RoleCosts, SimulationConfig, StageDurations, DEFAULT_RNG_SEED};
pub use engine::{run_simulation, HaltReason, SimulationError, SimulationOutcome, Simulator};
