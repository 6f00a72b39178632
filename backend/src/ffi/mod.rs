//! PyO3 bindings
//!
//! Configurations cross the boundary as JSON strings and results come back
//! as JSON strings, so Python callers can use the same config files as the
//! command-line front end.
//!
//! ```python
//! from delivery_simulator_core_rs import run_simulation
//!
//! result = json.loads(run_simulation(open("config.json").read()))
//! print(result["summary"]["completed_items"])
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use serde::Serialize;

use crate::optimiser::{weeks_to_hours, GridSearch};
use crate::orchestrator::{SimulationConfig, SimulationError, Simulator};
use crate::report::RunReport;

fn parse_config(config_json: &str) -> PyResult<SimulationConfig> {
    SimulationConfig::from_json_str(config_json)
        .map_err(|e| PyErr::new::<PyValueError, _>(format!("Invalid configuration: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Failed to encode result: {}", e)))
}

fn simulation_err(e: SimulationError) -> PyErr {
    match e {
        SimulationError::InvalidConfig(_) => PyErr::new::<PyValueError, _>(e.to_string()),
        _ => PyErr::new::<PyRuntimeError, _>(format!("Simulation failed: {}", e)),
    }
}

/// Run one simulation and return summary and metrics as JSON
#[pyfunction]
pub fn run_simulation(config_json: &str) -> PyResult<String> {
    let config = parse_config(config_json)?;
    let outcome = Simulator::new(config.clone())
        .and_then(Simulator::run)
        .map_err(simulation_err)?;

    to_json(&RunReport::new(&outcome, &config))
}

/// Grid search over staffing levels; ranges are inclusive
#[pyfunction]
#[pyo3(signature = (config_json, developers, testers, wip_limits, deadline_weeks=None))]
pub fn optimise(
    config_json: &str,
    developers: (usize, usize),
    testers: (usize, usize),
    wip_limits: (usize, usize),
    deadline_weeks: Option<f64>,
) -> PyResult<String> {
    let base = parse_config(config_json)?;
    let mut search = GridSearch::new(
        developers.0..=developers.1,
        testers.0..=testers.1,
        wip_limits.0..=wip_limits.1,
    );
    if let Some(weeks) = deadline_weeks {
        search = search.with_deadline(weeks_to_hours(weeks));
    }

    let result = search
        .run(&base)
        .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;
    to_json(&result)
}
