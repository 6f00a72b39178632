//! Simulation substrate: logical clock and event queue

pub mod time;

pub use time::{EventQueue, SimTime};
