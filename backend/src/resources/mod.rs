//! Shared, capacity-bounded resources
//!
//! - [`ResourcePool`]: non-preemptive priority server for one worker role
//! - [`ResourcePools`]: the three role pools, addressed by [`Role`](crate::models::Role)
//! - [`AdmissionGate`]: WIP limiter between Backlog and Develop
//!
//! These are the only mutable state shared between work items. All mutation
//! happens inside a single engine step, so no locking is involved.

pub mod gate;
pub mod pool;

pub use gate::AdmissionGate;
pub use gate::GateError;
pub use pool::{Acquire, PoolError, PoolRequest, ResourcePool, ResourcePools};
