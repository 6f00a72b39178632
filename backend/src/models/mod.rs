//! Domain models for the delivery pipeline simulator

pub mod event;
pub mod stage;
pub mod work_item;

// Re-exports
pub use event::{Event, EventLog};
pub use stage::{Pipeline, Role, Stage, Step};
pub use work_item::{ItemStatus, WorkItem, WorkItemError, WorkItemId};
