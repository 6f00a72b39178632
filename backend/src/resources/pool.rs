//! Priority-arbitrated worker pool
//!
//! A pool has a fixed number of units. A request is granted at once when a
//! unit is free; otherwise it waits. When a unit is released it goes straight
//! to the waiting request with the lowest priority number, earliest request
//! first among equals. Holders are never interrupted (non-preemptive).

use crate::models::{Role, WorkItemId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

/// A pending claim on one unit of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRequest {
    pub item: WorkItemId,
    pub priority: u8,
    /// Request order, used to keep equal priorities first-come first-served
    pub seq: u64,
}

impl Ord for PoolRequest {
    // Reversed so the max-heap pops the lowest (priority, seq).
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PoolRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A unit was free and now belongs to the caller
    Granted,
    /// The caller joined the wait queue
    Queued,
}

/// Errors from pool bookkeeping
#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("{role} pool released with no unit in use")]
    ReleaseWithoutGrant { role: Role },
}

/// Finite-capacity server for one worker role
///
/// # Example
/// ```
/// use delivery_simulator_core_rs::models::{Role, WorkItemId};
/// use delivery_simulator_core_rs::resources::{Acquire, ResourcePool};
///
/// let mut devs = ResourcePool::new(Role::Developer, 1);
/// assert_eq!(devs.request(WorkItemId(0), 4), Acquire::Granted);
/// assert_eq!(devs.request(WorkItemId(1), 4), Acquire::Queued);
/// assert_eq!(devs.request(WorkItemId(2), 0), Acquire::Queued);
///
/// // Priority 0 overtakes the earlier priority-4 request.
/// let next = devs.release().unwrap().unwrap();
/// assert_eq!(next.item, WorkItemId(2));
/// ```
#[derive(Debug, Clone)]
pub struct ResourcePool {
    role: Role,
    capacity: usize,
    in_use: usize,
    peak_in_use: usize,
    waiting: BinaryHeap<PoolRequest>,
    next_seq: u64,
    total_grants: u64,
}

impl ResourcePool {
    pub fn new(role: Role, capacity: usize) -> Self {
        Self {
            role,
            capacity,
            in_use: 0,
            peak_in_use: 0,
            waiting: BinaryHeap::new(),
            next_seq: 0,
            total_grants: 0,
        }
    }

    /// Ask for one unit at `priority`
    pub fn request(&mut self, item: WorkItemId, priority: u8) -> Acquire {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.in_use < self.capacity && self.waiting.is_empty() {
            self.grant();
            Acquire::Granted
        } else {
            self.waiting.push(PoolRequest { item, priority, seq });
            Acquire::Queued
        }
    }

    /// Return one unit
    ///
    /// If anyone is waiting the unit is handed over immediately and the new
    /// holder is returned; `in_use` is unchanged in that case.
    pub fn release(&mut self) -> Result<Option<PoolRequest>, PoolError> {
        if self.in_use == 0 {
            return Err(PoolError::ReleaseWithoutGrant { role: self.role });
        }
        match self.waiting.pop() {
            Some(next) => {
                self.total_grants += 1;
                Ok(Some(next))
            }
            None => {
                self.in_use -= 1;
                Ok(None)
            }
        }
    }

    fn grant(&mut self) {
        self.in_use += 1;
        self.total_grants += 1;
        self.peak_in_use = self.peak_in_use.max(self.in_use);
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Highest `in_use` ever observed
    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }

    /// Requests waiting for a unit
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Grants made so far, immediate and handed-off
    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }
}

/// One pool per role
#[derive(Debug, Clone)]
pub struct ResourcePools {
    pools: [ResourcePool; 3],
}

impl ResourcePools {
    pub fn new(developers: usize, testers: usize, business_analysts: usize) -> Self {
        Self {
            pools: [
                ResourcePool::new(Role::Developer, developers),
                ResourcePool::new(Role::Tester, testers),
                ResourcePool::new(Role::BusinessAnalyst, business_analysts),
            ],
        }
    }

    pub fn get(&self, role: Role) -> &ResourcePool {
        &self.pools[role.index()]
    }

    pub fn get_mut(&mut self, role: Role) -> &mut ResourcePool {
        &mut self.pools[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourcePool> {
        self.pools.iter()
    }
}
