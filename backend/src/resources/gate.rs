//! WIP admission gate
//!
//! A bounded counter in `[0, limit]`. Items are admitted after Backlog and
//! vacate after Release, so the number of items between those two points
//! never exceeds the limit. Without a limit the gate admits everything.

use crate::models::WorkItemId;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GateError {
    #[error("admission gate vacated while empty")]
    VacateWhileEmpty,
}

/// Capacity-bounded admission counter with a FIFO of blocked items
///
/// # Example
/// ```
/// use delivery_simulator_core_rs::models::WorkItemId;
/// use delivery_simulator_core_rs::resources::AdmissionGate;
///
/// let mut gate = AdmissionGate::new(Some(1));
/// assert!(gate.admit(WorkItemId(0)));
/// assert!(!gate.admit(WorkItemId(1)));
///
/// // Vacating hands the slot to the first waiter.
/// assert_eq!(gate.vacate().unwrap(), Some(WorkItemId(1)));
/// assert_eq!(gate.occupied(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    limit: Option<usize>,
    occupied: usize,
    peak: usize,
    waiting: VecDeque<WorkItemId>,
}

impl AdmissionGate {
    /// `None` builds an unbounded gate
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            occupied: 0,
            peak: 0,
            waiting: VecDeque::new(),
        }
    }

    /// Try to take a slot; `false` means the item is now waiting
    pub fn admit(&mut self, item: WorkItemId) -> bool {
        if self.has_room() && self.waiting.is_empty() {
            self.occupy();
            true
        } else {
            self.waiting.push_back(item);
            false
        }
    }

    /// Give a slot back
    ///
    /// The slot is passed to the longest-waiting item, if any, which is
    /// returned so the caller can resume it.
    pub fn vacate(&mut self) -> Result<Option<WorkItemId>, GateError> {
        if self.occupied == 0 {
            return Err(GateError::VacateWhileEmpty);
        }
        match self.waiting.pop_front() {
            Some(next) => Ok(Some(next)),
            None => {
                self.occupied -= 1;
                Ok(None)
            }
        }
    }

    fn has_room(&self) -> bool {
        self.limit.map_or(true, |limit| self.occupied < limit)
    }

    fn occupy(&mut self) {
        self.occupied += 1;
        self.peak = self.peak.max(self.occupied);
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Items currently admitted
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Highest occupancy observed
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Items blocked at the gate
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_gate_never_blocks() {
        let mut gate = AdmissionGate::new(None);
        for i in 0..1000 {
            assert!(gate.admit(WorkItemId(i)));
        }
        assert_eq!(gate.occupied(), 1000);
        assert_eq!(gate.waiting(), 0);
    }

    #[test]
    fn test_vacate_empty_is_error() {
        let mut gate = AdmissionGate::new(Some(2));
        assert_eq!(gate.vacate(), Err(GateError::VacateWhileEmpty));
    }

    #[test]
    fn test_waiters_admitted_in_arrival_order() {
        let mut gate = AdmissionGate::new(Some(1));
        gate.admit(WorkItemId(0));
        gate.admit(WorkItemId(5));
        gate.admit(WorkItemId(3));

        assert_eq!(gate.vacate().unwrap(), Some(WorkItemId(5)));
        assert_eq!(gate.vacate().unwrap(), Some(WorkItemId(3)));
        assert_eq!(gate.vacate().unwrap(), None);
        assert_eq!(gate.occupied(), 0);
        assert_eq!(gate.peak(), 1);
    }
}
