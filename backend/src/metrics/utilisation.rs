//! Resource busy-time accounting

use crate::core::SimTime;
use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Cumulative busy time per role
///
/// The accumulator never clamps. Utilisation is derived on demand as
/// `busy / (capacity × elapsed)` and clamped to `[0, 1]` only when reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilisationTracker {
    busy: [SimTime; 3],
}

impl UtilisationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one service interval for `role`
    pub fn add_busy(&mut self, role: Role, start: SimTime, end: SimTime) {
        self.busy[role.index()] += end - start;
    }

    pub fn busy_time(&self, role: Role) -> SimTime {
        self.busy[role.index()]
    }

    /// Unclamped busy fraction, 0 when the denominator is 0
    pub fn raw_utilisation(&self, role: Role, capacity: usize, elapsed: SimTime) -> f64 {
        let available = capacity as f64 * elapsed;
        if available > 0.0 {
            self.busy_time(role) / available
        } else {
            0.0
        }
    }

    /// Busy fraction clamped to `[0, 1]`
    pub fn utilisation(&self, role: Role, capacity: usize, elapsed: SimTime) -> f64 {
        self.raw_utilisation(role, capacity, elapsed).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_time_by_role() {
        let mut tracker = UtilisationTracker::new();
        tracker.add_busy(Role::Developer, 0.0, 2.0);
        tracker.add_busy(Role::Developer, 3.0, 4.5);
        tracker.add_busy(Role::Tester, 1.0, 2.0);

        assert_eq!(tracker.busy_time(Role::Developer), 3.5);
        assert_eq!(tracker.busy_time(Role::Tester), 1.0);
        assert_eq!(tracker.busy_time(Role::BusinessAnalyst), 0.0);
        assert_eq!(tracker.utilisation(Role::Developer, 1, 7.0), 0.5);
    }

    #[test]
    fn test_zero_denominator() {
        let mut tracker = UtilisationTracker::new();
        tracker.add_busy(Role::Tester, 0.0, 1.0);
        assert_eq!(tracker.utilisation(Role::Tester, 0, 10.0), 0.0);
        assert_eq!(tracker.utilisation(Role::Tester, 2, 0.0), 0.0);
    }

    #[test]
    fn test_report_clamps_but_accumulator_does_not() {
        let mut tracker = UtilisationTracker::new();
        tracker.add_busy(Role::Developer, 0.0, 10.0);
        assert_eq!(tracker.raw_utilisation(Role::Developer, 1, 5.0), 2.0);
        assert_eq!(tracker.utilisation(Role::Developer, 1, 5.0), 1.0);
    }
}
