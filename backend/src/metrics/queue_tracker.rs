//! Per-stage queue tracking
//!
//! Queue length changes at irregular event times, so the average length is
//! taken from the area under the length-vs-time curve. The area is updated
//! lazily: on every length change the previous length is multiplied by the
//! time since the last change and added in.

use crate::core::SimTime;
use crate::models::Stage;
use serde::{Deserialize, Serialize};

/// Queue state for one stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageQueue {
    /// Arrival-to-grant wait of every granted request
    pub wait_times: Vec<SimTime>,
    /// Requests currently waiting
    pub current_length: usize,
    /// Longest queue seen
    pub peak_length: usize,
    /// Integral of queue length over time
    pub area: f64,
    /// When `area` was last brought up to date
    pub last_update: SimTime,
}

impl StageQueue {
    fn update_area(&mut self, now: SimTime) {
        let delta = now - self.last_update;
        if delta > 0.0 {
            self.area += self.current_length as f64 * delta;
        }
        self.last_update = now;
    }
}

/// Wait times and time-weighted queue lengths for every stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueTracker {
    stages: [StageQueue; 7],
}

impl QueueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note an arrival; returns the arrival stamp to hand back at grant time
    pub fn record_arrival(&self, _stage: Stage, now: SimTime) -> SimTime {
        now
    }

    /// Record the wait of a request granted at `now`
    pub fn record_wait(&mut self, stage: Stage, now: SimTime, arrival: SimTime) {
        self.stages[stage.index()].wait_times.push(now - arrival);
    }

    /// Length +1, after bringing the area up to `now`
    pub fn queue_enter(&mut self, stage: Stage, now: SimTime) {
        let queue = &mut self.stages[stage.index()];
        queue.update_area(now);
        queue.current_length += 1;
        queue.peak_length = queue.peak_length.max(queue.current_length);
    }

    /// Length -1, after bringing the area up to `now`
    pub fn queue_exit(&mut self, stage: Stage, now: SimTime) {
        let queue = &mut self.stages[stage.index()];
        queue.update_area(now);
        queue.current_length = queue.current_length.saturating_sub(1);
    }

    /// Close every stage's integral at `now`
    pub fn finalize(&mut self, now: SimTime) {
        for queue in &mut self.stages {
            queue.update_area(now);
        }
    }

    pub fn stage(&self, stage: Stage) -> &StageQueue {
        &self.stages[stage.index()]
    }

    pub fn wait_times(&self, stage: Stage) -> &[SimTime] {
        &self.stages[stage.index()].wait_times
    }

    /// Mean wait, 0 with no observations
    pub fn average_wait(&self, stage: Stage) -> SimTime {
        let waits = self.wait_times(stage);
        if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<f64>() / waits.len() as f64
        }
    }

    /// Area under the queue-length curve so far
    pub fn area(&self, stage: Stage) -> f64 {
        self.stages[stage.index()].area
    }

    /// Time-averaged queue length over `elapsed`, 0 when nothing elapsed
    pub fn average_queue_length(&self, stage: Stage, elapsed: SimTime) -> f64 {
        if elapsed > 0.0 {
            self.area(stage) / elapsed
        } else {
            0.0
        }
    }

    pub fn current_length(&self, stage: Stage) -> usize {
        self.stages[stage.index()].current_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_accumulates_lazily() {
        let mut tracker = QueueTracker::new();
        tracker.queue_enter(Stage::Test, 0.0);
        tracker.queue_enter(Stage::Test, 2.0);
        // 1 item for 2h
        assert_eq!(tracker.area(Stage::Test), 2.0);
        tracker.queue_exit(Stage::Test, 5.0);
        // + 2 items for 3h
        assert_eq!(tracker.area(Stage::Test), 8.0);
        tracker.finalize(10.0);
        // + 1 item for 5h
        assert_eq!(tracker.area(Stage::Test), 13.0);
        assert_eq!(tracker.average_queue_length(Stage::Test, 10.0), 1.3);
        assert_eq!(tracker.stage(Stage::Test).peak_length, 2);
    }

    #[test]
    fn test_empty_averages_are_zero() {
        let tracker = QueueTracker::new();
        assert_eq!(tracker.average_wait(Stage::Develop), 0.0);
        assert_eq!(tracker.average_queue_length(Stage::Develop, 0.0), 0.0);
    }

    #[test]
    fn test_wait_recorded_from_arrival() {
        let mut tracker = QueueTracker::new();
        let arrival = tracker.record_arrival(Stage::Release, 1.5);
        tracker.record_wait(Stage::Release, 4.0, arrival);
        tracker.record_wait(Stage::Release, 4.0, 4.0);
        assert_eq!(tracker.wait_times(Stage::Release), &[2.5, 0.0]);
        assert_eq!(tracker.average_wait(Stage::Release), 1.25);
    }

    #[test]
    fn test_exit_never_underflows() {
        let mut tracker = QueueTracker::new();
        tracker.queue_exit(Stage::Backlog, 1.0);
        assert_eq!(tracker.current_length(Stage::Backlog), 0);
    }
}
