//! Work-in-progress tracking
//!
//! An append-only log of `(time, items in system)` samples, one per admission
//! or release. The log is a step function: each value holds until the next
//! sample.

use crate::core::SimTime;
use serde::{Deserialize, Serialize};

/// One point of the WIP step function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WipSample {
    pub time: SimTime,
    pub wip: usize,
}

/// Load classification of a WIP level relative to developer headcount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WipBand {
    /// At most one item per developer
    Healthy,
    /// Up to 20% over developer headcount
    Stretched,
    /// More than 20% over
    Overloaded,
}

impl WipBand {
    /// Classify `wip` against `developers`
    pub fn classify(wip: usize, developers: usize) -> Self {
        let wip = wip as f64;
        let capacity = developers as f64;
        if wip <= capacity {
            WipBand::Healthy
        } else if wip <= 1.2 * capacity {
            WipBand::Stretched
        } else {
            WipBand::Overloaded
        }
    }
}

/// Constant-WIP interval of the step function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WipSegment {
    pub start: SimTime,
    pub end: SimTime,
    pub wip: usize,
    pub band: WipBand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WipTracker {
    log: Vec<WipSample>,
    current: usize,
    peak: usize,
}

impl WipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `delta` to the running total and append a sample
    pub fn log_wip(&mut self, now: SimTime, delta: isize) {
        self.current = self.current.saturating_add_signed(delta);
        self.peak = self.peak.max(self.current);
        self.log.push(WipSample {
            time: now,
            wip: self.current,
        });
    }

    pub fn log(&self) -> &[WipSample] {
        &self.log
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Time-weighted mean WIP over `[0, elapsed]`, 0 when nothing elapsed
    pub fn time_average(&self, elapsed: SimTime) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        let area: f64 = self
            .segments(elapsed)
            .iter()
            .map(|s| s.wip as f64 * (s.end - s.start))
            .sum();
        area / elapsed
    }

    /// Step function cut into constant intervals up to `until`, each banded
    /// against `developers`
    pub fn banded_segments(&self, until: SimTime, developers: usize) -> Vec<WipSegment> {
        self.segments(until)
            .into_iter()
            .map(|s| WipSegment {
                band: WipBand::classify(s.wip, developers),
                ..s
            })
            .collect()
    }

    fn segments(&self, until: SimTime) -> Vec<WipSegment> {
        let mut segments = Vec::with_capacity(self.log.len() + 1);
        let mut start = 0.0;
        let mut wip = 0;
        for sample in &self.log {
            if sample.time > start {
                segments.push(WipSegment {
                    start,
                    end: sample.time.min(until),
                    wip,
                    band: WipBand::Healthy,
                });
            }
            start = sample.time;
            wip = sample.wip;
        }
        if until > start {
            segments.push(WipSegment {
                start,
                end: until,
                wip,
                band: WipBand::Healthy,
            });
        }
        segments.retain(|s| s.end > s.start);
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_running_total() {
        let mut tracker = WipTracker::new();
        tracker.log_wip(0.0, 1);
        tracker.log_wip(1.0, 1);
        tracker.log_wip(3.0, -1);

        let wips: Vec<usize> = tracker.log().iter().map(|s| s.wip).collect();
        assert_eq!(wips, vec![1, 2, 1]);
        assert_eq!(tracker.peak(), 2);
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn test_time_average() {
        let mut tracker = WipTracker::new();
        tracker.log_wip(0.0, 1);
        tracker.log_wip(2.0, 1);
        tracker.log_wip(4.0, -2);
        // 1 for 2h, 2 for 2h, 0 for 4h
        assert_eq!(tracker.time_average(8.0), 0.75);
        assert_eq!(tracker.time_average(0.0), 0.0);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(WipBand::classify(5, 5), WipBand::Healthy);
        assert_eq!(WipBand::classify(6, 5), WipBand::Stretched);
        assert_eq!(WipBand::classify(7, 5), WipBand::Overloaded);
    }

    #[test]
    fn test_banded_segments() {
        let mut tracker = WipTracker::new();
        tracker.log_wip(1.0, 1);
        tracker.log_wip(1.0, 1);
        tracker.log_wip(2.0, -1);

        let segments = tracker.banded_segments(3.0, 1);
        assert_eq!(segments.len(), 3);
        assert_eq!((segments[0].start, segments[0].end, segments[0].wip), (0.0, 1.0, 0));
        assert_eq!(segments[1].wip, 2);
        assert_eq!(segments[1].band, WipBand::Overloaded);
        assert_eq!(segments[2].band, WipBand::Healthy);
    }
}
