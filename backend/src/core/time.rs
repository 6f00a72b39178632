//! Time management for the simulation
//!
//! The simulation runs in continuous logical time measured in hours. Time only
//! moves when the next scheduled event is popped, so the clock is monotonic by
//! construction. Events at the same instant come out in the order they were
//! scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Logical simulation time, in hours
pub type SimTime = f64;

/// An event waiting in the queue
#[derive(Debug, Clone)]
struct Scheduled<T> {
    at: SimTime,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap yields the earliest (time, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Monotonic clock plus a priority queue of future events
///
/// # Example
/// ```
/// use delivery_simulator_core_rs::EventQueue;
///
/// let mut queue = EventQueue::new();
/// queue.schedule(2.0, "later");
/// queue.schedule(1.0, "sooner");
///
/// assert_eq!(queue.pop(), Some((1.0, "sooner")));
/// assert_eq!(queue.now(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct EventQueue<T> {
    /// Current logical time
    now: SimTime,
    /// Sequence counter used to break ties between same-time events
    next_seq: u64,
    /// Pending events
    heap: BinaryHeap<Scheduled<T>>,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventQueue<T> {
    /// Create an empty queue with the clock at zero
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current logical time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `payload` at absolute time `at`
    ///
    /// Times earlier than `now` are clamped to `now`; the clock never runs
    /// backwards.
    pub fn schedule(&mut self, at: SimTime, payload: T) {
        let at = if at < self.now { self.now } else { at };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { at, seq, payload });
    }

    /// Schedule `payload` `delay` hours from now
    pub fn schedule_in(&mut self, delay: SimTime, payload: T) {
        self.schedule(self.now + delay, payload);
    }

    /// Time of the next pending event, if any
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|s| s.at)
    }

    /// Remove the earliest event and advance the clock to it
    pub fn pop(&mut self) -> Option<(SimTime, T)> {
        let next = self.heap.pop()?;
        self.now = next.at;
        Some((next.at, next.payload))
    }

    /// Move the clock forward without processing anything
    ///
    /// Used when a watchdog halts the run at a fixed time. Moving backwards is
    /// ignored.
    pub fn advance_to(&mut self, at: SimTime) {
        if at > self.now {
            self.now = at;
        }
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
