//! xorshift64* random number generator
//!
//! Small, fast and deterministic. Same seed gives the same sequence of failure
//! draws, which makes whole simulation runs reproducible.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use delivery_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(42);
/// let draw = rng.next_f64();
/// assert!((0.0..1.0).contains(&draw));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 since xorshift has a fixed point at zero.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform f64 in [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli trial: true with probability `p`
    ///
    /// Always consumes exactly one draw, so the sequence stays aligned whether
    /// or not `p` is 0 or 1.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
