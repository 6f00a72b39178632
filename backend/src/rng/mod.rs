//! Deterministic random number generation
//!
//! The only randomness in the pipeline is the pass/fail draw after each
//! test-like stage. It all goes through [`RngManager`] so a seed fully
//! determines a run.

mod xorshift;

pub use xorshift::RngManager;
