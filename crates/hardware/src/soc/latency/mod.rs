//! Handshake Delay Policies.
//!
//! Supplies the number of cycles a channel waits before asserting grant or valid.
//!
//! # Policies
//!
//! - `Fixed`: Every delay is the same constant (zero for a latency-free run).
//! - `Random`: Mostly zero, occasionally a short uniform stall, from a seeded generator.

/// Constant-latency policy.
pub mod fixed;

/// Seeded randomized-latency policy.
pub mod random;

pub use fixed::FixedDelay;
pub use random::RandomDelay;

use crate::config::{DelayPolicyKind, TimingConfig};

/// Source of grant and valid latencies.
///
/// Channels only ever ask for the next delay; they never see how it is produced, so
/// policies are interchangeable without touching channel logic.
pub trait DelayPolicy: std::fmt::Debug + Send {
    /// Returns the number of whole clock periods to wait before the next grant or valid.
    fn next_delay(&mut self) -> u32;
}

/// Builds the policy selected by `config`.
pub fn from_config(config: &TimingConfig) -> Box<dyn DelayPolicy> {
    match config.policy {
        DelayPolicyKind::Fixed => Box::new(FixedDelay::new(config.fixed_delay)),
        DelayPolicyKind::Random => Box::new(RandomDelay::new(
            config.seed,
            config.zero_probability,
            config.max_extra_delay,
        )),
    }
}
