//! Constant Delay Policy.
//!
//! Every grant and valid takes the same number of cycles. With a delay of zero the bus
//! answers every request in the period it is seen.

use super::DelayPolicy;

/// Fixed Policy state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedDelay {
    delay: u32,
}

impl FixedDelay {
    /// Creates a policy that always returns `delay`.
    pub const fn new(delay: u32) -> Self {
        Self { delay }
    }

    /// Creates the zero-latency policy.
    pub const fn zero() -> Self {
        Self::new(0)
    }
}

impl DelayPolicy for FixedDelay {
    fn next_delay(&mut self) -> u32 {
        self.delay
    }
}
