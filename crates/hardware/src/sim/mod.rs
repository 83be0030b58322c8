//! Run control: the phase clock, the simulator loop, the supervisor, and their inputs.
//!
//! This module ties the bus-side components into a runnable harness:
//! 1. **Clock:** Four ordered phases per DUT clock period.
//! 2. **Simulator:** Drives the DUT and both channels through each phase.
//! 3. **Supervisor:** Timeout, signature logging, and end-of-test detection.
//! 4. **Inputs:** Hex image loading and the scripted replay DUT.

/// Four-phase clock sequencing.
pub mod clock;

/// Hex image loading.
pub mod loader;

/// Scripted bus-trace DUT.
pub mod replay;

/// Top-level simulator loop.
pub mod simulator;

/// Run termination and signature logging.
pub mod supervisor;

pub use clock::{Phase, PhaseClock};
pub use replay::TraceDut;
pub use simulator::Simulator;
pub use supervisor::{SignatureLog, StepOutcome, Supervisor};
