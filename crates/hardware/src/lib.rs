//! RISC-V compliance test harness library.
//!
//! This crate clocks an opaque RISC-V core through its instruction and data bus ports and
//! plays the part of the memory system around it:
//! 1. **SoC:** Request/grant/valid handshake per channel, seeded latency policies, the
//!    address router, and byte-strobe merges into main, boot, and scratch storage.
//! 2. **Simulation:** Four-phase clock, the simulator loop, the test supervisor with its
//!    signature log, hex image loading, and a scripted replay DUT.
//! 3. **Configuration and statistics:** JSON run configuration and per-run bus statistics.
//!
//! # Example
//!
//! ```
//! use rvbench_core::sim::{SignatureLog, StepOutcome, TraceDut};
//! use rvbench_core::{Config, Simulator};
//!
//! let dut = TraceDut::from_script(
//!     "store 0xfffffff8 0xff 0x2a\n\
//!      store 0xf0f0f0f0 0xff 0x1\n",
//! )?;
//! let main = vec![0; 4];
//! let mut sim = Simulator::new(dut, main, Vec::new(), &Config::default(), SignatureLog::in_memory())?;
//! let report = sim.run()?;
//! assert!(matches!(report.outcome, StepOutcome::Completed));
//! assert_eq!(sim.signature().lines(), &[0x2a]);
//! # Ok::<(), rvbench_core::SimError>(())
//! ```

/// Common types and constants (memory map, sentinels, errors).
pub mod common;
/// Run configuration (general, memory, timing).
pub mod config;
/// Phase clock, simulator loop, supervisor, loader, and replay DUT.
pub mod sim;
/// Bus-side components (signals, channels, latency, router, memory).
pub mod soc;
/// Run statistics and reporting.
pub mod stats;

/// Error type shared by every fallible operation.
pub use crate::common::SimError;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level harness; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Device boundary implemented by anything the harness can clock.
pub use crate::soc::Dut;
