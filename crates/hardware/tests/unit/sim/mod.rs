//! Unit tests for run control.




/// Phase sequencing, reset, statistics, and fault handling in the simulator loop.
pub mod simulator;

/// Timeout, signature log, and end-of-test handling.
pub mod supervisor;
