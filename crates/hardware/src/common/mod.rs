//! Common types and constants used throughout the harness.
//!
//! This module provides the building blocks shared by every other module:
//! 1. **Constants:** Memory map, sentinel addresses, filler pattern, and run-control defaults.
//! 2. **Error Handling:** The [`SimError`] type and its [`ErrorKind`] classification.

/// Harness-wide constants.
pub mod constants;

/// Error types.
pub mod error;

pub use constants::{END_OF_TEST_ADDR, FILLER_WORD, SIGNATURE_ADDR, TEXT_OFFSET};
pub use error::{Channel, ErrorKind, SimError};
