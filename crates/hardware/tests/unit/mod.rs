//! # Unit Components
//!
//! Organizes the unit tests by the part of the harness they exercise.



/// Phase clock, supervisor, loader, replay DUT, and end-to-end scenarios.
pub mod sim;
