//! Device-under-test trait.
//!
//! This module defines the `Dut` trait implemented by anything the harness can clock. It
//! provides a single evaluation entry point: the harness drives the clock, reset, and bus
//! responses, and reads back the requests.
//!
//! A Verilated RTL model is wrapped behind this trait by the embedding program; the library
//! ships [`TraceDut`](crate::sim::replay::TraceDut), which replays a scripted bus sequence.

use super::signals::{DutInputs, DutOutputs};

/// A clocked device driven through the instruction and data bus ports.
pub trait Dut {
    /// Applies `inputs`, settles the model, and returns its outputs.
    ///
    /// Called once per phase; the clock level in `inputs` toggles twice per period, and
    /// sequential state advances on the rising edge.
    fn eval(&mut self, inputs: &DutInputs) -> DutOutputs;
}
