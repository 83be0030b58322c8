//! Four-phase clock.
//!
//! One DUT clock period is split into four ordered phases so that sampling, grant, valid,
//! and data application never race inside a period:
//!
//! | Phase    | `clk` | Work                                                      |
//! |----------|-------|-----------------------------------------------------------|
//! | `Sample` | 1     | Rising edge. Drive last period's valid/data, sample outputs |
//! | `Grant`  | 1     | Evaluate and drive grants                                 |
//! | `Valid`  | 0     | Falling edge. Evaluate valids                             |
//! | `Commit` | 0     | Resolve addresses, commit writes, latch read data         |

use std::fmt;

/// One quarter of a DUT clock period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Rising edge: apply responses, sample requests.
    Sample,
    /// Grant evaluation.
    Grant,
    /// Falling edge: valid evaluation.
    Valid,
    /// Address resolution and write commit.
    Commit,
}

impl Phase {
    /// All phases in execution order.
    pub const ORDER: [Self; 4] = [Self::Sample, Self::Grant, Self::Valid, Self::Commit];

    /// Level of the DUT clock while this phase is evaluated.
    pub const fn clock_level(self) -> bool {
        matches!(self, Self::Sample | Self::Grant)
    }

    /// Phase that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Sample => Self::Grant,
            Self::Grant => Self::Valid,
            Self::Valid => Self::Commit,
            Self::Commit => Self::Sample,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sample => "P1/sample",
            Self::Grant => "P2/grant",
            Self::Valid => "P3/valid",
            Self::Commit => "P4/commit",
        };
        f.write_str(name)
    }
}

/// Phase sequencer.
///
/// `cycle` counts started periods: it is 1 during the first period's phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseClock {
    current: Option<Phase>,
    cycle: u64,
    steps: u64,
}

impl PhaseClock {
    /// Creates a clock positioned before the first period.
    pub const fn new() -> Self {
        Self {
            current: None,
            cycle: 0,
            steps: 0,
        }
    }

    /// Moves to the next phase and returns it.
    pub fn advance(&mut self) -> Phase {
        let phase = self.current.map_or(Phase::Sample, Phase::next);
        if phase == Phase::Sample {
            self.cycle += 1;
        }
        self.current = Some(phase);
        self.steps += 1;
        phase
    }

    /// Returns the phase last returned by [`advance`](Self::advance).
    pub const fn phase(&self) -> Option<Phase> {
        self.current
    }

    /// Returns the number of started clock periods.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns the number of phases executed.
    pub const fn steps(&self) -> u64 {
        self.steps
    }
}
