//! Bus-trace replay DUT.
//!
//! [`TraceDut`] stands in for an RTL model by replaying a short line-oriented script of bus
//! operations. It obeys the port protocol the way a core would: a request is held until the
//! rising edge that sees `gnt`, a read then waits for `rvalid`, and only one operation is
//! in progress at a time.
//!
//! # Script format
//!
//! ```text
//! # comment
//! fetch 0x80000000            # instruction read
//! load  0x80000010            # data read
//! store 0xfffffff8 0xff 0x2a  # data write: address, strobe, data
//! idle  4                     # wait four rising edges
//! alert                       # pulse alert_o for one period
//! ```
//!
//! Numbers take a `0x` prefix for hex and are decimal otherwise.

use std::path::Path;

use tracing::trace;

use crate::common::constants::STROBE_FULL;
use crate::common::{Channel, SimError};
use crate::soc::signals::{DataRequest, DutInputs, DutOutputs, InstrRequest};
use crate::soc::traits::Dut;

/// One scripted bus operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOp {
    /// Instruction fetch.
    Fetch(u64),
    /// Data read of a full word.
    Load(u64),
    /// Strobed data write.
    Store {
        /// Byte address.
        addr: u64,
        /// Byte-lane strobe.
        strobe: u8,
        /// Write data.
        data: u64,
    },
    /// Do nothing for this many rising edges.
    Idle(u32),
    /// Raise `alert_o` for one period.
    Alert,
}

impl TraceOp {
    const fn channel(self) -> Option<Channel> {
        match self {
            Self::Fetch(_) => Some(Channel::Instruction),
            Self::Load(_) | Self::Store { .. } => Some(Channel::Data),
            Self::Idle(_) | Self::Alert => None,
        }
    }
}

/// A read that completed with `rvalid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedRead {
    /// Port the read was issued on.
    pub channel: Channel,
    /// Byte address requested.
    pub addr: u64,
    /// Data returned; zero-extended on the instruction port.
    pub data: u64,
}

fn parse_number(token: &str, line: usize) -> Result<u64, SimError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => token.replace('_', "").parse(),
    };
    parsed.map_err(|_| SimError::Trace {
        line,
        reason: format!("invalid number {token:?}"),
    })
}

fn expect_args(op: &str, args: &[&str], count: usize, line: usize) -> Result<(), SimError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(SimError::Trace {
            line,
            reason: format!("{op} takes {count} argument(s), got {}", args.len()),
        })
    }
}

/// Parses a bus script.
///
/// # Errors
///
/// Returns [`SimError::Trace`] with the 1-based line number for an unknown command, a
/// wrong argument count, or a malformed or oversized number.
pub fn parse_trace(text: &str) -> Result<Vec<TraceOp>, SimError> {
    let mut ops = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let body = raw.split('#').next().unwrap_or_default();
        let mut tokens = body.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();

        let op = match command.to_ascii_lowercase().as_str() {
            "fetch" => {
                expect_args(command, &args, 1, line)?;
                TraceOp::Fetch(parse_number(args[0], line)?)
            }
            "load" => {
                expect_args(command, &args, 1, line)?;
                TraceOp::Load(parse_number(args[0], line)?)
            }
            "store" => {
                expect_args(command, &args, 3, line)?;
                let strobe =
                    u8::try_from(parse_number(args[1], line)?).map_err(|_| SimError::Trace {
                        line,
                        reason: format!("strobe {:?} does not fit eight lanes", args[1]),
                    })?;
                TraceOp::Store {
                    addr: parse_number(args[0], line)?,
                    strobe,
                    data: parse_number(args[2], line)?,
                }
            }
            "idle" => {
                expect_args(command, &args, 1, line)?;
                let n = u32::try_from(parse_number(args[0], line)?).map_err(|_| {
                    SimError::Trace {
                        line,
                        reason: format!("idle count {:?} is too large", args[0]),
                    }
                })?;
                TraceOp::Idle(n)
            }
            "alert" => {
                expect_args(command, &args, 0, line)?;
                TraceOp::Alert
            }
            other => {
                return Err(SimError::Trace {
                    line,
                    reason: format!("unknown command {other:?}"),
                });
            }
        };
        ops.push(op);
    }
    Ok(ops)
}

/// Reads and parses the bus script at `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, or [`SimError::Trace`] if the
/// script is malformed.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceOp>, SimError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    parse_trace(&text)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReplayState {
    Ready,
    Requesting(TraceOp),
    AwaitingValid(TraceOp),
    Waiting(u32),
}

/// DUT that replays a bus script.
#[derive(Clone, Debug)]
pub struct TraceDut {
    ops: Vec<TraceOp>,
    next: usize,
    state: ReplayState,
    last_clk: bool,
    outputs: DutOutputs,
    reads: Vec<CompletedRead>,
    edges: u64,
}

impl TraceDut {
    /// Creates a DUT that will replay `ops` once reset is released.
    pub const fn new(ops: Vec<TraceOp>) -> Self {
        Self {
            ops,
            next: 0,
            state: ReplayState::Ready,
            last_clk: false,
            outputs: DutOutputs {
                imem: InstrRequest {
                    req: false,
                    addr: 0,
                },
                dmem: DataRequest {
                    req: false,
                    addr: 0,
                    we: false,
                    be: 0,
                    wdata: 0,
                },
                alert: false,
            },
            reads: Vec::new(),
            edges: 0,
        }
    }

    /// Parses `script` and builds a DUT from it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] if the script is malformed.
    pub fn from_script(script: &str) -> Result<Self, SimError> {
        Ok(Self::new(parse_trace(script)?))
    }

    /// Returns every read completed so far, oldest first.
    pub fn reads(&self) -> &[CompletedRead] {
        &self.reads
    }

    /// Returns `true` once every operation has finished.
    pub fn is_done(&self) -> bool {
        self.next >= self.ops.len() && self.state == ReplayState::Ready
    }

    /// Returns the number of operations started so far.
    pub const fn issued(&self) -> usize {
        self.next
    }

    /// Returns the number of rising edges seen out of reset.
    pub const fn edges(&self) -> u64 {
        self.edges
    }

    fn on_rising_edge(&mut self, inputs: &DutInputs) {
        self.edges += 1;
        self.outputs.alert = false;

        if let ReplayState::Requesting(op) = self.state {
            let granted = match op.channel() {
                Some(Channel::Instruction) => inputs.imem.gnt,
                Some(Channel::Data) => inputs.dmem.gnt,
                None => true,
            };
            if granted {
                self.state = match op {
                    TraceOp::Store { .. } => ReplayState::Ready,
                    _ => ReplayState::AwaitingValid(op),
                };
            }
        }

        if let ReplayState::AwaitingValid(op) = self.state {
            let completed = match op {
                TraceOp::Fetch(addr) if inputs.imem.rvalid => Some(CompletedRead {
                    channel: Channel::Instruction,
                    addr,
                    data: u64::from(inputs.imem.rdata),
                }),
                TraceOp::Load(addr) if inputs.dmem.rvalid => Some(CompletedRead {
                    channel: Channel::Data,
                    addr,
                    data: inputs.dmem.rdata,
                }),
                _ => None,
            };
            if let Some(read) = completed {
                trace!(
                    channel = %read.channel,
                    addr = format_args!("{:#010x}", read.addr),
                    data = format_args!("{:#018x}", read.data),
                    "replayed read completed"
                );
                self.reads.push(read);
                self.state = ReplayState::Ready;
            }
        }

        if let ReplayState::Waiting(remaining) = self.state {
            self.state = if remaining <= 1 {
                ReplayState::Ready
            } else {
                ReplayState::Waiting(remaining - 1)
            };
        }

        while self.state == ReplayState::Ready && self.next < self.ops.len() {
            let op = self.ops[self.next];
            self.next += 1;
            self.state = match op {
                TraceOp::Fetch(_) | TraceOp::Load(_) | TraceOp::Store { .. } => {
                    ReplayState::Requesting(op)
                }
                TraceOp::Idle(0) => ReplayState::Ready,
                TraceOp::Idle(n) => ReplayState::Waiting(n),
                TraceOp::Alert => {
                    self.outputs.alert = true;
                    ReplayState::Ready
                }
            };
        }

        self.drive();
    }

    fn drive(&mut self) {
        self.outputs.imem = InstrRequest::default();
        self.outputs.dmem = DataRequest::default();
        if let ReplayState::Requesting(op) = self.state {
            match op {
                TraceOp::Fetch(addr) => {
                    self.outputs.imem = InstrRequest { req: true, addr };
                }
                TraceOp::Load(addr) => {
                    self.outputs.dmem = DataRequest {
                        req: true,
                        addr,
                        we: false,
                        be: STROBE_FULL,
                        wdata: 0,
                    };
                }
                TraceOp::Store { addr, strobe, data } => {
                    self.outputs.dmem = DataRequest {
                        req: true,
                        addr,
                        we: true,
                        be: strobe,
                        wdata: data,
                    };
                }
                TraceOp::Idle(_) | TraceOp::Alert => {}
            }
        }
    }
}

impl Dut for TraceDut {
    fn eval(&mut self, inputs: &DutInputs) -> DutOutputs {
        let rising = inputs.clk && !self.last_clk;
        self.last_clk = inputs.clk;

        if rising {
            if inputs.rst_n {
                self.on_rising_edge(inputs);
            } else {
                self.state = ReplayState::Ready;
                self.outputs = DutOutputs::default();
            }
        }
        self.outputs
    }
}
