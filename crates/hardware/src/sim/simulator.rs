//! Simulator: owns the DUT, both bus channels, and the memory map side by side.
//!
//! Every call to [`Simulator::step`] runs exactly one phase of the four-phase clock and
//! evaluates the DUT once. A period therefore looks like this:
//! 1. **Sample** (`clk` high): count the period, apply read data latched in the previous
//!    period, evaluate the DUT, and latch its request wires.
//! 2. **Grant** (`clk` high): evaluate grants and drive `gnt`. The level holds until the
//!    next grant phase, so the DUT sees it on the following rising edge.
//! 3. **Valid** (`clk` low): evaluate valids for outstanding reads.
//! 4. **Commit** (`clk` low): commit granted writes and resolve completed reads into the
//!    response latch.

use tracing::{debug, error, info, warn};

use super::clock::{Phase, PhaseClock};
use super::supervisor::{SignatureLog, StepOutcome, Supervisor};
use crate::common::{Channel, SimError};
use crate::config::Config;
use crate::soc::channel::{HandshakeChannel, Transaction};
use crate::soc::interconnect::{Interconnect, Target, WriteEffect};
use crate::soc::latency::{self, DelayPolicy};
use crate::soc::signals::{DutInputs, DutOutputs, instruction_half};
use crate::soc::traits::Dut;
use crate::stats::{RunReport, RunStats};

/// Top-level harness: DUT, channels, router, and supervisor.
#[derive(Debug)]
pub struct Simulator<D: Dut> {
    dut: D,
    interconnect: Interconnect,
    imem: HandshakeChannel,
    dmem: HandshakeChannel,
    policy: Box<dyn DelayPolicy>,
    clock: PhaseClock,
    supervisor: Supervisor,
    inputs: DutInputs,
    outputs: DutOutputs,
    reset_cycles: u64,
    in_reset: bool,
    pending_write: Option<Transaction>,
    completed_imem: Option<Transaction>,
    completed_dmem: Option<Transaction>,
    imem_response: Option<u32>,
    dmem_response: Option<u64>,
    stats: RunStats,
}

impl<D: Dut> Simulator<D> {
    /// Creates a simulator with the delay policy described by `config.timing`.
    ///
    /// # Arguments
    ///
    /// * `dut` - The device to clock.
    /// * `main` - Program image words, mapped at the text offset.
    /// * `boot` - Bootloader image words, mapped at address zero.
    /// * `config` - Run configuration.
    /// * `signature` - Destination for signature lines.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the configuration or the memory layout is
    /// inconsistent.
    pub fn new(
        dut: D,
        main: Vec<u64>,
        boot: Vec<u64>,
        config: &Config,
        signature: SignatureLog,
    ) -> Result<Self, SimError> {
        let policy = latency::from_config(&config.timing);
        Self::with_policy(dut, main, boot, config, signature, policy)
    }

    /// Creates a simulator with an explicit delay policy.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the configuration or the memory layout is
    /// inconsistent.
    pub fn with_policy(
        dut: D,
        main: Vec<u64>,
        boot: Vec<u64>,
        config: &Config,
        signature: SignatureLog,
        policy: Box<dyn DelayPolicy>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let interconnect = Interconnect::new(main, boot, &config.memory);
        interconnect.validate_layout()?;

        Ok(Self {
            dut,
            interconnect,
            imem: HandshakeChannel::new(Channel::Instruction),
            dmem: HandshakeChannel::new(Channel::Data),
            policy,
            clock: PhaseClock::new(),
            supervisor: Supervisor::new(config.general.timeout_cycles, signature),
            inputs: DutInputs::default(),
            outputs: DutOutputs::default(),
            reset_cycles: config.general.reset_cycles,
            in_reset: true,
            pending_write: None,
            completed_imem: None,
            completed_dmem: None,
            imem_response: None,
            dmem_response: None,
            stats: RunStats::default(),
        })
    }

    /// Runs one phase.
    ///
    /// Any fault raised during the phase is reported through the supervisor and returned as
    /// [`StepOutcome::Failed`].
    pub fn step(&mut self) -> StepOutcome {
        let phase = self.clock.advance();
        self.stats.phases += 1;

        let result = match phase {
            Phase::Sample => self.sample(),
            Phase::Grant => self.grant(),
            Phase::Valid => self.valid(),
            Phase::Commit => self.commit(),
        };

        self.stats.imem = *self.imem.counters();
        self.stats.dmem = *self.dmem.counters();
        self.stats.dynamic_words = self.interconnect.dynamic().len() as u64;

        match result {
            Ok(outcome) => outcome,
            Err(err) => self.supervisor.on_fault(err),
        }
    }

    /// Steps until the run completes or fails, then flushes the signature log.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the signature log cannot be flushed after a completed
    /// run. A flush failure after a failed run is logged and the original fault is kept.
    pub fn run(&mut self) -> Result<RunReport, SimError> {
        info!(
            main_words = self.interconnect.main().len_words(),
            boot_words = self.interconnect.boot().len_words(),
            timeout = self.supervisor.timeout(),
            "run started"
        );

        let outcome = loop {
            let outcome = self.step();
            if outcome.is_terminal() {
                break outcome;
            }
        };

        if let Err(flush_err) = self.supervisor.finish() {
            if matches!(outcome, StepOutcome::Completed) {
                return Err(flush_err);
            }
            error!("{flush_err}");
        }

        info!(
            cycles = self.stats.cycles,
            signature_lines = self.supervisor.signature().lines().len(),
            completed = matches!(outcome, StepOutcome::Completed),
            "run finished"
        );
        Ok(RunReport {
            outcome,
            stats: self.stats.clone(),
        })
    }

    fn sample(&mut self) -> Result<StepOutcome, SimError> {
        let cycle = self.supervisor.begin_cycle()?;
        self.stats.cycles = cycle;

        let was_in_reset = self.in_reset;
        self.in_reset = cycle <= self.reset_cycles;
        if was_in_reset && !self.in_reset {
            debug!(cycle, "reset released");
        }

        self.inputs.clk = true;
        self.inputs.rst_n = !self.in_reset;
        self.inputs.imem.rvalid = false;
        self.inputs.dmem.rvalid = false;
        if let Some(data) = self.imem_response.take() {
            self.inputs.imem.rvalid = true;
            self.inputs.imem.rdata = data;
        }
        if let Some(data) = self.dmem_response.take() {
            self.inputs.dmem.rvalid = true;
            self.inputs.dmem.rdata = data;
        }

        self.outputs = self.dut.eval(&self.inputs);

        if self.in_reset {
            self.imem.reset();
            self.dmem.reset();
            self.pending_write = None;
            self.completed_imem = None;
            self.completed_dmem = None;
        } else {
            self.imem.sample(self.outputs.imem.into());
            self.dmem.sample(self.outputs.dmem.into());
        }

        if self.outputs.alert {
            self.stats.alert_cycles += 1;
            warn!(cycle, "DUT alert asserted");
        }
        Ok(StepOutcome::Continue)
    }

    fn grant(&mut self) -> Result<StepOutcome, SimError> {
        self.inputs.clk = true;
        if !self.in_reset {
            let _ = self.imem.evaluate_grant(self.policy.as_mut());
            self.pending_write = self
                .dmem
                .evaluate_grant(self.policy.as_mut())
                .filter(|txn| txn.is_write);
        }
        self.inputs.imem.gnt = self.imem.granted();
        self.inputs.dmem.gnt = self.dmem.granted();
        self.outputs = self.dut.eval(&self.inputs);
        Ok(StepOutcome::Continue)
    }

    fn valid(&mut self) -> Result<StepOutcome, SimError> {
        self.inputs.clk = false;
        if !self.in_reset {
            self.completed_imem = self.imem.evaluate_valid();
            self.completed_dmem = self.dmem.evaluate_valid();
        }
        self.outputs = self.dut.eval(&self.inputs);
        Ok(StepOutcome::Continue)
    }

    fn commit(&mut self) -> Result<StepOutcome, SimError> {
        self.inputs.clk = false;

        if let Some(txn) = self.pending_write.take() {
            let effect = self.interconnect.write(txn.addr, txn.strobe, txn.wdata)?;
            self.stats.data_writes += 1;
            if matches!(effect, WriteEffect::Signature(_)) {
                self.stats.signature_writes += 1;
            }
            let outcome = self.supervisor.on_write(effect)?;
            if outcome.is_terminal() {
                // End of test: reads resolved alongside it are never served.
                return Ok(outcome);
            }
        }

        if let Some(txn) = self.completed_imem.take() {
            let read = self.interconnect.read(txn.addr, Channel::Instruction)?;
            self.stats.instr_fetches += 1;
            if read.target == Target::Filler {
                self.stats.filler_reads += 1;
            }
            self.imem_response = Some(instruction_half(read.value, txn.addr));
        }

        if let Some(txn) = self.completed_dmem.take() {
            let read = self.interconnect.read(txn.addr, Channel::Data)?;
            self.stats.data_reads += 1;
            if read.target == Target::Filler {
                self.stats.filler_reads += 1;
            }
            self.dmem_response = Some(read.value);
        }

        self.outputs = self.dut.eval(&self.inputs);
        Ok(StepOutcome::Continue)
    }

    /// Returns the device under test.
    pub const fn dut(&self) -> &D {
        &self.dut
    }

    /// Returns the memory map.
    pub const fn interconnect(&self) -> &Interconnect {
        &self.interconnect
    }

    /// Returns the handshake state of one channel.
    pub const fn channel(&self, channel: Channel) -> &HandshakeChannel {
        match channel {
            Channel::Instruction => &self.imem,
            Channel::Data => &self.dmem,
        }
    }

    /// Returns the signature log.
    pub const fn signature(&self) -> &SignatureLog {
        self.supervisor.signature()
    }

    /// Returns the statistics gathered so far.
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Returns the number of clock periods started.
    pub const fn cycles(&self) -> u64 {
        self.supervisor.cycles()
    }

    /// Returns the phase clock.
    pub const fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    /// Returns the inputs driven in the last phase.
    pub const fn inputs(&self) -> &DutInputs {
        &self.inputs
    }
}
