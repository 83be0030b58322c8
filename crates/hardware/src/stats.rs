//! Run statistics collection and reporting.
//!
//! This module tracks what happened on the bus during a compliance run. It provides:
//! 1. **Cycles:** Clock periods and phases executed, host time, simulated frequency.
//! 2. **Traffic:** Instruction fetches, data reads and writes, signature writes.
//! 3. **Decode:** How many reads were answered from filler and how large the scratch map grew.
//! 4. **Back-pressure:** Grant and valid wait periods per channel.

use std::time::Instant;

use crate::sim::supervisor::StepOutcome;
use crate::soc::channel::ChannelCounters;

/// How a run ended, with the statistics gathered along the way.
#[derive(Debug)]
pub struct RunReport {
    /// `Completed` or `Failed`.
    pub outcome: StepOutcome,
    /// Bus statistics at the final phase.
    pub stats: RunStats,
}

impl RunReport {
    /// Returns `true` if the end-of-test sentinel was written.
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Completed)
    }
}

/// Bus statistics for one run.
#[derive(Clone, Debug)]
pub struct RunStats {
    start_time: Instant,
    /// Clock periods started.
    pub cycles: u64,
    /// Phases executed.
    pub phases: u64,
    /// Instruction fetches completed.
    pub instr_fetches: u64,
    /// Data reads completed.
    pub data_reads: u64,
    /// Data writes committed, including sentinels.
    pub data_writes: u64,
    /// Writes to the signature sentinel.
    pub signature_writes: u64,
    /// Reads answered from the filler window.
    pub filler_reads: u64,
    /// Distinct scratch addresses written.
    pub dynamic_words: u64,
    /// Periods with the DUT alert asserted.
    pub alert_cycles: u64,
    /// Instruction channel handshake counters.
    pub imem: ChannelCounters,
    /// Data channel handshake counters.
    pub dmem: ChannelCounters,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            phases: 0,
            instr_fetches: 0,
            data_reads: 0,
            data_writes: 0,
            signature_writes: 0,
            filler_reads: 0,
            dynamic_words: 0,
            alert_cycles: 0,
            imem: ChannelCounters::default(),
            dmem: ChannelCounters::default(),
        }
    }
}

impl RunStats {
    /// Returns the total number of completed bus transfers.
    pub const fn transfers(&self) -> u64 {
        self.instr_fetches + self.data_reads + self.data_writes
    }

    /// Prints the selected sections of the report; an empty list prints everything.
    ///
    /// Sections: `summary`, `traffic`, `handshake`.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };

        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.cycles as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("RISC-V COMPLIANCE HARNESS STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_phases               {}", self.phases);
            println!("sim_freq                 {khz:.2} kHz");
            println!("bus_transfers            {}", self.transfers());
            println!("----------------------------------------------------------");
        }
        if want("traffic") {
            println!("BUS TRAFFIC");
            println!("  imem.fetches           {}", self.instr_fetches);
            println!("  dmem.reads             {}", self.data_reads);
            println!("  dmem.writes            {}", self.data_writes);
            println!("  signature.writes       {}", self.signature_writes);
            println!("  filler.reads           {}", self.filler_reads);
            println!("  dynamic.words          {}", self.dynamic_words);
            println!(
                "  alert.cycles           {} ({:.2}%)",
                self.alert_cycles,
                (self.alert_cycles as f64 / cyc as f64) * 100.0
            );
            println!("----------------------------------------------------------");
        }
        if want("handshake") {
            println!("HANDSHAKE");
            for (name, c) in [("imem", &self.imem), ("dmem", &self.dmem)] {
                println!("  {name}.grants            {}", c.grants);
                println!("  {name}.valids            {}", c.valids);
                println!(
                    "  {name}.grant_wait        {} ({:.2}%)",
                    c.grant_wait,
                    (c.grant_wait as f64 / cyc as f64) * 100.0
                );
                println!(
                    "  {name}.valid_wait        {} ({:.2}%)",
                    c.valid_wait,
                    (c.valid_wait as f64 / cyc as f64) * 100.0
                );
                println!("  {name}.blocked           {}", c.outstanding_wait);
            }
            println!("==========================================================");
        }
    }

    /// Prints the full report.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
