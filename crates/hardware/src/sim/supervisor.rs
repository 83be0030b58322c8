//! Test supervisor and signature log.
//!
//! The supervisor owns everything that decides how a compliance run ends:
//! 1. **Timeout:** A monotonically increasing cycle counter with a fixed bound.
//! 2. **Signature:** Every merge at the signature sentinel is appended to the log as one hex line.
//! 3. **End of test:** A write to the end-of-test sentinel completes the run.
//! 4. **Faults:** Router errors become a failed outcome.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::common::SimError;
use crate::common::constants::SIGNATURE_HEX_WIDTH;
use crate::soc::interconnect::WriteEffect;

/// Result of one simulated phase.
#[derive(Debug)]
pub enum StepOutcome {
    /// Keep stepping.
    Continue,
    /// The end-of-test sentinel was written.
    Completed,
    /// The run hit a terminal fault.
    Failed(SimError),
}

impl StepOutcome {
    /// Returns `true` for `Completed` and `Failed`.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Renders a signature word the way reference signatures are written: lowercase hex,
/// zero-padded to eight digits, wider values at natural width.
pub fn format_signature_line(value: u64) -> String {
    format!("{value:0width$x}", width = SIGNATURE_HEX_WIDTH)
}

/// Append-only record of signature writes, optionally mirrored to a file.
#[derive(Debug, Default)]
pub struct SignatureLog {
    lines: Vec<u64>,
    file: Option<(PathBuf, BufWriter<File>)>,
    closed: bool,
}

impl SignatureLog {
    /// Creates a log that only keeps lines in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates (truncating) the signature file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SimError::io(path, e))?;
        Ok(Self {
            lines: Vec::new(),
            file: Some((path.to_path_buf(), BufWriter::new(file))),
            closed: false,
        })
    }

    /// Appends one signature word.
    ///
    /// Lines appended after [`finish`](Self::finish) are kept in memory only.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if writing to the file fails.
    pub fn append(&mut self, value: u64) -> Result<(), SimError> {
        self.lines.push(value);
        if self.closed {
            return Ok(());
        }
        if let Some((path, writer)) = &mut self.file {
            writeln!(writer, "{}", format_signature_line(value))
                .map_err(|e| SimError::io(path.as_path(), e))?;
        }
        Ok(())
    }

    /// Flushes the file. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the flush fails.
    pub fn finish(&mut self) -> Result<(), SimError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some((path, writer)) = &mut self.file {
            writer.flush().map_err(|e| SimError::io(path.as_path(), e))?;
        }
        Ok(())
    }

    /// Returns every word logged so far, oldest first.
    pub fn lines(&self) -> &[u64] {
        &self.lines
    }

    /// Returns the log rendered as it appears on disk.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|&v| format_signature_line(v) + "\n")
            .collect()
    }

    /// Returns the backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// Returns `true` once [`finish`](Self::finish) has run.
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Watches committed writes and the cycle count.
#[derive(Debug)]
pub struct Supervisor {
    cycles: u64,
    timeout: u64,
    signature: SignatureLog,
}

impl Supervisor {
    /// Creates a supervisor with the given cycle bound.
    pub fn new(timeout: u64, signature: SignatureLog) -> Self {
        Self {
            cycles: 0,
            timeout,
            signature,
        }
    }

    /// Counts one clock period.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] once the count exceeds the bound.
    pub fn begin_cycle(&mut self) -> Result<u64, SimError> {
        self.cycles += 1;
        if self.cycles > self.timeout {
            return Err(SimError::Timeout {
                cycles: self.cycles,
                limit: self.timeout,
            });
        }
        Ok(self.cycles)
    }

    /// Inspects a committed write.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the signature line cannot be written.
    pub fn on_write(&mut self, effect: WriteEffect) -> Result<StepOutcome, SimError> {
        match effect {
            WriteEffect::Signature(value) => {
                self.signature.append(value)?;
                Ok(StepOutcome::Continue)
            }
            WriteEffect::EndOfTest => {
                info!(
                    cycles = self.cycles,
                    signature_lines = self.signature.lines().len(),
                    "end-of-test sentinel written"
                );
                Ok(StepOutcome::Completed)
            }
            WriteEffect::Stored { .. } => Ok(StepOutcome::Continue),
        }
    }

    /// Converts a fault into a terminal outcome.
    pub fn on_fault(&self, err: SimError) -> StepOutcome {
        error!(cycles = self.cycles, kind = %err.kind(), "{err}");
        StepOutcome::Failed(err)
    }

    /// Flushes and closes the signature log.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the flush fails.
    pub fn finish(&mut self) -> Result<(), SimError> {
        self.signature.finish()
    }

    /// Returns the cycle count.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the configured bound.
    pub const fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Returns the signature log.
    pub const fn signature(&self) -> &SignatureLog {
        &self.signature
    }
}
