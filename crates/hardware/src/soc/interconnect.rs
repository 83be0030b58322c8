//! Address router for the harness memory map.
//!
//! This module decides where every bus address lands. It provides:
//! 1. **Decoding:** A fixed-priority decode over main memory, boot ROM, the signature register,
//!    the dynamic scratch map, and the filler windows.
//! 2. **Reads:** Word lookup, with a fault for anything the decode cannot explain.
//! 3. **Writes:** Strobed merges into the decoded storage; the end-of-test sentinel is
//!    intercepted before ordinary decode and never stored.
//!
//! Decode priority, highest first:
//! 1. `[text_offset, text_offset + main_words * 8)` -> main region.
//! 2. `addr / 8 < boot_words` -> boot region.
//! 3. `addr == signature_addr` -> signature register.
//! 4. Previously written address -> dynamic map.
//! 5. Up to `filler_words` words past the end of main or boot -> filler (reads only).
//! 6. Anything else -> dynamic map for writes, fault for reads.

use tracing::trace;

use super::memory::strobe::write_bytes;
use super::memory::{DynamicMap, MemoryRegion};
use crate::common::constants::FILLER_WORD;
use crate::common::{Channel, SimError};
use crate::config::MemoryConfig;

/// Storage an address decodes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Word index into the main (program) region.
    Main(usize),
    /// Word index into the boot region.
    Boot(usize),
    /// The signature accumulator.
    Signature,
    /// A word previously created in the dynamic map.
    Dynamic,
    /// The NOP window just past main or boot.
    Filler,
    /// Nothing; reads fault and writes create a dynamic entry.
    Unmapped,
}

/// A completed read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadResult {
    /// 64-bit storage word.
    pub value: u64,
    /// Where it came from.
    pub target: Target,
}

/// What a committed write did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteEffect {
    /// The word at `target` now holds `value`.
    Stored {
        /// Storage written.
        target: Target,
        /// Word after the merge.
        value: u64,
    },
    /// The signature accumulator now holds this value; it must be logged.
    Signature(u64),
    /// The end-of-test sentinel was written.
    EndOfTest,
}

/// Memory map of one compliance run: both regions, the sentinels, and the scratch map.
#[derive(Clone, Debug)]
pub struct Interconnect {
    main: MemoryRegion,
    boot: MemoryRegion,
    signature: u64,
    dynamic: DynamicMap,
    signature_addr: u64,
    end_of_test_addr: u64,
    filler_words: u64,
}

impl Interconnect {
    /// Builds the map from the loaded images.
    ///
    /// # Arguments
    ///
    /// * `main` - Program image words, mapped at `config.text_offset`.
    /// * `boot` - Bootloader image words, mapped at address zero.
    /// * `config` - Text offset, sentinel addresses, and filler window size.
    pub fn new(main: Vec<u64>, boot: Vec<u64>, config: &MemoryConfig) -> Self {
        Self {
            main: MemoryRegion::new(config.text_offset, main),
            boot: MemoryRegion::new(0, boot),
            signature: 0,
            dynamic: DynamicMap::new(),
            signature_addr: config.signature_addr,
            end_of_test_addr: config.end_of_test_addr,
            filler_words: config.filler_words,
        }
    }

    /// Checks that the regions overlap neither each other nor the sentinels.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first collision.
    pub fn validate_layout(&self) -> Result<(), SimError> {
        for (name, region) in [("main", &self.main), ("boot", &self.boot)] {
            if region.checked_end().is_none() {
                return Err(SimError::InvalidConfig(format!(
                    "{name} region of {} word(s) at {:#010x} runs past the end of the address space",
                    region.len_words(),
                    region.base()
                )));
            }
        }
        if !self.main.is_empty()
            && !self.boot.is_empty()
            && self.main.base() < self.boot.end()
            && self.boot.base() < self.main.end()
        {
            return Err(SimError::InvalidConfig(format!(
                "boot region [{:#010x}, {:#010x}) overlaps main region at {:#010x}",
                self.boot.base(),
                self.boot.end(),
                self.main.base()
            )));
        }
        for (name, addr) in [
            ("signature", self.signature_addr),
            ("end-of-test", self.end_of_test_addr),
        ] {
            if self.main.contains(addr) || self.boot.contains(addr) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} sentinel {addr:#010x} lies inside a loaded region"
                )));
            }
        }
        Ok(())
    }

    /// Decodes `addr` without touching any storage.
    pub fn decode(&self, addr: u64) -> Target {
        if let Some(index) = self.main.index_of(addr) {
            Target::Main(index)
        } else if let Some(index) = self.boot.index_of(addr) {
            Target::Boot(index)
        } else if addr == self.signature_addr {
            Target::Signature
        } else if self.dynamic.contains(addr) {
            Target::Dynamic
        } else if self.in_filler_window(addr) {
            Target::Filler
        } else {
            Target::Unmapped
        }
    }

    /// Returns `true` if `addr` is within the filler window of either region.
    pub fn in_filler_window(&self, addr: u64) -> bool {
        self.main.in_tail(addr, self.filler_words) || self.boot.in_tail(addr, self.filler_words)
    }

    /// Reads the 64-bit word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AddressOutOfRange`] naming `addr` and `channel` if the address
    /// decodes to nothing.
    pub fn read(&self, addr: u64, channel: Channel) -> Result<ReadResult, SimError> {
        let target = self.decode(addr);
        let value = match target {
            Target::Main(index) => self.main.word(index),
            Target::Boot(index) => self.boot.word(index),
            Target::Signature => Some(self.signature),
            Target::Dynamic => self.dynamic.get(addr),
            Target::Filler => Some(FILLER_WORD),
            Target::Unmapped => None,
        }
        .ok_or(SimError::AddressOutOfRange { addr, channel })?;

        trace!(
            %channel,
            addr = format_args!("{addr:#018x}"),
            data = format_args!("{value:#018x}"),
            "read"
        );
        Ok(ReadResult { value, target })
    }

    /// Commits a strobed write of `value` to `addr`.
    ///
    /// Writes never fault on address alone: anything the decode cannot place lands in the
    /// dynamic map, including the filler windows.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDestination`] if a region index resolves past its storage.
    pub fn write(&mut self, addr: u64, strobe: u8, value: u64) -> Result<WriteEffect, SimError> {
        trace!(
            addr = format_args!("{addr:#018x}"),
            data = format_args!("{value:#018x}"),
            strobe = format_args!("{strobe:#04x}"),
            "write"
        );

        if addr == self.end_of_test_addr {
            return Ok(WriteEffect::EndOfTest);
        }

        let target = self.decode(addr);
        let dest = match target {
            Target::Main(index) => self.main.word_mut(index),
            Target::Boot(index) => self.boot.word_mut(index),
            Target::Signature => {
                let merged = write_bytes(Some(&mut self.signature), addr, strobe, value)?;
                return Ok(WriteEffect::Signature(merged));
            }
            Target::Dynamic | Target::Filler | Target::Unmapped => Some(self.dynamic.entry(addr)),
        };
        let merged = write_bytes(dest, addr, strobe, value)?;

        let target = match target {
            Target::Filler | Target::Unmapped => Target::Dynamic,
            other => other,
        };
        Ok(WriteEffect::Stored {
            target,
            value: merged,
        })
    }

    /// Returns the main (program) region.
    pub const fn main(&self) -> &MemoryRegion {
        &self.main
    }

    /// Returns the boot region.
    pub const fn boot(&self) -> &MemoryRegion {
        &self.boot
    }

    /// Returns the current signature accumulator.
    pub const fn signature(&self) -> u64 {
        self.signature
    }

    /// Returns the dynamic scratch map.
    pub const fn dynamic(&self) -> &DynamicMap {
        &self.dynamic
    }
}
