//! Configuration system for the compliance harness.
//!
//! This module defines all configuration structures and enums used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline memory map, sentinel addresses, and run-control constants.
//! 2. **Structures:** Hierarchical config for general run control, the memory map, and bus timing.
//! 3. **Enums:** Delay policy selection.
//!
//! Configuration is read from JSON (`Config::from_json_file`) or built with `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::SimError;
use crate::common::constants::WORD_BYTES;

/// Default configuration constants for the harness.
///
/// These values match the conventions baked into the compliance halt macro and the
/// linker script of the test programs.
mod defaults {
    use crate::common::constants;

    /// Base address of the program image.
    pub const TEXT_OFFSET: u64 = constants::TEXT_OFFSET;

    /// Signature sentinel address.
    pub const SIGNATURE_ADDR: u64 = constants::SIGNATURE_ADDR;

    /// End-of-test sentinel address.
    pub const END_OF_TEST_ADDR: u64 = constants::END_OF_TEST_ADDR;

    /// Words past each region that read back as NOP filler.
    pub const FILLER_WORDS: u64 = constants::FILLER_WORDS;

    /// Global cycle bound.
    pub const TIMEOUT_CYCLES: u64 = constants::DEFAULT_TIMEOUT_CYCLES;

    /// Clock periods spent in reset.
    pub const RESET_CYCLES: u64 = constants::DEFAULT_RESET_CYCLES;

    /// Probability of a zero-cycle randomized delay.
    pub const ZERO_PROBABILITY: f64 = constants::DEFAULT_ZERO_DELAY_PROBABILITY;

    /// Largest randomized delay.
    pub const MAX_EXTRA_DELAY: u32 = constants::DEFAULT_MAX_EXTRA_DELAY;

    /// Seed for the randomized policy.
    pub const SEED: u64 = constants::DEFAULT_DELAY_SEED;
}

/// Grant/valid latency policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DelayPolicyKind {
    /// Every grant and valid takes `fixed_delay` cycles (zero by default).
    Fixed,
    /// Mostly zero, occasionally a uniform draw from `0..=max_extra_delay`.
    #[default]
    Random,
}

/// Root configuration structure containing all harness settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use rvbench_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.text_offset, 0x8000_0000);
/// assert_eq!(config.general.timeout_cycles, 2_000_000);
/// ```
///
/// Deserializing from JSON; omitted sections and fields take their defaults:
///
/// ```
/// use rvbench_core::config::{Config, DelayPolicyKind};
///
/// let json = r#"{
///     "general": { "timeout_cycles": 50000 },
///     "timing": { "policy": "Fixed" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.timeout_cycles, 50_000);
/// assert_eq!(config.timing.policy, DelayPolicyKind::Fixed);
/// assert_eq!(config.memory.signature_addr, 0xFFFF_FFF8);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Run control settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory map and sentinel addresses
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Handshake latency settings
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for malformed JSON and [`SimError::InvalidConfig`] if
    /// validation fails.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Checks the settings for internal consistency.
    ///
    /// The sentinels must be distinct and the signature word aligned; the timing probability
    /// must lie in `[0, 1]`. Overlap with the loaded regions is checked once the images are
    /// known, by [`Interconnect::validate_layout`](crate::soc::interconnect::Interconnect::validate_layout).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<(), SimError> {
        let memory = &self.memory;
        if memory.signature_addr == memory.end_of_test_addr {
            return Err(SimError::InvalidConfig(format!(
                "signature and end-of-test sentinels share address {:#010x}",
                memory.signature_addr
            )));
        }
        if memory.signature_addr % WORD_BYTES != 0 {
            return Err(SimError::InvalidConfig(format!(
                "signature address {:#010x} is not 8-byte aligned",
                memory.signature_addr
            )));
        }
        if memory.text_offset % WORD_BYTES != 0 {
            return Err(SimError::InvalidConfig(format!(
                "text offset {:#010x} is not 8-byte aligned",
                memory.text_offset
            )));
        }
        if !(0.0..=1.0).contains(&self.timing.zero_probability) {
            return Err(SimError::InvalidConfig(format!(
                "zero_probability {} is outside [0, 1]",
                self.timing.zero_probability
            )));
        }
        if self.general.timeout_cycles == 0 {
            return Err(SimError::InvalidConfig("timeout_cycles must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Run control settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Clock periods after which the run fails with a timeout.
    #[serde(default = "GeneralConfig::default_timeout_cycles")]
    pub timeout_cycles: u64,

    /// Clock periods the DUT reset is held asserted.
    #[serde(default = "GeneralConfig::default_reset_cycles")]
    pub reset_cycles: u64,
}

impl GeneralConfig {
    fn default_timeout_cycles() -> u64 {
        defaults::TIMEOUT_CYCLES
    }

    fn default_reset_cycles() -> u64 {
        defaults::RESET_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            timeout_cycles: defaults::TIMEOUT_CYCLES,
            reset_cycles: defaults::RESET_CYCLES,
        }
    }
}

/// Memory map and sentinel addresses.
///
/// The boot region is always mapped at address zero.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Base address of the program image.
    #[serde(default = "MemoryConfig::default_text_offset")]
    pub text_offset: u64,

    /// Address the halt code streams signature words to.
    #[serde(default = "MemoryConfig::default_signature_addr")]
    pub signature_addr: u64,

    /// Address whose write ends the run.
    #[serde(default = "MemoryConfig::default_end_of_test_addr")]
    pub end_of_test_addr: u64,

    /// Words past the end of each region that read back as NOP filler.
    #[serde(default = "MemoryConfig::default_filler_words")]
    pub filler_words: u64,
}

impl MemoryConfig {
    fn default_text_offset() -> u64 {
        defaults::TEXT_OFFSET
    }

    fn default_signature_addr() -> u64 {
        defaults::SIGNATURE_ADDR
    }

    fn default_end_of_test_addr() -> u64 {
        defaults::END_OF_TEST_ADDR
    }

    fn default_filler_words() -> u64 {
        defaults::FILLER_WORDS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            text_offset: defaults::TEXT_OFFSET,
            signature_addr: defaults::SIGNATURE_ADDR,
            end_of_test_addr: defaults::END_OF_TEST_ADDR,
            filler_words: defaults::FILLER_WORDS,
        }
    }
}

/// Handshake latency settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Which delay policy drives grants and valids.
    #[serde(default)]
    pub policy: DelayPolicyKind,

    /// Seed for the randomized policy.
    #[serde(default = "TimingConfig::default_seed")]
    pub seed: u64,

    /// Probability that a randomized delay is zero.
    #[serde(default = "TimingConfig::default_zero_probability")]
    pub zero_probability: f64,

    /// Largest randomized delay, inclusive.
    #[serde(default = "TimingConfig::default_max_extra_delay")]
    pub max_extra_delay: u32,

    /// Delay used by the fixed policy.
    #[serde(default)]
    pub fixed_delay: u32,
}

impl TimingConfig {
    fn default_seed() -> u64 {
        defaults::SEED
    }

    fn default_zero_probability() -> f64 {
        defaults::ZERO_PROBABILITY
    }

    fn default_max_extra_delay() -> u32 {
        defaults::MAX_EXTRA_DELAY
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            policy: DelayPolicyKind::default(),
            seed: defaults::SEED,
            zero_probability: defaults::ZERO_PROBABILITY,
            max_extra_delay: defaults::MAX_EXTRA_DELAY,
            fixed_delay: 0,
        }
    }
}
