//! Global Harness Constants.
//!
//! This module defines the fixed values shared between the harness and the code running on
//! the DUT. It includes:
//! 1. **Memory Map:** Text offset and word geometry of the backing regions.
//! 2. **Sentinels:** Signature and end-of-test addresses agreed with the compliance halt macro.
//! 3. **Filler:** The NOP pattern returned for over-fetch just past defined memory.
//! 4. **Run Control:** Default timeout and reset length.

/// Physical address where the program image is mapped (RISC-V compliance `.text` base).
pub const TEXT_OFFSET: u64 = 0x8000_0000;

/// Address the compliance halt loop stores each signature word to.
pub const SIGNATURE_ADDR: u64 = 0xFFFF_FFF8;

/// Address whose write terminates the run successfully.
pub const END_OF_TEST_ADDR: u64 = 0xF0F0_F0F0;

/// Size of one backing storage word in bytes.
pub const WORD_BYTES: u64 = 8;

/// Number of bits to shift to convert between bytes and words.
pub const WORD_SHIFT: u64 = 3;

/// Number of byte lanes in a storage word (bits in a strobe mask).
pub const STROBE_LANES: u32 = 8;

/// Strobe mask selecting every byte lane.
pub const STROBE_FULL: u8 = 0xFF;

/// `addi x0, x0, 0`.
pub const NOP_INSTRUCTION: u32 = 0x0000_0013;

/// Two NOPs packed into one storage word.
pub const FILLER_WORD: u64 = ((NOP_INSTRUCTION as u64) << 32) | NOP_INSTRUCTION as u64;

/// Number of words past the end of each region that read back as [`FILLER_WORD`].
pub const FILLER_WORDS: u64 = 5;

/// Clock periods after which an unfinished run is declared timed out.
pub const DEFAULT_TIMEOUT_CYCLES: u64 = 2_000_000;

/// Clock periods the DUT is held in reset before requests are serviced.
pub const DEFAULT_RESET_CYCLES: u64 = 3;

/// Probability that a randomized grant or valid delay is zero.
pub const DEFAULT_ZERO_DELAY_PROBABILITY: f64 = 0.875;

/// Upper bound (inclusive) of the uniform delay drawn when the delay is not zero.
pub const DEFAULT_MAX_EXTRA_DELAY: u32 = 5;

/// Seed used for the randomized delay policy when none is given.
pub const DEFAULT_DELAY_SEED: u64 = 0x5EED_1A7E_0B1C_0DE5;

/// Minimum number of hex digits per signature log line.
pub const SIGNATURE_HEX_WIDTH: usize = 8;
