//! Byte-strobe merge.
//!
//! A bus write carries a 64-bit value and an 8-bit lane mask. Bit `i` of the mask selects
//! byte `i` of the value; unselected bytes of the destination word keep their old contents.

use crate::common::SimError;
use crate::common::constants::STROBE_LANES;

/// Expands an 8-bit lane mask into a 64-bit byte mask (`0b0000_0101` -> `0x0000_0000_00FF_00FF`).
#[inline]
pub const fn lane_mask(strobe: u8) -> u64 {
    let mut mask = 0u64;
    let mut lane = 0;
    while lane < STROBE_LANES {
        if strobe & (1 << lane) != 0 {
            mask |= 0xFF << (lane * 8);
        }
        lane += 1;
    }
    mask
}

/// Merges `value` into `word` under `strobe` and returns the result.
///
/// # Arguments
///
/// * `word` - Current destination contents.
/// * `strobe` - Byte lanes to replace.
/// * `value` - Source data; only the selected lanes are used.
#[inline]
pub const fn merge(word: u64, strobe: u8, value: u64) -> u64 {
    let mask = lane_mask(strobe);
    (word & !mask) | (value & mask)
}

/// Merges `value` into the word behind `dest` in place.
///
/// `dest` is `None` when the caller resolved an address to storage that does not exist,
/// which is a harness bug rather than something the DUT can cause.
///
/// # Errors
///
/// Returns [`SimError::InvalidDestination`] carrying `addr` if `dest` is `None`.
pub fn write_bytes(
    dest: Option<&mut u64>,
    addr: u64,
    strobe: u8,
    value: u64,
) -> Result<u64, SimError> {
    let word = dest.ok_or(SimError::InvalidDestination { addr })?;
    *word = merge(*word, strobe, value);
    Ok(*word)
}
