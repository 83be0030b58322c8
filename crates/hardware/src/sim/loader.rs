//! Hex image loader.
//!
//! Program and bootloader images arrive as text: one 64-bit word per line, most significant
//! digit first. Loading is deliberately forgiving about decoration:
//! 1. **Stripping:** Every character that is not a hex digit is dropped (`0x` prefixes
//!    survive only as a leading zero, separators and whitespace vanish).
//! 2. **Blank lines:** Lines with no hex digits left are skipped.
//! 3. **Width:** More than sixteen digits cannot fit a word and is rejected.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::SimError;

const MAX_WORD_DIGITS: usize = 16;

/// Parses a hex image into words, in line order.
///
/// # Errors
///
/// Returns [`SimError::ImageParse`] with the 1-based line number if a line holds more
/// than sixteen hex digits.
pub fn parse_hex_image(text: &str) -> Result<Vec<u64>, SimError> {
    let mut words = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let digits: String = line.chars().filter(char::is_ascii_hexdigit).collect();
        if digits.is_empty() {
            continue;
        }
        if digits.len() > MAX_WORD_DIGITS {
            return Err(SimError::ImageParse {
                line: index + 1,
                content: digits,
            });
        }
        let word = u64::from_str_radix(&digits, 16).map_err(|_| SimError::ImageParse {
            line: index + 1,
            content: digits.clone(),
        })?;
        words.push(word);
    }
    Ok(words)
}

/// Reads and parses the hex image at `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, or [`SimError::ImageParse`] if a
/// line is malformed.
pub fn load_hex_image(path: impl AsRef<Path>) -> Result<Vec<u64>, SimError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    let words = parse_hex_image(&text)?;
    debug!(path = %path.display(), words = words.len(), "loaded hex image");
    Ok(words)
}
