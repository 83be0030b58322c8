//! Backing storage for the harness.
//!
//! This module implements the word-addressed stores the address router resolves into:
//! 1. **Regions:** Fixed-length word arrays loaded from the program and boot images.
//! 2. **Dynamic Map:** Scratch words created by writes to otherwise undefined addresses.
//! 3. **Strobe:** The byte-lane merge every write goes through.

/// Byte-strobe merge engine.
pub mod strobe;

use std::collections::HashMap;

use crate::common::constants::{WORD_BYTES, WORD_SHIFT};

/// A contiguous run of 64-bit words mapped at a fixed base address.
///
/// Regions are populated once from an image and never resized; writes mutate words in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryRegion {
    base: u64,
    words: Vec<u64>,
}

impl MemoryRegion {
    /// Creates a region at `base` holding `words`.
    pub const fn new(base: u64, words: Vec<u64>) -> Self {
        Self { base, words }
    }

    /// Returns the base address.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Returns the number of words in the region.
    pub fn len_words(&self) -> u64 {
        self.words.len() as u64
    }

    /// Returns `true` if the region holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the first address past the region, or `None` if it wraps the address space.
    pub fn checked_end(&self) -> Option<u64> {
        self.len_words()
            .checked_mul(WORD_BYTES)
            .and_then(|bytes| self.base.checked_add(bytes))
    }

    /// Returns the first address past the region, saturating at the top of the address space.
    pub fn end(&self) -> u64 {
        self.checked_end().unwrap_or(u64::MAX)
    }

    /// Returns `true` if `addr` falls inside `[base, end)`.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Returns the word index `addr` falls on, if it lies inside the region.
    pub fn index_of(&self, addr: u64) -> Option<usize> {
        self.contains(addr)
            .then(|| ((addr - self.base) >> WORD_SHIFT) as usize)
    }

    /// Returns `true` if `addr` lies in the `window` words immediately past the region.
    ///
    /// An empty region has no tail.
    pub fn in_tail(&self, addr: u64, window: u64) -> bool {
        let end = self.end();
        !self.is_empty() && addr >= end && addr < end.saturating_add(window.saturating_mul(WORD_BYTES))
    }

    /// Reads the word at `index`.
    pub fn word(&self, index: usize) -> Option<u64> {
        self.words.get(index).copied()
    }

    /// Returns a mutable handle to the word at `index`.
    pub fn word_mut(&mut self, index: usize) -> Option<&mut u64> {
        self.words.get_mut(index)
    }
}

/// Words written to addresses outside every region and sentinel.
///
/// Keys are full byte addresses, as presented on the bus.
#[derive(Clone, Debug, Default)]
pub struct DynamicMap {
    entries: HashMap<u64, u64>,
}

impl DynamicMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the word last written to `addr`.
    pub fn get(&self, addr: u64) -> Option<u64> {
        self.entries.get(&addr).copied()
    }

    /// Returns `true` if `addr` has been written.
    pub fn contains(&self, addr: u64) -> bool {
        self.entries.contains_key(&addr)
    }

    /// Returns a handle to the word at `addr`, creating it as zero if absent.
    pub fn entry(&mut self, addr: u64) -> &mut u64 {
        self.entries.entry(addr).or_insert(0)
    }

    /// Returns the number of distinct addresses written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
