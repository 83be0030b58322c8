//! Harness error definitions.
//!
//! Every failure the harness can report is a [`SimError`]. It provides:
//! 1. **Run Faults:** Out-of-range reads, the global timeout, and the merge-engine guard.
//! 2. **Setup Faults:** Image parsing, configuration, trace scripts, and file I/O.
//! 3. **Classification:** [`ErrorKind`] for reports and tests that only care about the category.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two bus channels an access arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Instruction fetch port.
    Instruction,
    /// Load/store port.
    Data,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => write!(f, "INSTRUCTION"),
            Self::Data => write!(f, "DATA"),
        }
    }
}

/// Category of a [`SimError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Read from an address no region, sentinel, dynamic entry, or filler window covers.
    AddressOutOfRange,
    /// The run did not reach the end-of-test sentinel in time.
    Timeout,
    /// A write was routed to storage that does not exist.
    InvalidDestination,
    /// Malformed program or boot image.
    ImageParse,
    /// Malformed or inconsistent configuration.
    InvalidConfig,
    /// Malformed bus trace script.
    Trace,
    /// File system failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddressOutOfRange => "AddressOutOfRange",
            Self::Timeout => "Timeout",
            Self::InvalidDestination => "InvalidDestination",
            Self::ImageParse => "ImageParse",
            Self::InvalidConfig => "InvalidConfig",
            Self::Trace => "Trace",
            Self::Io => "Io",
        };
        f.write_str(name)
    }
}

/// Errors raised while setting up or running a compliance test.
#[derive(Debug, Error)]
pub enum SimError {
    /// A read targeted undefined memory.
    #[error("AddressOutOfRange: {channel} address {addr:#010x} is not backed by any region")]
    AddressOutOfRange {
        /// Offending address.
        addr: u64,
        /// Channel the read arrived on.
        channel: Channel,
    },

    /// The cycle counter passed its bound.
    #[error("Timeout: no end-of-test write after {cycles} cycles (limit {limit})")]
    Timeout {
        /// Cycle count when the bound was exceeded.
        cycles: u64,
        /// Configured bound.
        limit: u64,
    },

    /// The merge engine was handed a missing destination word.
    #[error("InvalidDestination: no storage word behind address {addr:#010x}")]
    InvalidDestination {
        /// Address whose storage could not be resolved.
        addr: u64,
    },

    /// An image line could not be parsed as a 64-bit hex word.
    #[error("ImageParse: line {line}: cannot parse {content:?} as a 64-bit hex word")]
    ImageParse {
        /// 1-based line number.
        line: usize,
        /// Line contents after stripping non-hex characters.
        content: String,
    },

    /// Configuration failed to parse or validate.
    #[error("InvalidConfig: {0}")]
    InvalidConfig(String),

    /// JSON configuration could not be deserialized.
    #[error("InvalidConfig: {0}")]
    Config(#[from] serde_json::Error),

    /// A bus trace script line was rejected.
    #[error("Trace: line {line}: {reason}")]
    Trace {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("Io: {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressOutOfRange { .. } => ErrorKind::AddressOutOfRange,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidDestination { .. } => ErrorKind::InvalidDestination,
            Self::ImageParse { .. } => ErrorKind::ImageParse,
            Self::InvalidConfig(_) | Self::Config(_) => ErrorKind::InvalidConfig,
            Self::Trace { .. } => ErrorKind::Trace,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Returns the offending address for address-carrying errors.
    pub const fn address(&self) -> Option<u64> {
        match self {
            Self::AddressOutOfRange { addr, .. } | Self::InvalidDestination { addr } => {
                Some(*addr)
            }
            _ => None,
        }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
