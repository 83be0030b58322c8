//! Bus-side components of the harness.
//!
//! This module organizes everything between the DUT's bus ports and backing storage:
//! the signal bundles, the per-channel handshake, latency policies, the address router,
//! and the memory it routes into.

/// Request/grant/valid handshake per channel.
pub mod channel;

/// Address router over regions, sentinels, and scratch storage.
pub mod interconnect;

/// Grant and valid delay policies.
pub mod latency;

/// Memory regions, dynamic scratch map, and strobe merge.
pub mod memory;

/// DUT port signal bundles.
pub mod signals;

/// DUT trait.
pub mod traits;

pub use channel::HandshakeChannel;
pub use interconnect::Interconnect;
pub use traits::Dut;
