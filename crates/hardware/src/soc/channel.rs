//! Request/grant/valid handshake for one bus channel.
//!
//! Each channel has exactly one requester and at most one read in flight. Per clock period
//! the simulator drives a channel through three steps, in this order:
//! 1. **Sample:** latch the DUT's request wires.
//! 2. **Grant:** count down the grant delay for a held request and accept it at zero.
//!    Accepted reads become outstanding; accepted writes complete at once.
//! 3. **Valid:** count down the valid delay of the outstanding read and complete it at zero.
//!
//! No grant is issued while a read is outstanding, and a grant countdown is discarded
//! whenever the request drops.

use tracing::debug;

use super::latency::DelayPolicy;
use super::signals::{DataRequest, InstrRequest};
use crate::common::Channel;

/// Request wires of one channel, as sampled at the start of a period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelRequest {
    /// Request asserted.
    pub req: bool,
    /// Byte address.
    pub addr: u64,
    /// Write enable; always clear on the instruction channel.
    pub we: bool,
    /// Byte-lane strobe for writes.
    pub be: u8,
    /// Write data.
    pub wdata: u64,
}

impl From<InstrRequest> for ChannelRequest {
    fn from(r: InstrRequest) -> Self {
        Self {
            req: r.req,
            addr: r.addr,
            ..Self::default()
        }
    }
}

impl From<DataRequest> for ChannelRequest {
    fn from(r: DataRequest) -> Self {
        Self {
            req: r.req,
            addr: r.addr,
            we: r.we,
            be: r.be,
            wdata: r.wdata,
        }
    }
}

/// A granted transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Byte address captured at grant.
    pub addr: u64,
    /// `true` for a write.
    pub is_write: bool,
    /// Byte-lane strobe (writes only).
    pub strobe: u8,
    /// Write data (writes only).
    pub wdata: u64,
}

/// Handshake bookkeeping for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Periods left before the held request is granted; `None` when no countdown is armed.
    pub grant_delay_remaining: Option<u32>,
    /// Periods left before the outstanding read completes.
    pub valid_delay_remaining: u32,
    /// A granted read is waiting for its valid.
    pub outstanding: bool,
    /// The most recently granted transfer was a write.
    pub is_write: bool,
}

/// Wait counters accumulated by a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelCounters {
    /// Transfers granted.
    pub grants: u64,
    /// Reads completed with valid.
    pub valids: u64,
    /// Periods a request waited on a grant countdown.
    pub grant_wait: u64,
    /// Periods a request was held off by an outstanding read.
    pub outstanding_wait: u64,
    /// Periods an outstanding read waited on its valid countdown.
    pub valid_wait: u64,
}

/// One request/grant/valid channel.
#[derive(Clone, Debug)]
pub struct HandshakeChannel {
    channel: Channel,
    state: ChannelState,
    request: ChannelRequest,
    in_flight: Option<Transaction>,
    granted: bool,
    valid: bool,
    counters: ChannelCounters,
}

impl HandshakeChannel {
    /// Creates an idle channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            state: ChannelState::default(),
            request: ChannelRequest::default(),
            in_flight: None,
            granted: false,
            valid: false,
            counters: ChannelCounters::default(),
        }
    }

    /// Returns the channel identity.
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the handshake state.
    pub const fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Returns the accumulated counters.
    pub const fn counters(&self) -> &ChannelCounters {
        &self.counters
    }

    /// Returns `true` while a granted read awaits its valid.
    pub const fn is_outstanding(&self) -> bool {
        self.state.outstanding
    }

    /// Returns whether grant was asserted in the current period.
    pub const fn granted(&self) -> bool {
        self.granted
    }

    /// Returns whether valid was asserted in the current period.
    pub const fn valid(&self) -> bool {
        self.valid
    }

    /// Returns the request latched by the last [`sample`](Self::sample).
    pub const fn request(&self) -> &ChannelRequest {
        &self.request
    }

    /// Drops any countdown and in-flight read, as on DUT reset.
    pub fn reset(&mut self) {
        self.state = ChannelState::default();
        self.request = ChannelRequest::default();
        self.in_flight = None;
        self.granted = false;
        self.valid = false;
    }

    /// Latches this period's request wires.
    pub fn sample(&mut self, request: ChannelRequest) {
        self.request = request;
    }

    /// Evaluates grant for the current period.
    ///
    /// # Returns
    ///
    /// The accepted transaction when grant is asserted, otherwise `None`.
    pub fn evaluate_grant(&mut self, policy: &mut dyn DelayPolicy) -> Option<Transaction> {
        self.granted = false;

        if !self.request.req {
            self.state.grant_delay_remaining = None;
            return None;
        }
        if self.state.outstanding {
            self.counters.outstanding_wait += 1;
            return None;
        }

        let remaining = match self.state.grant_delay_remaining {
            Some(remaining) => remaining,
            None => policy.next_delay(),
        };
        if remaining > 0 {
            self.state.grant_delay_remaining = Some(remaining - 1);
            self.counters.grant_wait += 1;
            return None;
        }

        let txn = Transaction {
            addr: self.request.addr,
            is_write: self.request.we,
            strobe: self.request.be,
            wdata: self.request.wdata,
        };
        self.state.grant_delay_remaining = None;
        self.state.is_write = txn.is_write;
        self.granted = true;
        self.counters.grants += 1;

        if !txn.is_write {
            self.state.outstanding = true;
            self.state.valid_delay_remaining = policy.next_delay();
            self.in_flight = Some(txn);
        }

        debug!(
            channel = %self.channel,
            addr = format_args!("{:#010x}", txn.addr),
            write = txn.is_write,
            "grant"
        );
        Some(txn)
    }

    /// Evaluates valid for the current period.
    ///
    /// # Returns
    ///
    /// The completed read when valid is asserted, otherwise `None`.
    pub fn evaluate_valid(&mut self) -> Option<Transaction> {
        self.valid = false;

        if !self.state.outstanding {
            return None;
        }
        if self.state.valid_delay_remaining > 0 {
            self.state.valid_delay_remaining -= 1;
            self.counters.valid_wait += 1;
            return None;
        }

        self.state.outstanding = false;
        self.valid = true;
        self.counters.valids += 1;
        let txn = self.in_flight.take();
        if let Some(txn) = &txn {
            debug!(
                channel = %self.channel,
                addr = format_args!("{:#010x}", txn.addr),
                "valid"
            );
        }
        txn
    }
}
