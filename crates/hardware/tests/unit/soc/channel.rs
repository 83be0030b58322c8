//! # Handshake Channel Tests
//!
//! Grant countdowns, outstanding exclusion, countdown discard on withdrawal, and valid
//! timing, driven by scripted delay policies.

use proptest::prelude::*;
use rvbench_core::common::Channel;
use rvbench_core::soc::channel::{ChannelRequest, HandshakeChannel};
use rvbench_core::soc::latency::{FixedDelay, RandomDelay};

use crate::common::mocks::policy::scripted;

fn read(addr: u64) -> ChannelRequest {
    ChannelRequest {
        req: true,
        addr,
        ..ChannelRequest::default()
    }
}

fn write(addr: u64, be: u8, wdata: u64) -> ChannelRequest {
    ChannelRequest {
        req: true,
        addr,
        we: true,
        be,
        wdata,
    }
}

#[test]
fn test_zero_latency_read_grants_and_completes_in_one_period() {
    let mut policy = FixedDelay::zero();
    let mut ch = HandshakeChannel::new(Channel::Data);
    ch.sample(read(0x80));

    let granted = ch.evaluate_grant(&mut policy).unwrap();
    assert_eq!(granted.addr, 0x80);
    assert!(!granted.is_write);
    assert!(ch.granted());
    assert!(ch.is_outstanding());

    let done = ch.evaluate_valid().unwrap();
    assert_eq!(done.addr, 0x80);
    assert!(ch.valid());
    assert!(!ch.is_outstanding());
}

#[test]
fn test_write_completes_at_grant() {
    let mut policy = FixedDelay::zero();
    let mut ch = HandshakeChannel::new(Channel::Data);
    ch.sample(write(0x1000, 0x0F, 0xABCD));

    let txn = ch.evaluate_grant(&mut policy).unwrap();
    assert!(txn.is_write);
    assert_eq!(txn.strobe, 0x0F);
    assert_eq!(txn.wdata, 0xABCD);
    assert!(!ch.is_outstanding());
    assert!(ch.evaluate_valid().is_none());
}

#[test]
fn test_grant_waits_for_drawn_delay() {
    let mut policy = scripted(vec![3, 0], 2);
    let mut ch = HandshakeChannel::new(Channel::Instruction);
    ch.sample(read(0x8000_0000));

    for wait in 0..3 {
        assert!(ch.evaluate_grant(&mut policy).is_none(), "period {wait}");
        assert!(!ch.granted());
    }
    assert!(ch.evaluate_grant(&mut policy).is_some());
    assert_eq!(ch.counters().grant_wait, 3);
    assert_eq!(ch.counters().grants, 1);
}

#[test]
fn test_withdrawn_request_discards_countdown() {
    let mut policy = scripted(vec![3, 0, 0], 3);
    let mut ch = HandshakeChannel::new(Channel::Data);

    ch.sample(read(0x40));
    assert!(ch.evaluate_grant(&mut policy).is_none());
    assert_eq!(ch.state().grant_delay_remaining, Some(2));

    ch.sample(ChannelRequest::default());
    assert!(ch.evaluate_grant(&mut policy).is_none());
    assert_eq!(ch.state().grant_delay_remaining, None);

    ch.sample(read(0x40));
    assert!(ch.evaluate_grant(&mut policy).is_some());
}

#[test]
fn test_no_grant_while_outstanding() {
    let mut policy = scripted(vec![0, 2], 2);
    let mut ch = HandshakeChannel::new(Channel::Data);

    ch.sample(read(0x10));
    assert!(ch.evaluate_grant(&mut policy).is_some());
    assert!(ch.evaluate_valid().is_none());

    ch.sample(read(0x18));
    assert!(ch.evaluate_grant(&mut policy).is_none());
    assert_eq!(ch.state().grant_delay_remaining, None);
    assert!(ch.evaluate_valid().is_none());

    assert!(ch.evaluate_grant(&mut policy).is_none());
    let done = ch.evaluate_valid().unwrap();
    assert_eq!(done.addr, 0x10);

    assert_eq!(ch.counters().outstanding_wait, 2);
    assert_eq!(ch.counters().valid_wait, 2);
}

#[test]
fn test_reset_clears_in_flight_read() {
    let mut policy = FixedDelay::new(1);
    let mut ch = HandshakeChannel::new(Channel::Data);
    ch.sample(read(0x10));
    assert!(ch.evaluate_grant(&mut policy).is_none());
    assert!(ch.evaluate_grant(&mut policy).is_some());
    assert!(ch.is_outstanding());

    ch.reset();
    assert!(!ch.is_outstanding());
    assert!(!ch.request().req);
    assert!(ch.evaluate_valid().is_none());
}

#[test]
fn test_instruction_request_conversion_is_read() {
    let req: ChannelRequest = rvbench_core::soc::signals::InstrRequest {
        req: true,
        addr: 0x8000_0004,
    }
    .into();
    assert!(!req.we);
    assert_eq!(req.addr, 0x8000_0004);
}

proptest! {
    #[test]
    fn prop_never_grant_while_outstanding(
        seed: u64,
        pattern in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..200),
    ) {
        let mut policy = RandomDelay::new(seed, 0.5, 5);
        let mut ch = HandshakeChannel::new(Channel::Data);
        for (req, we) in pattern {
            let request = ChannelRequest { req, we, addr: 0x100, be: 0xFF, wdata: 1 };
            ch.sample(request);
            let was_outstanding = ch.is_outstanding();
            let granted = ch.evaluate_grant(&mut policy);
            prop_assert!(!(was_outstanding && granted.is_some()));
            prop_assert!(!(was_outstanding && ch.granted()));
            let _ = ch.evaluate_valid();
        }
    }
}
