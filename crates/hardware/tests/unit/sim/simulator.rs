//! # Simulator Loop Tests
//!
//! Phase ordering, reset sequencing, latency accounting, statistics, and the guarantee
//! that the signature log is flushed whether the run passes or fails.

use pretty_assertions::assert_eq;
use rvbench_core::common::{Channel, ErrorKind, SimError};
use rvbench_core::config::Config;
use rvbench_core::sim::replay::CompletedRead;
use rvbench_core::sim::{SignatureLog, Simulator, StepOutcome, TraceDut};
use rvbench_core::soc::latency::FixedDelay;
use rvbench_core::soc::signals::{DataRequest, DutInputs, DutOutputs, InstrRequest};
use rvbench_core::soc::traits::Dut;

use crate::common::harness::{TestContext, fixed_config};
use crate::common::mocks::policy::scripted;

#[test]
fn test_clock_level_per_phase() {
    let mut ctx = TestContext::new("", vec![0x13]);
    let mut levels = Vec::new();
    for _ in 0..8 {
        let _ = ctx.sim.step();
        levels.push(ctx.sim.inputs().clk);
    }
    assert_eq!(
        levels,
        vec![true, true, false, false, true, true, false, false]
    );
    assert_eq!(ctx.sim.clock().cycle(), 2);
    assert_eq!(ctx.sim.stats().phases, 8);
}

#[test]
fn test_reset_holds_requests() {
    let mut ctx = TestContext::new("fetch 0x80000000", vec![0x13]);
    assert!(ctx.run_periods(3).is_none());
    assert!(!ctx.sim.inputs().rst_n);
    assert_eq!(ctx.sim.dut().issued(), 0);
    assert_eq!(ctx.sim.channel(Channel::Instruction).counters().grants, 0);

    assert!(ctx.run_periods(1).is_none());
    assert!(ctx.sim.inputs().rst_n);
    assert_eq!(ctx.sim.dut().issued(), 1);
    assert_eq!(ctx.sim.channel(Channel::Instruction).counters().grants, 1);
}

#[test]
fn test_read_data_applied_next_rising_edge() {
    let mut ctx = TestContext::new("fetch 0x80000000", vec![0x0000_0013_0000_0013]);
    let _ = ctx.run_periods(4);
    assert!(ctx.reads().is_empty());
    assert!(!ctx.sim.channel(Channel::Instruction).is_outstanding());

    let _ = ctx.run_periods(1);
    assert_eq!(
        ctx.reads(),
        &[CompletedRead {
            channel: Channel::Instruction,
            addr: 0x8000_0000,
            data: 0x13
        }]
    );
}

#[test]
fn test_fixed_latency_stretches_handshake() {
    let mut ctx = TestContext::with_policy(
        "load 0x80000000\nstore 0xf0f0f0f0 0xff 0",
        vec![0x55],
        Box::new(FixedDelay::new(2)),
    );
    let report = ctx.run();
    assert!(report.is_success());
    assert_eq!(report.stats.cycles, 11);
    assert_eq!(ctx.reads()[0].data, 0x55);
    assert_eq!(report.stats.dmem.grant_wait, 4);
    assert_eq!(report.stats.dmem.valid_wait, 2);
}

#[test]
fn test_policy_not_consulted_during_reset() {
    let policy = scripted(vec![], 1);
    let mut ctx = TestContext::with_policy("store 0xf0f0f0f0 0xff 0", vec![0x13], Box::new(policy));
    let report = ctx.run();
    assert!(report.is_success());
    assert_eq!(report.stats.cycles, 4);
}

#[test]
fn test_timeout_fails_run() {
    let mut config = fixed_config();
    config.general.timeout_cycles = 10;
    let mut ctx = TestContext::with_config("fetch 0x80000000", vec![0x13], vec![], &config);
    let report = ctx.run();
    match report.outcome {
        StepOutcome::Failed(SimError::Timeout { cycles, limit }) => {
            assert_eq!(cycles, 11);
            assert_eq!(limit, 10);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(ctx.sim.signature().is_closed());
}

#[test]
fn test_failure_flushes_signature_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DUT-fail.signature");
    let log = SignatureLog::create(&path).unwrap();
    let mut ctx = TestContext::with_log(
        "store 0xfffffff8 0xff 0x5\nload 0x100",
        vec![0x13],
        vec![],
        &fixed_config(),
        log,
    );

    let report = ctx.run();
    match &report.outcome {
        StepOutcome::Failed(err) => {
            assert_eq!(err.kind(), ErrorKind::AddressOutOfRange);
            assert_eq!(err.address(), Some(0x100));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "00000005\n");
}

#[test]
fn test_stats_count_traffic() {
    let script = "\
        store 0x1000 0xff 7\n\
        load 0x1000\n\
        fetch 0x80000000\n\
        fetch 0x80000008\n\
        store 0xfffffff8 0xff 1\n\
        store 0xf0f0f0f0 0xff 0\n";
    let mut ctx = TestContext::new(script, vec![0x0000_0013_0000_0013]);
    let report = ctx.run();
    assert!(report.is_success());

    let stats = &report.stats;
    assert_eq!(stats.instr_fetches, 2);
    assert_eq!(stats.data_reads, 1);
    assert_eq!(stats.data_writes, 3);
    assert_eq!(stats.signature_writes, 1);
    assert_eq!(stats.filler_reads, 1);
    assert_eq!(stats.dynamic_words, 1);
    assert_eq!(stats.transfers(), 6);
    assert_eq!(stats.imem.grants, 2);
    assert_eq!(stats.dmem.grants, 4);

    let data: Vec<u64> = ctx.reads().iter().map(|r| r.data).collect();
    assert_eq!(data, vec![7, 0x13, 0x13]);
}

#[test]
fn test_alert_logged_not_fatal() {
    let mut ctx = TestContext::new("alert\nstore 0xf0f0f0f0 0xff 0", vec![0x13]);
    let report = ctx.run();
    assert!(report.is_success());
    assert_eq!(report.stats.alert_cycles, 1);
}

#[test]
fn test_signature_register_reads_back() {
    let script = "store 0xfffffff8 0xff 0x77\nload 0xfffffff8\nstore 0xf0f0f0f0 0xff 0";
    let mut ctx = TestContext::new(script, vec![0x13]);
    assert!(ctx.run().is_success());
    assert_eq!(ctx.reads()[0].data, 0x77);
}

#[test]
fn test_boot_region_fetch() {
    let script = "fetch 0x0\nfetch 0x4\nstore 0xf0f0f0f0 0xff 0";
    let mut ctx = TestContext::with_config(
        script,
        vec![0x13],
        vec![0xAAAA_BBBB_CCCC_DDDD],
        &fixed_config(),
    );
    assert!(ctx.run().is_success());
    let data: Vec<u64> = ctx.reads().iter().map(|r| r.data).collect();
    assert_eq!(data, vec![0xCCCC_DDDD, 0xAAAA_BBBB]);
}

#[test]
fn test_overlapping_layout_rejected() {
    let mut config = Config::default();
    config.memory.text_offset = 0;
    let dut = TraceDut::new(Vec::new());
    let err = Simulator::new(dut, vec![0; 2], vec![0; 2], &config, SignatureLog::in_memory())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.general.timeout_cycles = 0;
    let dut = TraceDut::new(Vec::new());
    assert!(Simulator::new(dut, vec![], vec![], &config, SignatureLog::in_memory()).is_err());
}

/// Drives an end-of-test store and an unmapped fetch together once out of reset.
#[derive(Debug, Default)]
struct DualPortDut;

impl Dut for DualPortDut {
    fn eval(&mut self, inputs: &DutInputs) -> DutOutputs {
        if !inputs.rst_n {
            return DutOutputs::default();
        }
        DutOutputs {
            imem: InstrRequest {
                req: true,
                addr: 0x4000,
            },
            dmem: DataRequest {
                req: true,
                addr: 0xF0F0_F0F0,
                we: true,
                be: 0xFF,
                wdata: 0,
            },
            alert: false,
        }
    }
}

#[test]
fn test_end_of_test_preempts_same_period_reads() {
    let mut sim = Simulator::new(
        DualPortDut,
        vec![0x13],
        vec![],
        &fixed_config(),
        SignatureLog::in_memory(),
    )
    .unwrap();
    let report = sim.run().unwrap();
    assert!(
        matches!(report.outcome, StepOutcome::Completed),
        "unexpected outcome {:?}",
        report.outcome
    );
    assert_eq!(report.stats.cycles, 4);
    assert_eq!(report.stats.instr_fetches, 0);
}

#[test]
fn test_region_wrapping_address_space_rejected() {
    let mut config = fixed_config();
    config.memory.text_offset = 0xFFFF_FFFF_FFFF_FFF8;
    let dut = TraceDut::from_script("load 0xfffffffffffffff8").unwrap();
    let result = Simulator::new(dut, vec![0x13, 0x13], vec![], &config, SignatureLog::in_memory());
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));

    config.memory.text_offset = 0xFFFF_FFFF_FFFF_FFF0;
    let dut = TraceDut::from_script("load 0xfffffffffffffff0").unwrap();
    assert!(Simulator::new(dut, vec![0x13], vec![], &config, SignatureLog::in_memory()).is_ok());
}
