//! # Supervisor Tests
//!
//! Timeout bound, signature logging to memory and disk, end-of-test, and fault reporting.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rvbench_core::common::{Channel, ErrorKind, SimError};
use rvbench_core::sim::supervisor::format_signature_line;
use rvbench_core::sim::{SignatureLog, StepOutcome, Supervisor};
use rvbench_core::soc::interconnect::{Target, WriteEffect};

#[rstest]
#[case(0xDEAD_BEEF, "deadbeef")]
#[case(0x1, "00000001")]
#[case(0x0, "00000000")]
#[case(0x1_0000_0000, "100000000")]
#[case(u64::MAX, "ffffffffffffffff")]
fn test_signature_line_format(#[case] value: u64, #[case] expected: &str) {
    assert_eq!(format_signature_line(value), expected);
}

#[test]
fn test_timeout_after_bound() {
    let mut sup = Supervisor::new(2, SignatureLog::in_memory());
    assert_eq!(sup.begin_cycle().unwrap(), 1);
    assert_eq!(sup.begin_cycle().unwrap(), 2);
    let err = sup.begin_cycle().unwrap_err();
    assert!(matches!(err, SimError::Timeout { cycles: 3, limit: 2 }));
}

#[test]
fn test_signature_write_logged() {
    let mut sup = Supervisor::new(10, SignatureLog::in_memory());
    let outcome = sup.on_write(WriteEffect::Signature(0xDEAD_BEEF)).unwrap();
    assert!(matches!(outcome, StepOutcome::Continue));
    assert_eq!(sup.signature().lines(), &[0xDEAD_BEEF]);
    assert_eq!(sup.signature().render(), "deadbeef\n");
}

#[test]
fn test_ordinary_write_not_logged() {
    let mut sup = Supervisor::new(10, SignatureLog::in_memory());
    let effect = WriteEffect::Stored {
        target: Target::Dynamic,
        value: 5,
    };
    assert!(!sup.on_write(effect).unwrap().is_terminal());
    assert!(sup.signature().lines().is_empty());
}

#[test]
fn test_end_of_test_completes() {
    let mut sup = Supervisor::new(10, SignatureLog::in_memory());
    let _ = sup.on_write(WriteEffect::Signature(1)).unwrap();
    let outcome = sup.on_write(WriteEffect::EndOfTest).unwrap();
    assert!(matches!(outcome, StepOutcome::Completed));
    assert!(outcome.is_terminal());
    assert_eq!(sup.signature().lines(), &[1]);
}

#[test]
fn test_fault_becomes_failed_outcome() {
    let sup = Supervisor::new(10, SignatureLog::in_memory());
    let outcome = sup.on_fault(SimError::AddressOutOfRange {
        addr: 0x100,
        channel: Channel::Data,
    });
    match outcome {
        StepOutcome::Failed(err) => {
            assert_eq!(err.kind(), ErrorKind::AddressOutOfRange);
            assert_eq!(err.address(), Some(0x100));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_signature_file_written_and_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DUT-test.signature");
    let mut log = SignatureLog::create(&path).unwrap();
    log.append(0xDEAD_BEEF).unwrap();
    log.append(0x2A).unwrap();
    log.finish().unwrap();
    log.finish().unwrap();

    assert!(log.is_closed());
    assert_eq!(log.path(), Some(path.as_path()));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "deadbeef\n0000002a\n"
    );
}

#[test]
fn test_signature_file_create_failure() {
    let err = SignatureLog::create("/no/such/dir/DUT.signature").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
