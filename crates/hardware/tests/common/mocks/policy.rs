use mockall::mock;
use rvbench_core::soc::latency::DelayPolicy;

mock! {
    pub Policy {}
    impl DelayPolicy for Policy {
        fn next_delay(&mut self) -> u32;
    }
}

impl std::fmt::Debug for MockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPolicy").finish_non_exhaustive()
    }
}

/// Builds a mock that returns `delays` in order, then zero, and expects exactly `calls` draws.
pub fn scripted(delays: Vec<u32>, calls: usize) -> MockPolicy {
    let mut iter = delays.into_iter();
    let mut policy = MockPolicy::new();
    let _ = policy
        .expect_next_delay()
        .times(calls)
        .returning(move || iter.next().unwrap_or(0));
    policy
}
