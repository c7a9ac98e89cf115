// nt_sbi/src/selftest/mod.rs

//! Boot-time self tests.
//!
//! Small suites that exercise the dispatch tables on private instances, so
//! they can run on real hardware before the supervisor is started without
//! touching the global firmware state.


use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

impl TestResult {
    /// `Pass` if `cond` holds, `Fail` otherwise.
    pub fn check(cond: bool) -> Self {
        if cond {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

pub struct TestCase {
    pub name: &'static str,
    pub func: fn() -> TestResult,
    pub description: &'static str,
}

#[derive(Debug, Default)]
pub struct TestRunner {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_test(&mut self, test: &TestCase) -> TestResult {
        self.total += 1;
        let result = (test.func)();
        match result {
            TestResult::Pass => {
                self.passed += 1;
                info!("  [PASS] {} - {}", test.name, test.description);
            }
            TestResult::Fail => {
                self.failed += 1;
                error!("  [FAIL] {} - {}", test.name, test.description);
            }
            TestResult::Skip => {
                self.skipped += 1;
                warn!("  [SKIP] {} - {}", test.name, test.description);
            }
        }
        result
    }

    pub fn run_suite(&mut self, suite_name: &str, tests: &[TestCase]) {
        info!("=== {} ===", suite_name);
        for test in tests {
            self.run_test(test);
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn print_summary(&self) {
        info!(
            "self-test: {} total, {} passed, {} failed, {} skipped",
            self.total, self.passed, self.failed, self.skipped
        );
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.total > 0
    }
}

/// Runs every suite and returns the runner with the tallies.
pub fn run_all_tests() -> TestRunner {
    let mut runner = TestRunner::new();

    hartmask_test::run_hartmask_tests(&mut runner);
    ecall_test::run_ecall_tests(&mut runner);
    irqchip_test::run_irqchip_tests(&mut runner);

    runner.print_summary();
    if !runner.all_passed() {
        warn!("self-test: some tests failed");
    }
    runner
}
