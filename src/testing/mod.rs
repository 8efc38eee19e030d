//! On-target self-test support
//!
//! Minimal test harness for checks that have to run against the real
//! kernel API on hardware (or under QEMU). Output goes through any
//! `uWrite` sink, so the host unit tests can capture it in a buffer.

use ufmt::{uwrite, uWrite};

pub trait TestCase {
    fn name(&self) -> &'static str;
    fn run(&self) -> TestResult;
}

#[derive(PartialEq, Eq, Debug)]
pub enum TestResult {
    Pass,
    Fail(&'static str),
}

pub struct TestRunner<W: uWrite> {
    out: W,
    total: u32,
    passed: u32,
}

impl<W: uWrite> TestRunner<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            total: 0,
            passed: 0,
        }
    }

    /// Runs every case in order and prints a summary. Returns true when
    /// all of them passed.
    pub fn run_suite(&mut self, name: &str, tests: &[&dyn TestCase]) -> bool {
        let mut all_passed = true;
        uwrite!(self.out, "=== {} ===\r\n", name).ok();

        for test in tests {
            self.total += 1;
            uwrite!(self.out, "{}: ", test.name()).ok();
            match test.run() {
                TestResult::Pass => {
                    self.passed += 1;
                    uwrite!(self.out, "PASS\r\n").ok();
                }
                TestResult::Fail(reason) => {
                    all_passed = false;
                    uwrite!(self.out, "FAIL - {}\r\n", reason).ok();
                }
            }
        }

        uwrite!(self.out, "passed {}/{}\r\n", self.passed, self.total).ok();
        all_passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Fails the surrounding `run` with a message unless the two values match.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr, $msg:expr) => {
        if $left != $right {
            return $crate::testing::TestResult::Fail($msg);
        }
    };
}
