use std::fmt::{Display, Formatter};

use crate::outcome::{FailureReason, TestOutcome, TestResult};

/// Outcomes of a scan, in the order the circuits were tested.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestReport {
    passed: Vec<String>,
    failed: Vec<(String, FailureReason)>,
}

impl TestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a circuit, `None` (skipped file) is not recorded.
    pub fn record(&mut self, outcome: Option<TestOutcome>) {
        match outcome {
            Some(TestOutcome {
                test_name,
                result: TestResult::Pass,
            }) => self.passed.push(test_name),
            Some(TestOutcome {
                test_name,
                result: TestResult::Fail(reason),
            }) => self.failed.push((test_name, reason)),
            None => {}
        }
    }

    pub fn passed(&self) -> &[String] {
        &self.passed
    }

    pub fn failed(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Process exit code of the scan: `1` if any test failed, `0` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.has_failures() { 1 } else { 0 }
    }
}

impl Display for TestReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "passed: [{}]", self.passed.join(", "))?;
        writeln!(f, "failed: [{}]", self.failed().join(", "))?;
        for (test_name, reason) in &self.failed {
            writeln!(f, "  {test_name}: {reason}")?;
        }

        Ok(())
    }
}
