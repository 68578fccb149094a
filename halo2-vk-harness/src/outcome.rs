use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use thiserror::Error;

/// Why a circuit test did not pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FailureReason {
    /// An external tool could not be run at all.
    #[error("could not run {tool}: {message}")]
    ToolInvocationFailed { tool: String, message: String },

    /// A tool ran but did not write its verification key.
    #[error("verification key `{}` was not produced", .0.display())]
    ArtifactMissing(PathBuf),

    /// Both verification keys were produced but their bytes differ.
    #[error("verification keys differ ({comparator} exit code: {exit_code:?})")]
    ArtifactMismatch {
        comparator: String,
        exit_code: Option<i32>,
    },

    /// The circuit file can not be mapped to a test.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl FailureReason {
    /// Shortcut for [FailureReason::ToolInvocationFailed] from any error.
    pub fn tool_invocation<E: Display>(tool: &str, error: E) -> Self {
        Self::ToolInvocationFailed {
            tool: tool.to_string(),
            message: format!("{error:#}"),
        }
    }
}

/// Result of the comparison of two verification keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Pass,
    Fail(FailureReason),
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }
}

impl From<Result<(), FailureReason>> for TestResult {
    fn from(result: Result<(), FailureReason>) -> Self {
        match result {
            Ok(()) => TestResult::Pass,
            Err(reason) => TestResult::Fail(reason),
        }
    }
}

/// Outcome of the test of one circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub test_name: String,
    pub result: TestResult,
}

impl TestOutcome {
    pub fn new<T: Into<String>>(test_name: T, result: TestResult) -> Self {
        Self {
            test_name: test_name.into(),
            result,
        }
    }

    pub fn pass<T: Into<String>>(test_name: T) -> Self {
        Self::new(test_name, TestResult::Pass)
    }

    pub fn fail<T: Into<String>>(test_name: T, reason: FailureReason) -> Self {
        Self::new(test_name, TestResult::Fail(reason))
    }

    pub fn is_pass(&self) -> bool {
        self.result.is_pass()
    }
}

impl Display for TestOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.result {
            TestResult::Pass => write!(f, "{}: passed", self.test_name),
            TestResult::Fail(reason) => write!(f, "{}: failed, {reason}", self.test_name),
        }
    }
}
