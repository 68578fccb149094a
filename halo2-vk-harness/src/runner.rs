use slog_scope::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::StdResult;
use crate::discovery::CircuitDiscovery;
use crate::outcome::TestOutcome;
use crate::protocol::EquivalenceProtocol;
use crate::report::TestReport;
use crate::tools::ToolCommand;

/// Drive the test of the circuits, one at a time.
pub struct HarnessRunner {
    discovery: CircuitDiscovery,
    protocol: Arc<dyn EquivalenceProtocol>,
    failure_logs: Vec<ToolCommand>,
    failure_logs_lines: u64,
}

impl HarnessRunner {
    pub fn new(discovery: CircuitDiscovery, protocol: Arc<dyn EquivalenceProtocol>) -> Self {
        Self {
            discovery,
            protocol,
            failure_logs: vec![],
            failure_logs_lines: 0,
        }
    }

    /// Print the last `number_of_line` lines of the logs of the given tools after a failed test.
    pub fn with_failure_logs(mut self, tools: Vec<ToolCommand>, number_of_line: u64) -> Self {
        self.failure_logs = tools;
        self.failure_logs_lines = number_of_line;
        self
    }

    /// Test every circuit of the circuits directory and collect their outcomes.
    pub async fn run_all(&self) -> StdResult<TestReport> {
        info!("Scanning circuits directory"; "path" => %self.discovery.circuits_dir().display());
        let mut report = TestReport::new();
        for path in self.discovery.list_entries().await? {
            report.record(self.test_circuit(&path).await?);
        }

        Ok(report)
    }

    /// Test only the circuit with the given name, without scanning the circuits directory.
    pub async fn run_single(&self, circuit_name: &str) -> StdResult<Option<TestOutcome>> {
        let path = self.discovery.target_path(circuit_name);
        let outcome = self.test_circuit(&path).await?;
        if outcome.is_none() {
            println!("Skipped {}", path.display());
        }

        Ok(outcome)
    }

    /// Test the circuit at `path`, returns `None` if the file is not a circuit to test.
    pub async fn test_circuit(&self, path: &Path) -> StdResult<Option<TestOutcome>> {
        let Some(descriptor) = self.discovery.select(path).await else {
            return Ok(None);
        };

        println!("Testing {}", descriptor.test_name());
        let outcome = self.protocol.evaluate(&descriptor).await?;
        println!("{outcome}");

        if !outcome.is_pass() {
            self.print_failure_logs(&outcome.test_name).await;
        }

        Ok(Some(outcome))
    }

    async fn print_failure_logs(&self, test_name: &str) {
        if self.failure_logs_lines == 0 {
            return;
        }

        for tool in &self.failure_logs {
            if let Err(error) = tool.tail_logs(test_name, self.failure_logs_lines).await {
                warn!("Could not print {} logs: {error:#}", tool.name(); "test" => test_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::circuit::{CircuitDescriptor, ConstantRewriter};
    use crate::outcome::{FailureReason, TestResult};
    use crate::protocol::ConstantFoldingProtocol;
    use crate::test_utils::TempDir;
    use crate::tools::{MockArtifactComparator, MockKeyGenerator};

    use super::*;

    /// Fails the circuits whose source contains `fail`, and remembers the tested files.
    #[derive(Default)]
    struct SourceBasedProtocol {
        evaluated: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EquivalenceProtocol for SourceBasedProtocol {
        async fn evaluate(&self, descriptor: &CircuitDescriptor) -> StdResult<TestOutcome> {
            self.evaluated
                .lock()
                .unwrap()
                .push(descriptor.file_name().to_string());
            let source = descriptor.read_source().await?;

            Ok(if source.contains("fail") {
                TestOutcome::fail(
                    descriptor.test_name(),
                    FailureReason::ArtifactMismatch {
                        comparator: "diff".to_string(),
                        exit_code: Some(1),
                    },
                )
            } else {
                TestOutcome::pass(descriptor.test_name())
            })
        }
    }

    fn write_circuits(dir: &Path, circuits: &[(&str, &str)]) {
        for (file_name, source) in circuits {
            std::fs::write(dir.join(file_name), source).unwrap();
        }
    }

    fn build_runner(dir: &Path, protocol: Arc<SourceBasedProtocol>) -> HarnessRunner {
        HarnessRunner::new(CircuitDiscovery::new(dir, "ts", "constant."), protocol)
    }

    #[tokio::test]
    async fn run_all_reports_every_candidate_once() {
        let dir = TempDir::create("runner", "run_all_reports_every_candidate_once");
        write_circuits(
            &dir,
            &[
                ("SimpleAdd.ts", "add(1, 2);"),
                ("RangeCheck.gate.ts", "fail"),
                ("constant.SimpleAdd.ts", "add(1, 2);"),
                ("notes.txt", "fail"),
            ],
        );
        std::fs::create_dir(dir.join("nested")).unwrap();
        let protocol = Arc::new(SourceBasedProtocol::default());
        let runner = build_runner(&dir, protocol.clone());

        let report = runner.run_all().await.unwrap();

        assert_eq!(vec!["simple_add"], report.passed());
        assert_eq!(vec!["range_check"], report.failed());
        assert_eq!(1, report.exit_code());
        assert_eq!(
            vec!["RangeCheck.gate.ts", "SimpleAdd.ts"],
            *protocol.evaluated.lock().unwrap()
        );
    }

    #[tokio::test]
    async fn run_all_with_only_passing_circuits_exits_successfully() {
        let dir = TempDir::create("runner", "run_all_with_only_passing_circuits");
        write_circuits(&dir, &[("SimpleAdd.ts", ""), ("MulAdd.ts", "")]);
        let runner = build_runner(&dir, Arc::new(SourceBasedProtocol::default()));

        let report = runner.run_all().await.unwrap();

        assert_eq!(vec!["mul_add", "simple_add"], report.passed());
        assert_eq!(0, report.exit_code());
    }

    #[tokio::test]
    async fn run_all_fails_without_circuits_directory() {
        let dir = TempDir::create("runner", "run_all_fails_without_circuits_directory");
        let runner = build_runner(
            &dir.join("circuits"),
            Arc::new(SourceBasedProtocol::default()),
        );

        runner
            .run_all()
            .await
            .expect_err("missing circuits directory should fail");
    }

    #[tokio::test]
    async fn run_single_only_tests_the_target() {
        let dir = TempDir::create("runner", "run_single_only_tests_the_target");
        write_circuits(&dir, &[("SimpleAdd.ts", "fail"), ("MulAdd.ts", "")]);
        let protocol = Arc::new(SourceBasedProtocol::default());
        let runner = build_runner(&dir, protocol.clone());

        let outcome = runner.run_single("SimpleAdd").await.unwrap();

        assert_eq!(
            Some("simple_add".to_string()),
            outcome.as_ref().map(|o| o.test_name.clone())
        );
        assert!(!outcome.unwrap().is_pass());
        assert_eq!(vec!["SimpleAdd.ts"], *protocol.evaluated.lock().unwrap());
    }

    #[tokio::test]
    async fn run_single_skips_missing_or_generated_targets() {
        let dir = TempDir::create("runner", "run_single_skips_missing_or_generated_targets");
        write_circuits(&dir, &[("constant.SimpleAdd.ts", "")]);
        let protocol = Arc::new(SourceBasedProtocol::default());
        let runner = build_runner(&dir, protocol.clone());

        assert_eq!(None, runner.run_single("Missing").await.unwrap());
        assert_eq!(None, runner.run_single("constant.SimpleAdd").await.unwrap());
        assert!(protocol.evaluated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_failure_logs_do_not_stop_the_run() {
        let dir = TempDir::create("runner", "missing_failure_logs_do_not_stop_the_run");
        write_circuits(&dir, &[("SimpleAdd.ts", "fail")]);
        let keygen = ToolCommand::new(
            "keygen",
            crate::configuration::CommandTemplate {
                program: "true".to_string(),
                args: vec![],
            },
            &dir,
            &dir.join("logs"),
        );
        let runner = build_runner(&dir, Arc::new(SourceBasedProtocol::default()))
            .with_failure_logs(vec![keygen], 10);

        let report = runner.run_all().await.unwrap();

        assert_eq!(vec!["simple_add"], report.failed());
    }

    fn always_equal_keys_protocol(
        dir: &Path,
        number_of_circuits: usize,
    ) -> Arc<ConstantFoldingProtocol> {
        let mut key_generator = MockKeyGenerator::new();
        key_generator
            .expect_generate_vk()
            .times(2 * number_of_circuits)
            .returning(|_, _, _| Ok(()));
        let mut comparator = MockArtifactComparator::new();
        comparator
            .expect_compare()
            .times(number_of_circuits)
            .returning(|_, _, _| Ok(()));

        Arc::new(ConstantFoldingProtocol::new(
            Arc::new(key_generator),
            Arc::new(comparator),
            ConstantRewriter::default(),
            "constant.",
            dir.join("data").join("vk.bin"),
            dir.join("data").join("const_vk.bin"),
        ))
    }

    #[tokio::test]
    async fn unreadable_circuit_fails_without_stopping_the_scan() {
        let dir = TempDir::create("runner", "unreadable_circuit_fails_without_stopping_the_scan");
        write_circuits(
            &dir,
            &[("Alpha.ts", "add(1, constant(2));"), ("Gamma.ts", "mul(3, 4);")],
        );
        std::fs::write(dir.join("Beta.ts"), [0xff, 0xfe, 0x00]).unwrap();
        let runner = HarnessRunner::new(
            CircuitDiscovery::new(&dir, "ts", "constant."),
            always_equal_keys_protocol(&dir, 2),
        );

        let report = runner.run_all().await.unwrap();

        assert_eq!(vec!["alpha", "gamma"], report.passed());
        assert_eq!(vec!["beta"], report.failed());
        assert_eq!(1, report.exit_code());
    }

    #[tokio::test]
    async fn unreadable_single_target_is_a_failed_outcome() {
        let dir = TempDir::create("runner", "unreadable_single_target_is_a_failed_outcome");
        std::fs::write(dir.join("Beta.ts"), [0xff, 0xfe, 0x00]).unwrap();
        let runner = HarnessRunner::new(
            CircuitDiscovery::new(&dir, "ts", "constant."),
            always_equal_keys_protocol(&dir, 0),
        );

        let outcome = runner.run_single("Beta").await.unwrap().unwrap();

        assert_eq!("beta", outcome.test_name);
        assert!(matches!(
            outcome.result,
            TestResult::Fail(FailureReason::MalformedInput(_))
        ));
    }
}
