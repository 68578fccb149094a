use anyhow::{Context, anyhow};
use slog_scope::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use tokio::process::Command;

use crate::StdResult;
use crate::configuration::CommandTemplate;
use crate::utils::file_utils;

/// An external tool run by the harness.
///
/// The stdout and stderr of each run are redirected to a log file named after the test being
/// run, so they never interleave with the harness output. The log of a test is truncated by
/// its first run in the process, so it never holds the output of a previous harness run.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    name: String,
    program: String,
    default_args: Vec<String>,
    work_dir: PathBuf,
    logs_dir: PathBuf,
    logged_tests: Arc<Mutex<HashSet<String>>>,
}

impl ToolCommand {
    pub fn new(name: &str, template: CommandTemplate, work_dir: &Path, logs_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            program: template.program,
            default_args: template.args,
            work_dir: work_dir.to_path_buf(),
            logs_dir: logs_dir.to_path_buf(),
            logged_tests: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the file where the output of the run for the given test is captured.
    pub fn log_path(&self, test_name: &str) -> PathBuf {
        self.logs_dir.join(format!("{test_name}.{}.log", self.name))
    }

    /// Run the tool to completion and return its exit status.
    ///
    /// An error is only returned if the tool could not be started.
    pub async fn run(&self, test_name: &str, args: &[String]) -> StdResult<ExitStatus> {
        let args = [self.default_args.as_slice(), args].concat();
        let log_path = self.log_path(test_name);

        tokio::fs::create_dir_all(&self.logs_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create logs directory `{}`",
                    self.logs_dir.display()
                )
            })?;
        let first_run_of_test = self
            .logged_tests
            .lock()
            .map_err(|e| anyhow!("{} logged tests lock poisoned: {e}", self.name))?
            .insert(test_name.to_string());
        let log_file_stderr = std::fs::File::options()
            .create(true)
            .write(true)
            .truncate(first_run_of_test)
            .append(!first_run_of_test)
            .open(&log_path)
            .with_context(|| format!("failed to use file `{}` for logging", log_path.display()))?;
        let log_file_stdout = log_file_stderr
            .try_clone()
            .with_context(|| format!("failed to use file `{}` for logging", log_path.display()))?;

        let mut command = Command::new(&self.program);
        command
            .current_dir(&self.work_dir)
            .stdout(log_file_stdout)
            .stderr(log_file_stderr)
            .args(&args)
            .kill_on_drop(true);

        info!("Running {}", self.name; "program" => &self.program, "work_dir" => %self.work_dir.display(), "args" => ?&args);

        command
            .spawn()
            .with_context(|| format!("{} failed to start", self.name))?
            .wait()
            .await
            .with_context(|| format!("{} crashed", self.name))
    }

    /// Tail the log of the run for the given test.
    pub async fn tail_logs(&self, test_name: &str, number_of_line: u64) -> StdResult<()> {
        let log_path = self.log_path(test_name);
        if !log_path.exists() {
            return Err(anyhow!(
                "No log for {}, did the tool run for '{test_name}' ? expected path: {}",
                self.name,
                log_path.display()
            ));
        }

        println!("{:-^100}", "");
        println!(
            "{:^30}",
            format!(
                "{} LOGS - {test_name} - LAST {number_of_line} LINES:",
                self.name.to_uppercase()
            )
        );
        println!("{:-^100}", "");
        println!("{}", file_utils::tail(&log_path, number_of_line).await?);

        Ok(())
    }
}
