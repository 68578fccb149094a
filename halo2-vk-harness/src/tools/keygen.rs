use async_trait::async_trait;
use slog_scope::{debug, warn};
use std::path::Path;

use crate::outcome::FailureReason;
use crate::tools::ToolCommand;

/// Generate the verification key of a circuit description file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyGenerator: Sync + Send {
    /// Compile the circuit at `circuit_path` and write its verification key to `vk_path`.
    ///
    /// The caller must check that the key was written: tools may exit successfully without
    /// producing anything.
    async fn generate_vk(
        &self,
        test_name: &str,
        circuit_path: &Path,
        vk_path: &Path,
    ) -> Result<(), FailureReason>;
}

/// [KeyGenerator] running the `halo2-wasm keygen` CLI.
pub struct Halo2WasmKeyGenerator {
    command: ToolCommand,
    circuit_scaffold: Option<String>,
}

impl Halo2WasmKeyGenerator {
    pub fn new(command: ToolCommand, circuit_scaffold: Option<&str>) -> Self {
        Self {
            command,
            circuit_scaffold: circuit_scaffold.map(str::to_string),
        }
    }

    fn args(&self, circuit_path: &Path, vk_path: &Path) -> Vec<String> {
        let mut args = vec![circuit_path.display().to_string()];
        if let Some(scaffold) = &self.circuit_scaffold {
            args.extend(["-c".to_string(), scaffold.clone()]);
        }
        args.extend(["-vk".to_string(), vk_path.display().to_string()]);

        args
    }
}

#[async_trait]
impl KeyGenerator for Halo2WasmKeyGenerator {
    async fn generate_vk(
        &self,
        test_name: &str,
        circuit_path: &Path,
        vk_path: &Path,
    ) -> Result<(), FailureReason> {
        let status = self
            .command
            .run(test_name, &self.args(circuit_path, vk_path))
            .await
            .map_err(|e| FailureReason::tool_invocation(self.command.name(), e))?;

        if status.success() {
            debug!("Verification key generated"; "test" => test_name, "circuit" => %circuit_path.display());
        } else {
            warn!(
                "{} exited with {status}", self.command.name();
                "test" => test_name, "log" => %self.command.log_path(test_name).display()
            );
        }

        Ok(())
    }
}
