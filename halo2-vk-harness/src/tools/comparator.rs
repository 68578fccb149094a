use async_trait::async_trait;
use slog_scope::debug;
use std::path::Path;

use crate::outcome::FailureReason;
use crate::tools::ToolCommand;

/// Compare two verification keys byte for byte.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactComparator: Sync + Send {
    /// Succeed only if both files exist and have the exact same content.
    async fn compare(&self, test_name: &str, left: &Path, right: &Path)
    -> Result<(), FailureReason>;
}

/// [ArtifactComparator] delegating the comparison to the `diff` command.
pub struct DiffArtifactComparator {
    command: ToolCommand,
}

impl DiffArtifactComparator {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl ArtifactComparator for DiffArtifactComparator {
    async fn compare(
        &self,
        test_name: &str,
        left: &Path,
        right: &Path,
    ) -> Result<(), FailureReason> {
        for artifact in [left, right] {
            if !artifact.is_file() {
                return Err(FailureReason::ArtifactMissing(artifact.to_path_buf()));
            }
        }

        let args = [left, right].map(|path| path.display().to_string());
        let status = self
            .command
            .run(test_name, &args)
            .await
            .map_err(|e| FailureReason::tool_invocation(self.command.name(), e))?;
        debug!("Verification keys compared"; "test" => test_name, "status" => %status);

        if status.success() {
            Ok(())
        } else {
            Err(FailureReason::ArtifactMismatch {
                comparator: self.command.name().to_string(),
                exit_code: status.code(),
            })
        }
    }
}
