use anyhow::Context;
use std::path::Path;
use tokio::process::Command;

use crate::StdResult;

/// Tail a file into a string.
///
/// For the sake of simplicity it use internally the tail command so be sure to have it on
/// your system.
pub async fn tail(file_path: &Path, number_of_line: u64) -> StdResult<String> {
    let tail_result = Command::new("tail")
        .arg("-n")
        .arg(number_of_line.to_string())
        .arg(file_path)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to tail file `{}`", file_path.display()))?;

    String::from_utf8(tail_result.stdout).with_context(|| "Failed to parse tail output to utf8")
}
