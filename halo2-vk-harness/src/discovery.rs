use anyhow::Context;
use slog_scope::debug;
use std::path::{Path, PathBuf};

use crate::StdResult;
use crate::circuit::CircuitDescriptor;

/// Find the circuit description files to test.
#[derive(Debug, Clone)]
pub struct CircuitDiscovery {
    circuits_dir: PathBuf,
    extension: String,
    transformed_prefix: String,
}

impl CircuitDiscovery {
    pub fn new(circuits_dir: &Path, extension: &str, transformed_prefix: &str) -> Self {
        Self {
            circuits_dir: circuits_dir.to_path_buf(),
            extension: extension.to_string(),
            transformed_prefix: transformed_prefix.to_string(),
        }
    }

    pub fn circuits_dir(&self) -> &Path {
        &self.circuits_dir
    }

    /// Path of a circuit given by name (ie: `circuits/SimpleAdd.ts` for `SimpleAdd`).
    pub fn target_path(&self, circuit_name: &str) -> PathBuf {
        self.circuits_dir
            .join(format!("{circuit_name}.{}", self.extension))
    }

    /// List the entries of the circuits directory (not recursive), sorted by file name.
    pub async fn list_entries(&self) -> StdResult<Vec<PathBuf>> {
        let mut read_dir = tokio::fs::read_dir(&self.circuits_dir)
            .await
            .with_context(|| {
                format!(
                    "could not read circuits directory `{}`",
                    self.circuits_dir.display()
                )
            })?;

        let mut entries = vec![];
        while let Some(entry) = read_dir.next_entry().await.with_context(|| {
            format!(
                "could not list circuits directory `{}`",
                self.circuits_dir.display()
            )
        })? {
            entries.push(entry.path());
        }
        entries.sort();

        Ok(entries)
    }

    /// Build the descriptor of the circuit at `path`, or `None` if the file must not be tested:
    /// not a regular file, wrong extension or variant generated by a previous run.
    pub async fn select(&self, path: &Path) -> Option<CircuitDescriptor> {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_file {
            debug!("Skipping entry: not a regular file"; "path" => %path.display());
            return None;
        }

        let descriptor = match CircuitDescriptor::from_path(path) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                debug!("Skipping entry: {error}"; "path" => %path.display());
                return None;
            }
        };
        if !descriptor
            .file_name()
            .ends_with(&format!(".{}", self.extension))
        {
            debug!("Skipping entry: not a circuit file"; "file" => descriptor.file_name());
            return None;
        }
        if descriptor.is_transformed_variant(&self.transformed_prefix) {
            debug!("Skipping entry: generated circuit variant"; "file" => descriptor.file_name());
            return None;
        }

        Some(descriptor)
    }
}
