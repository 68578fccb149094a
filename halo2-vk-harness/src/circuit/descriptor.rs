use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::StdResult;
use crate::circuit::{ConstantRewriter, to_test_name};

/// [CircuitDescriptor] related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// The file name has no `<name>.<kind>.<extension>` structure.
    #[error(
        "circuit file name '{0}' has no kind segment, expected '<CircuitName>.<kind>.<extension>'"
    )]
    MissingKind(String),

    /// The path has no file name or a file name that is not valid unicode.
    #[error("invalid circuit path '{}'", .0.display())]
    InvalidPath(PathBuf),
}

/// A circuit description file found in the circuits directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitDescriptor {
    path: PathBuf,
    file_name: String,
    test_name: String,
}

impl CircuitDescriptor {
    /// Build a descriptor from the path of a circuit file.
    ///
    /// No IO is done: the source is only read when a transformed variant is needed.
    pub fn from_path(path: &Path) -> Result<Self, DescriptorError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DescriptorError::InvalidPath(path.to_path_buf()))?
            .to_string();
        let circuit_name = file_name.split('.').next().unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            test_name: to_test_name(circuit_name),
            file_name,
        })
    }

    /// Path of the circuit file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the circuit, its identity in the circuits directory
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Canonical name of the circuit test (ie: `simple_add` for `SimpleAdd.ts`)
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Kind of the circuit, taken from the segment preceding the extension
    /// (ie: `gate` for `RangeCheck.gate.ts`).
    pub fn kind(&self) -> Result<&str, DescriptorError> {
        let segments: Vec<&str> = self.file_name.split('.').collect();
        match segments.as_slice() {
            [_, .., kind, _] if !kind.is_empty() => Ok(*kind),
            _ => Err(DescriptorError::MissingKind(self.file_name.clone())),
        }
    }

    /// Check if this file is a variant generated by a previous run.
    pub fn is_transformed_variant(&self, transformed_prefix: &str) -> bool {
        self.file_name.contains(transformed_prefix)
    }

    /// Read the source of the circuit.
    pub async fn read_source(&self) -> StdResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("could not read circuit file `{}`", self.path.display()))
    }

    /// Apply the rewriter to `source` (the content of this circuit) and write the result next
    /// to the original file, its name prefixed with `transformed_prefix`.
    pub async fn write_transformed(
        &self,
        source: &str,
        rewriter: &ConstantRewriter,
        transformed_prefix: &str,
    ) -> StdResult<TransformedDescriptor> {
        let transformed_path = self
            .path
            .with_file_name(format!("{transformed_prefix}{}", self.file_name));

        tokio::fs::write(&transformed_path, rewriter.rewrite(source))
            .await
            .with_context(|| {
                format!(
                    "could not write transformed circuit file `{}`",
                    transformed_path.display()
                )
            })?;

        Ok(TransformedDescriptor {
            path: transformed_path,
        })
    }
}

/// A circuit variant generated from a [CircuitDescriptor] and persisted for the key generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedDescriptor {
    path: PathBuf,
}

impl TransformedDescriptor {
    /// Path of the generated file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the generated file.
    pub async fn remove(self) -> StdResult<()> {
        tokio::fs::remove_file(&self.path).await.with_context(|| {
            format!(
                "could not remove transformed circuit file `{}`",
                self.path.display()
            )
        })
    }
}
