//! Sequences of tool invocations checking that two verification keys are identical.

mod constant_folding;
mod reference;

use anyhow::Context;
use async_trait::async_trait;
use clap::ValueEnum;
use std::path::Path;

use crate::StdResult;
use crate::circuit::CircuitDescriptor;
use crate::outcome::TestOutcome;

pub use constant_folding::ConstantFoldingProtocol;
pub use reference::ReferenceProtocol;

/// Available equivalence protocols
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ProtocolKind {
    /// Compare the key of a circuit with the key of the same circuit once its constant markers
    /// are stripped.
    Constant,
    /// Compare the key of a circuit with the key generated by the matching reference test.
    Reference,
}

/// Test a circuit by generating two verification keys and comparing them.
#[async_trait]
pub trait EquivalenceProtocol: Sync + Send {
    /// Produce the outcome of the test of the given circuit.
    ///
    /// Tool failures are reported in the outcome, an error is only returned when the harness
    /// itself can not operate (ie: the circuit file can not be read).
    async fn evaluate(&self, descriptor: &CircuitDescriptor) -> StdResult<TestOutcome>;
}

/// Remove the verification keys left by a previous test and make sure their directories exist.
pub(crate) async fn prepare_artifacts(artifacts: &[&Path]) -> StdResult<()> {
    for artifact in artifacts {
        if let Some(parent) = artifact.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("could not create directory `{}`", parent.display()))?;
        }
        if artifact.exists() {
            tokio::fs::remove_file(artifact).await.with_context(|| {
                format!(
                    "could not remove previous verification key `{}`",
                    artifact.display()
                )
            })?;
        }
    }

    Ok(())
}
