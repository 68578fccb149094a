use async_trait::async_trait;
use slog_scope::warn;
use std::path::PathBuf;
use std::sync::Arc;

use crate::StdResult;
use crate::circuit::CircuitDescriptor;
use crate::outcome::{FailureReason, TestOutcome};
use crate::protocol::{EquivalenceProtocol, prepare_artifacts};
use crate::tools::{ArtifactComparator, KeyGenerator, ReferenceTestRunner};

/// Check that the key generated from a circuit is the one produced by the reference
/// implementation of the same circuit.
pub struct ReferenceProtocol {
    key_generator: Arc<dyn KeyGenerator>,
    reference_runner: Arc<dyn ReferenceTestRunner>,
    comparator: Arc<dyn ArtifactComparator>,
    test_namespace: String,
    current_vk_path: PathBuf,
    reference_vk_path: PathBuf,
}

impl ReferenceProtocol {
    pub fn new(
        key_generator: Arc<dyn KeyGenerator>,
        reference_runner: Arc<dyn ReferenceTestRunner>,
        comparator: Arc<dyn ArtifactComparator>,
        test_namespace: &str,
        current_vk_path: PathBuf,
        reference_vk_path: PathBuf,
    ) -> Self {
        Self {
            key_generator,
            reference_runner,
            comparator,
            test_namespace: test_namespace.to_string(),
            current_vk_path,
            reference_vk_path,
        }
    }

    /// Fully qualified name of the reference test of a circuit
    /// (ie: `tests::gate::test_range_check` for `RangeCheck.gate.ts`).
    pub fn reference_test_name(
        &self,
        descriptor: &CircuitDescriptor,
    ) -> Result<String, FailureReason> {
        let kind = descriptor
            .kind()
            .map_err(|e| FailureReason::MalformedInput(e.to_string()))?;

        Ok(format!(
            "{}::{kind}::test_{}",
            self.test_namespace,
            descriptor.test_name()
        ))
    }

    async fn compare_keys(&self, descriptor: &CircuitDescriptor) -> Result<(), FailureReason> {
        let test_name = descriptor.test_name();
        let reference_test = self.reference_test_name(descriptor)?;

        self.key_generator
            .generate_vk(test_name, descriptor.path(), &self.current_vk_path)
            .await?;
        self.reference_runner
            .run_reference_test(test_name, &reference_test)
            .await?;

        self.comparator
            .compare(test_name, &self.current_vk_path, &self.reference_vk_path)
            .await
    }
}

#[async_trait]
impl EquivalenceProtocol for ReferenceProtocol {
    async fn evaluate(&self, descriptor: &CircuitDescriptor) -> StdResult<TestOutcome> {
        prepare_artifacts(&[
            self.current_vk_path.as_path(),
            self.reference_vk_path.as_path(),
        ])
        .await?;

        let result = self.compare_keys(descriptor).await;
        if let Err(FailureReason::MalformedInput(message)) = &result {
            warn!("Circuit can not be mapped to a reference test: {message}"; "file" => descriptor.file_name());
        }

        Ok(TestOutcome::new(descriptor.test_name(), result.into()))
    }
}
