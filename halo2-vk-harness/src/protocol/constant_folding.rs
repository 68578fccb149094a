use async_trait::async_trait;
use slog_scope::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::StdResult;
use crate::circuit::{CircuitDescriptor, ConstantRewriter, TransformedDescriptor};
use crate::outcome::{FailureReason, TestOutcome};
use crate::protocol::{EquivalenceProtocol, prepare_artifacts};
use crate::tools::{ArtifactComparator, KeyGenerator};

/// Check that stripping the constant markers of a circuit keeps its verification key.
pub struct ConstantFoldingProtocol {
    key_generator: Arc<dyn KeyGenerator>,
    comparator: Arc<dyn ArtifactComparator>,
    rewriter: ConstantRewriter,
    transformed_prefix: String,
    current_vk_path: PathBuf,
    transformed_vk_path: PathBuf,
    remove_transformed: bool,
}

impl ConstantFoldingProtocol {
    pub fn new(
        key_generator: Arc<dyn KeyGenerator>,
        comparator: Arc<dyn ArtifactComparator>,
        rewriter: ConstantRewriter,
        transformed_prefix: &str,
        current_vk_path: PathBuf,
        transformed_vk_path: PathBuf,
    ) -> Self {
        Self {
            key_generator,
            comparator,
            rewriter,
            transformed_prefix: transformed_prefix.to_string(),
            current_vk_path,
            transformed_vk_path,
            remove_transformed: false,
        }
    }

    /// Delete each transformed circuit once its test is done.
    pub fn remove_transformed(mut self, remove: bool) -> Self {
        self.remove_transformed = remove;
        self
    }

    async fn compare_keys(
        &self,
        descriptor: &CircuitDescriptor,
        transformed: &TransformedDescriptor,
    ) -> Result<(), FailureReason> {
        let test_name = descriptor.test_name();
        self.key_generator
            .generate_vk(test_name, descriptor.path(), &self.current_vk_path)
            .await?;
        self.key_generator
            .generate_vk(test_name, transformed.path(), &self.transformed_vk_path)
            .await?;

        self.comparator
            .compare(test_name, &self.current_vk_path, &self.transformed_vk_path)
            .await
    }
}

#[async_trait]
impl EquivalenceProtocol for ConstantFoldingProtocol {
    async fn evaluate(&self, descriptor: &CircuitDescriptor) -> StdResult<TestOutcome> {
        let source = match descriptor.read_source().await {
            Ok(source) => source,
            Err(error) => {
                warn!("Circuit source can not be read"; "path" => %descriptor.path().display(), "error" => format!("{error:#}"));
                return Ok(TestOutcome::fail(
                    descriptor.test_name(),
                    FailureReason::MalformedInput(format!("{error:#}")),
                ));
            }
        };
        prepare_artifacts(&[
            self.current_vk_path.as_path(),
            self.transformed_vk_path.as_path(),
        ])
        .await?;
        let transformed = descriptor
            .write_transformed(&source, &self.rewriter, &self.transformed_prefix)
            .await?;
        debug!("Transformed circuit written"; "path" => %transformed.path().display());

        let result = self.compare_keys(descriptor, &transformed).await;
        if self.remove_transformed {
            transformed.remove().await?;
        }

        Ok(TestOutcome::new(descriptor.test_name(), result.into()))
    }
}
