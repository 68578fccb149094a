use std::sync::Arc;

use crate::StdResult;
use crate::circuit::ConstantRewriter;
use crate::configuration::{CommandTemplate, HarnessConfiguration};
use crate::discovery::CircuitDiscovery;
use crate::protocol::{
    ConstantFoldingProtocol, EquivalenceProtocol, ProtocolKind, ReferenceProtocol,
};
use crate::runner::HarnessRunner;
use crate::tools::{
    CargoReferenceTestRunner, DiffArtifactComparator, Halo2WasmKeyGenerator, ToolCommand,
};

/// Assemble a [HarnessRunner] and its tools from the configuration.
pub struct HarnessBuilder {
    configuration: HarnessConfiguration,
    protocol: ProtocolKind,
    remove_transformed: bool,
    failure_logs_lines: u64,
}

impl HarnessBuilder {
    pub fn new(configuration: HarnessConfiguration, protocol: ProtocolKind) -> Self {
        Self {
            configuration,
            protocol,
            remove_transformed: false,
            failure_logs_lines: 0,
        }
    }

    /// Delete the transformed circuits once tested (constant protocol only).
    pub fn remove_transformed(mut self, remove: bool) -> Self {
        self.remove_transformed = remove;
        self
    }

    /// Number of lines of each tool log printed after a failed test, `0` to disable.
    pub fn failure_logs_lines(mut self, number_of_line: u64) -> Self {
        self.failure_logs_lines = number_of_line;
        self
    }

    fn tool(&self, name: &str, template: CommandTemplate) -> ToolCommand {
        ToolCommand::new(
            name,
            template,
            &self.configuration.work_directory,
            &self.configuration.logs_dir(),
        )
    }

    pub fn build(self) -> StdResult<HarnessRunner> {
        let configuration = &self.configuration;
        let keygen_command = self.tool("keygen", configuration.keygen_command()?);
        let diff_command = self.tool("diff", configuration.diff_command()?);
        let key_generator = Arc::new(Halo2WasmKeyGenerator::new(
            keygen_command.clone(),
            configuration.circuit_scaffold(),
        ));
        let comparator = Arc::new(DiffArtifactComparator::new(diff_command.clone()));
        let current_vk_path = configuration.resolve(&configuration.current_vk_path);

        let (protocol, logged_tools): (Arc<dyn EquivalenceProtocol>, Vec<ToolCommand>) =
            match self.protocol {
                ProtocolKind::Constant => (
                    Arc::new(
                        ConstantFoldingProtocol::new(
                            key_generator,
                            comparator,
                            ConstantRewriter::new(&configuration.constant_marker),
                            &configuration.transformed_prefix,
                            current_vk_path,
                            configuration.resolve(&configuration.transformed_vk_path),
                        )
                        .remove_transformed(self.remove_transformed),
                    ),
                    vec![keygen_command, diff_command],
                ),
                ProtocolKind::Reference => {
                    let reference_test_command = ToolCommand::new(
                        "reference-test",
                        configuration.reference_test_command()?,
                        &configuration.reference_work_dir(),
                        &configuration.logs_dir(),
                    );
                    (
                        Arc::new(ReferenceProtocol::new(
                            key_generator,
                            Arc::new(CargoReferenceTestRunner::new(
                                reference_test_command.clone(),
                            )),
                            comparator,
                            &configuration.reference_test_namespace,
                            current_vk_path,
                            configuration.resolve(&configuration.reference_vk_path),
                        )),
                        vec![keygen_command, reference_test_command, diff_command],
                    )
                }
            };

        let discovery = CircuitDiscovery::new(
            &configuration.circuits_dir(),
            &configuration.circuit_extension,
            &configuration.transformed_prefix,
        );

        Ok(HarnessRunner::new(discovery, protocol)
            .with_failure_logs(logged_tools, self.failure_logs_lines))
    }
}
