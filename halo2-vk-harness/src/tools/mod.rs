//! External tools driven by the harness: key generator, reference tests and comparator.

mod comparator;
mod keygen;
mod tool_command;

pub use comparator::{ArtifactComparator, DiffArtifactComparator};
pub use keygen::{Halo2WasmKeyGenerator, KeyGenerator};
pub use reference_test::{CargoReferenceTestRunner, ReferenceTestRunner};
pub use tool_command::ToolCommand;

#[cfg(test)]
pub use comparator::MockArtifactComparator;
#[cfg(test)]
pub use keygen::MockKeyGenerator;
#[cfg(test)]
pub use reference_test::MockReferenceTestRunner;
