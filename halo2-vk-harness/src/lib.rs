//! Differential testing of halo2 circuit descriptions.
//!
//! Each circuit of a directory is compiled twice by an external key generator, once as is and
//! once transformed (constant markers stripped) or by a reference implementation. The test
//! passes if both verification keys are byte for byte identical.

mod builder;
pub mod circuit;
pub mod configuration;
mod discovery;
pub mod outcome;
pub mod protocol;
mod report;
mod runner;
pub mod tools;
mod utils;

#[cfg(test)]
mod test_utils;

pub use builder::HarnessBuilder;
pub use configuration::{DefaultConfiguration, HarnessConfiguration};
pub use discovery::CircuitDiscovery;
pub use protocol::ProtocolKind;
pub use report::TestReport;
pub use runner::HarnessRunner;

/// Generic error type
pub type StdResult<T> = anyhow::Result<T>;
