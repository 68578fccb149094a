use config::{ConfigError, Map, Source, Value, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Error raised when a command parameter has no program.
    #[error("Parameter '{0}' must contain at least a program name.")]
    EmptyCommand(String),
}

/// Harness configuration
///
/// Relative paths are resolved against the [work directory][Self::work_directory], which is
/// also the directory the key generation and comparison tools run in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessConfiguration {
    /// Directory where the tools are run
    pub work_directory: PathBuf,

    /// Directory containing the circuit description files
    pub circuits_directory: PathBuf,

    /// Extension of the circuit description files (without the leading dot)
    pub circuit_extension: String,

    /// Prefix of the file name of the generated circuit variants
    pub transformed_prefix: String,

    /// Name of the marker call wrapping constant expressions
    pub constant_marker: String,

    /// Verification key generated from the original circuit
    pub current_vk_path: PathBuf,

    /// Verification key generated from the transformed circuit
    pub transformed_vk_path: PathBuf,

    /// Verification key written by the reference test
    pub reference_vk_path: PathBuf,

    /// Directory where the output of each tool is captured
    pub logs_directory: PathBuf,

    /// Key generation command, the circuit path and options are appended
    pub keygen_command: String,

    /// Circuit scaffold given to the key generator, ignored if empty
    pub circuit_scaffold: Option<String>,

    /// Reference test command, the test name and `--quiet -- --exact` are appended
    pub reference_test_command: String,

    /// Directory where the reference test command is run
    pub reference_work_directory: PathBuf,

    /// Module namespace of the reference tests
    pub reference_test_namespace: String,

    /// Byte comparison command, both verification keys paths are appended
    pub diff_command: String,
}

impl HarnessConfiguration {
    /// Create a sample configuration mainly for tests
    #[doc(hidden)]
    pub fn new_sample(work_directory: &Path) -> Self {
        let defaults = DefaultConfiguration::default();
        Self {
            work_directory: work_directory.to_path_buf(),
            circuits_directory: PathBuf::from(defaults.circuits_directory),
            circuit_extension: defaults.circuit_extension,
            transformed_prefix: defaults.transformed_prefix,
            constant_marker: defaults.constant_marker,
            current_vk_path: PathBuf::from(defaults.current_vk_path),
            transformed_vk_path: PathBuf::from(defaults.transformed_vk_path),
            reference_vk_path: PathBuf::from("reference/vk.bin"),
            logs_directory: PathBuf::from(defaults.logs_directory),
            keygen_command: defaults.keygen_command,
            circuit_scaffold: None,
            reference_test_command: defaults.reference_test_command,
            reference_work_directory: PathBuf::from("reference"),
            reference_test_namespace: defaults.reference_test_namespace,
            diff_command: defaults.diff_command,
        }
    }

    /// Resolve a path against the work directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_directory.join(path)
        }
    }

    pub fn circuits_dir(&self) -> PathBuf {
        self.resolve(&self.circuits_directory)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.resolve(&self.logs_directory)
    }

    pub fn reference_work_dir(&self) -> PathBuf {
        self.resolve(&self.reference_work_directory)
    }

    pub fn circuit_scaffold(&self) -> Option<&str> {
        self.circuit_scaffold
            .as_deref()
            .filter(|scaffold| !scaffold.trim().is_empty())
    }

    pub fn keygen_command(&self) -> Result<CommandTemplate, ConfigurationError> {
        CommandTemplate::parse("keygen_command", &self.keygen_command)
    }

    pub fn reference_test_command(&self) -> Result<CommandTemplate, ConfigurationError> {
        CommandTemplate::parse("reference_test_command", &self.reference_test_command)
    }

    pub fn diff_command(&self) -> Result<CommandTemplate, ConfigurationError> {
        CommandTemplate::parse("diff_command", &self.diff_command)
    }
}

/// A program and its leading arguments, parsed from a whitespace separated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(parameter: &str, command_line: &str) -> Result<Self, ConfigurationError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| ConfigurationError::EmptyCommand(parameter.to_string()))?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Default configuration with all the default values for configurations.
#[derive(Debug, Clone)]
pub struct DefaultConfiguration {
    pub work_directory: String,
    pub circuits_directory: String,
    pub circuit_extension: String,
    pub transformed_prefix: String,
    pub constant_marker: String,
    pub current_vk_path: String,
    pub transformed_vk_path: String,
    pub reference_vk_path: String,
    pub logs_directory: String,
    pub keygen_command: String,
    pub circuit_scaffold: String,
    pub reference_test_command: String,
    pub reference_work_directory: String,
    pub reference_test_namespace: String,
    pub diff_command: String,
}

impl Default for DefaultConfiguration {
    fn default() -> Self {
        Self {
            work_directory: ".".to_string(),
            circuits_directory: "circuits".to_string(),
            circuit_extension: "ts".to_string(),
            transformed_prefix: "constant.".to_string(),
            constant_marker: crate::circuit::DEFAULT_CONSTANT_MARKER.to_string(),
            current_vk_path: "data/vk.bin".to_string(),
            transformed_vk_path: "data/const_vk.bin".to_string(),
            reference_vk_path: "../halo2-wasm/vk.bin".to_string(),
            logs_directory: "data/logs".to_string(),
            keygen_command: "pnpm halo2-wasm keygen".to_string(),
            circuit_scaffold: "./tests/run.ts".to_string(),
            reference_test_command: "cargo test".to_string(),
            reference_work_directory: "../halo2-wasm".to_string(),
            reference_test_namespace: "tests".to_string(),
            diff_command: "diff".to_string(),
        }
    }
}

impl Source for DefaultConfiguration {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let namespace = "default configuration".to_string();
        let myself = self.clone();
        let entries = [
            ("work_directory", myself.work_directory),
            ("circuits_directory", myself.circuits_directory),
            ("circuit_extension", myself.circuit_extension),
            ("transformed_prefix", myself.transformed_prefix),
            ("constant_marker", myself.constant_marker),
            ("current_vk_path", myself.current_vk_path),
            ("transformed_vk_path", myself.transformed_vk_path),
            ("reference_vk_path", myself.reference_vk_path),
            ("logs_directory", myself.logs_directory),
            ("keygen_command", myself.keygen_command),
            ("circuit_scaffold", myself.circuit_scaffold),
            ("reference_test_command", myself.reference_test_command),
            ("reference_work_directory", myself.reference_work_directory),
            ("reference_test_namespace", myself.reference_test_namespace),
            ("diff_command", myself.diff_command),
        ];

        Ok(entries
            .into_iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    Value::new(Some(&namespace), ValueKind::from(value)),
                )
            })
            .collect())
    }
}
