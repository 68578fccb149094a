use anyhow::Context;
use clap::Parser;
use config::{Map, Source, Value, ValueKind};
use slog::{Drain, Level, Logger};
use slog_scope::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use halo2_vk_harness::{
    DefaultConfiguration, HarnessBuilder, HarnessConfiguration, ProtocolKind, StdResult,
};

/// Check that circuit transformations keep the verification key unchanged
#[derive(Parser, Debug, Clone)]
#[clap(name = "halo2-vk-harness")]
#[command(version)]
pub struct Args {
    /// Name of a single circuit to test (ie: `SimpleAdd` for `circuits/SimpleAdd.ts`).
    ///
    /// If not set every circuit of the circuits directory is tested and the program exits with
    /// an error code if any of them failed.
    circuit: Option<String>,

    /// Equivalence protocol to run
    #[clap(long, value_enum, default_value_t = ProtocolKind::Constant)]
    protocol: ProtocolKind,

    /// Run Mode, selects the `<config_directory>/<run_mode>.json` configuration file
    #[clap(long, env = "RUN_MODE", default_value = "dev")]
    run_mode: String,

    /// Directory where configuration file is located.
    #[clap(long, default_value = "./config")]
    config_directory: PathBuf,

    /// Override configuration work directory, where the tools are run.
    #[clap(long)]
    work_directory: Option<PathBuf>,

    /// Override configuration circuits directory.
    #[clap(long)]
    circuits_directory: Option<PathBuf>,

    /// Delete the transformed circuits once tested
    #[clap(long)]
    remove_transformed: bool,

    /// Number of lines of each tool log to print after a failed test
    #[clap(long, default_value_t = 0)]
    tail_logs: u64,

    /// Enable JSON output for logs
    #[clap(long)]
    log_format_json: bool,

    /// Verbosity level
    #[clap(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Verbosity level, add more v to increase"
    )]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::Error,
            1 => Level::Warning,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }

    fn build_logger(&self) -> Logger {
        let drain = if self.log_format_json {
            let drain = slog_bunyan::with_name("halo2-vk-harness", std::io::stderr())
                .set_pretty(false)
                .build()
                .fuse();
            let drain = slog::LevelFilter::new(drain, self.log_level()).fuse();

            slog_async::Async::new(drain).build().fuse()
        } else {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            let drain = slog::LevelFilter::new(drain, self.log_level()).fuse();

            slog_async::Async::new(drain).build().fuse()
        };

        Logger::root(Arc::new(drain), slog::o!())
    }

    fn load_configuration(&self) -> StdResult<HarnessConfiguration> {
        let filename = format!("{}/{}.json", self.config_directory.display(), self.run_mode);
        debug!("Reading configuration file '{filename}'.");
        let mut configuration: HarnessConfiguration = config::Config::builder()
            .add_source(DefaultConfiguration::default())
            .add_source(config::File::with_name(&filename).required(false))
            .add_source(config::Environment::default())
            .add_source(self.clone())
            .build()
            .with_context(|| "configuration build error")?
            .try_deserialize()
            .with_context(|| "configuration deserialize error")?;

        configuration.work_directory = configuration
            .work_directory
            .canonicalize()
            .with_context(|| {
                format!(
                    "work directory `{}` does not exist",
                    configuration.work_directory.display()
                )
            })?;
        debug!("Configuration loaded"; "run_mode" => &self.run_mode, "configuration" => ?&configuration);

        Ok(configuration)
    }
}

impl Source for Args {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut map = Map::new();
        let namespace = "clap arguments".to_string();

        if let Some(work_directory) = &self.work_directory {
            map.insert(
                "work_directory".to_string(),
                Value::new(
                    Some(&namespace),
                    ValueKind::from(work_directory.display().to_string()),
                ),
            );
        }
        if let Some(circuits_directory) = &self.circuits_directory {
            map.insert(
                "circuits_directory".to_string(),
                Value::new(
                    Some(&namespace),
                    ValueKind::from(circuits_directory.display().to_string()),
                ),
            );
        }

        Ok(map)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> StdResult<ExitCode> {
    let args = Args::parse();
    let _guard = slog_scope::set_global_logger(args.build_logger());
    debug!("halo2-vk-harness version: {}", env!("CARGO_PKG_VERSION"); "protocol" => ?args.protocol);

    let configuration = args.load_configuration()?;
    let runner = HarnessBuilder::new(configuration, args.protocol)
        .remove_transformed(args.remove_transformed)
        .failure_logs_lines(args.tail_logs)
        .build()?;

    match &args.circuit {
        Some(circuit_name) => {
            runner.run_single(circuit_name).await?;

            Ok(ExitCode::SUCCESS)
        }
        None => {
            let report = runner.run_all().await?;
            print!("{report}");

            Ok(ExitCode::from(report.exit_code()))
        }
    }
}
