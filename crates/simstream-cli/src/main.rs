// crates/simstream-cli/src/main.rs
// ============================================================================
// Binary: simstream
// Description: The `run` / `validate` / `info` command surface (`spec.md`
//              §6) over `simstream-config` and `simstream-core`.
// Purpose: Turn a configuration file on disk into a running simulation, or
//          report on it without running anything.
// Dependencies: simstream-core, simstream-config, simstream-providers,
//               simstream-sinks, clap, thiserror, time, tracing,
//               tracing-subscriber
// ============================================================================

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use simstream_config::OutputConfig;
use simstream_config::OutputFormatConfig;
use simstream_config::OutputKind;
use simstream_core::core::errors::CoreError;
use simstream_core::core::identifiers::SchemaName;
use simstream_core::core::schema::Schema;
use simstream_core::interfaces::Sink;
use simstream_core::runtime::orchestrator::Orchestrator;
use simstream_core::runtime::orchestrator::RunConfig;
use simstream_core::runtime::orchestrator::TerminationConfig;
use simstream_core::runtime::registry::SchemaRegistry;
use simstream_core::runtime::rng::SimRng;
use simstream_core::runtime::scheduler::Scheduler;
use simstream_core::runtime::scheduler::SchedulerConfig;
use simstream_providers::registry::ProviderRegistry;
use simstream_sinks::FileSink;
use simstream_sinks::OutputFormat;
use simstream_sinks::StdoutSink;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Parser, Debug)]
#[command(name = "simstream", version, about = "Configuration-driven event-stream simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulation to completion.
    Run(RunArgs),
    /// Parse and validate a configuration file without running it.
    Validate(ConfigArgs),
    /// Print a summary of a configuration file.
    Info(ConfigArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the simulation configuration file.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: PathBuf,
    /// Enable debug-level logging.
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to the simulation configuration file.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: PathBuf,
}

/// Top-level CLI error, covering every failure mode between argument parsing
/// and a completed run.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] simstream_config::ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("{0}")]
    Io(std::io::Error),
    #[error("invalid time_progression.start_time '{value}': {reason}")]
    InvalidStartTime { value: String, reason: String },
    #[error("{0}")]
    Sink(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = matches!(&cli.command, Command::Run(args) if args.verbose);
    init_tracing(verbose);

    let result = match &cli.command {
        Command::Run(args) => command_run(args),
        Command::Validate(args) => command_validate(args),
        Command::Info(args) => command_info(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}

fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {err}"));
    ExitCode::FAILURE
}

fn write_stdout_line(line: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")
}

fn write_stderr_line(line: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{line}")
}

// ============================================================================
// SECTION: validate / info
// ============================================================================

fn command_validate(args: &ConfigArgs) -> CliResult<()> {
    let config = simstream_config::load_config(&args.config)?;
    simstream_config::validate(&config)?;
    write_stdout_line(&format!("{}: configuration is valid", args.config.display()))?;
    Ok(())
}

fn command_info(args: &ConfigArgs) -> CliResult<()> {
    let config = simstream_config::load_config(&args.config)?;
    simstream_config::validate(&config)?;

    let duration = config.simulation_settings.duration.as_deref().unwrap_or("unbounded");
    let total_events = config
        .simulation_settings
        .total_events
        .map_or_else(|| "unbounded".to_string(), |n| n.to_string());

    write_stdout_line(&format!("version: {}", config.version))?;
    write_stdout_line(&format!("duration: {duration}"))?;
    write_stdout_line(&format!("total_events: {total_events}"))?;
    write_stdout_line(&format!("schemas: {}", config.schemas.len()))?;
    write_stdout_line(&format!("entities: {}", config.entities.len()))?;
    write_stdout_line(&format!("event_types: {}", config.event_types.len()))?;
    write_stdout_line(&format!("scenarios: {}", config.scenarios.len()))?;
    write_stdout_line(&format!("outputs: {}", config.outputs.iter().filter(|o| o.enabled).count()))?;
    Ok(())
}

// ============================================================================
// SECTION: run
// ============================================================================

fn command_run(args: &RunArgs) -> CliResult<()> {
    let config = simstream_config::load_config(&args.config)?;
    simstream_config::validate(&config)?;

    let anchor = resolve_anchor(&config.simulation_settings.time_progression.start_time)?;
    let termination = TerminationConfig {
        duration_seconds: config
            .simulation_settings
            .duration
            .as_deref()
            .map(simstream_config::duration::parse_duration_seconds)
            .transpose()?,
        total_events: config.simulation_settings.total_events,
    };
    let run_config = RunConfig {
        initial_entity_counts: config.simulation_settings.initial_entity_counts.clone(),
        termination,
        anchor,
    };

    let registry = SchemaRegistry::from_map(config.schemas.into_iter().collect::<HashMap<SchemaName, Schema>>());
    let rng = match config.simulation_settings.random_seed {
        Some(seed) => SimRng::from_seed(seed),
        None => SimRng::from_entropy(),
    };
    let scheduler = Scheduler::new(SchedulerConfig::default());
    let providers = ProviderRegistry::with_builtin_functions();
    let sinks = build_sinks(&config.outputs)?;

    let mut orchestrator = Orchestrator::new(
        registry,
        config.entities,
        config.event_types,
        config.scenarios,
        scheduler,
        rng,
        &providers,
        sinks,
        run_config,
    );

    orchestrator.initialize()?;
    orchestrator.run()?;

    tracing::info!(emitted = orchestrator.emitted_count(), "run complete");
    Ok(())
}

/// Resolves `start_time` into the run's wall-clock anchor. `"now"` reads the
/// live clock; this is the only place in the whole binary permitted to do so
/// (`simstream-core` never reads it internally).
fn resolve_anchor(start_time: &str) -> CliResult<OffsetDateTime> {
    if start_time.eq_ignore_ascii_case("now") {
        return Ok(OffsetDateTime::now_utc());
    }
    OffsetDateTime::parse(start_time, &Rfc3339).map_err(|err| CliError::InvalidStartTime {
        value: start_time.to_string(),
        reason: err.to_string(),
    })
}

fn build_sinks(outputs: &[OutputConfig]) -> CliResult<Vec<Box<dyn Sink>>> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    for output in outputs {
        if !output.enabled {
            continue;
        }
        let format = match output.format {
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::JsonPretty => OutputFormat::JsonPretty,
        };
        let sink: Box<dyn Sink> = match output.kind {
            OutputKind::Stdout => Box::new(StdoutSink::new(format)),
            OutputKind::File => {
                let path = output.path.as_deref().ok_or_else(|| CliError::Sink("file output requires path".to_string()))?;
                Box::new(FileSink::create(path, format)?)
            }
            OutputKind::Kafka => build_kafka_sink(output, format)?,
        };
        sinks.push(sink);
    }
    Ok(sinks)
}

#[cfg(feature = "kafka")]
fn build_kafka_sink(output: &OutputConfig, format: OutputFormat) -> CliResult<Box<dyn Sink>> {
    let bootstrap_servers = output
        .bootstrap_servers
        .as_deref()
        .ok_or_else(|| CliError::Sink("kafka output requires bootstrap_servers".to_string()))?;
    let topic_mapping = output.topic_mapping.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let sink = simstream_sinks::KafkaSink::connect(bootstrap_servers, topic_mapping, format).map_err(|err| CliError::Sink(err.to_string()))?;
    Ok(Box::new(sink))
}

#[cfg(not(feature = "kafka"))]
fn build_kafka_sink(_output: &OutputConfig, _format: OutputFormat) -> CliResult<Box<dyn Sink>> {
    Err(CliError::Sink(
        "kafka sink support is not compiled into this binary (rebuild with --features kafka)".to_string(),
    ))
}
