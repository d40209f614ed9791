mod callgraph;
mod classfile;
mod collect;
mod entrypoint;
mod enumerate;
mod error;
mod facade;
mod filter;
mod hierarchy;
mod ir;
mod loader;
mod opcodes;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::callgraph::Algorithm as CallGraphAlgorithm;
use crate::error::AnalysisError;
use crate::facade::AnalysisConfig;
use crate::output::OutputFormat;

/// CLI arguments for `cgraph` (spec.md §6).
#[derive(Parser, Debug)]
#[command(
    name = "cgraph",
    about = "Deterministic CHA/RTA call-graph analysis of JVM class and JAR files.",
    version
)]
struct Cli {
    /// Class file, JAR file, or directory to analyze. Repeatable.
    #[arg(long = "input", value_name = "PATH", required = true)]
    inputs: Vec<PathBuf>,

    /// Call-graph construction algorithm.
    #[arg(long, value_enum, default_value_t = Algorithm::Cha)]
    algorithm: Algorithm,

    /// Explicit entry-point spec (`methodName`, `SimpleName.methodName`,
    /// or `fully.qualified.Name.methodName`). Repeatable and
    /// comma-separable; when omitted, every
    /// `public static void main(String[])` is used.
    #[arg(long = "entry-point", value_name = "SPEC", value_delimiter = ',')]
    entry_points: Vec<String>,

    /// Restrict admitted types to this prefix (dotted or slash form).
    /// Repeatable and comma-separable.
    #[arg(long = "include", value_name = "PREFIX", value_delimiter = ',')]
    include: Vec<String>,

    /// Reject admitted types under this prefix (dotted or slash form).
    /// Takes precedence over `--include`. Repeatable and comma-separable.
    #[arg(long = "exclude", value_name = "PREFIX", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Reject types under the built-in JDK/platform prefixes.
    #[arg(long)]
    exclude_jdk: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output destination; `-` or omitted writes to stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Enable debug-level tracing to stderr.
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Cha,
    Rta,
}

impl From<Algorithm> for CallGraphAlgorithm {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Cha => CallGraphAlgorithm::Cha,
            Algorithm::Rta => CallGraphAlgorithm::Rta,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Csv,
    Json,
    Dot,
}

impl From<Format> for OutputFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Text => OutputFormat::Text,
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
            Format::Dot => OutputFormat::Dot,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = AnalysisConfig {
        inputs: cli.inputs,
        algorithm: cli.algorithm.into(),
        entry_point_specs: cli.entry_points,
        include_prefixes: cli.include,
        exclude_prefixes: cli.exclude,
        exclude_jdk: cli.exclude_jdk,
    };

    let result = facade::analyze(config).map_err(describe_analysis_error)?;

    let mut writer = output::stdout_or_file(cli.output.as_deref())?;
    output::write_result(&mut writer, &result, cli.format.into(), cli.verbose)
}

fn describe_analysis_error(err: AnalysisError) -> anyhow::Error {
    anyhow::anyhow!(err)
}
