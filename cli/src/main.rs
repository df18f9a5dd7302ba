use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use sigplot_core::{AnalysisReport, ParameterSchema, RecordGraph, validate_schema};
use sigplot_invoke::{EmissionPolicy, PlotRun, ProcessRunner, Synthesizer, ToolConfig};
use sigplot_report::output::{OutputFormat, format_report};
use sigplot_report::{ReportError, decode_file};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Serialization formats for machine-readable output.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DataFormat {
    Json,
    Yaml,
}

/// CLI spelling of the synthesizer's emission policy.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliEmissionPolicy {
    /// Drop zero and empty values.
    OmitFalsy,
    /// Drop only unset values.
    OmitUnset,
}

impl From<CliEmissionPolicy> for EmissionPolicy {
    fn from(policy: CliEmissionPolicy) -> Self {
        match policy {
            CliEmissionPolicy::OmitFalsy => Self::OmitFalsy,
            CliEmissionPolicy::OmitUnset => Self::OmitUnset,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sigplot")]
#[command(about = "Drive signalserver plots and decode its point-to-point reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the built-in signalserver parameter schema.
    Schema(SchemaArgs),
    /// Print the argument vectors synthesized for a plot.
    Args(ArgsArgs),
    /// Decode one or more point-to-point report files.
    Decode(DecodeArgs),
    /// Run the area pass and, when requested, the point-to-point pass.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: DataFormat,
}

#[derive(Debug, Args)]
struct PlotInput {
    /// YAML file with the plot and its antenna and stations.
    #[arg(long)]
    plot: PathBuf,
    /// Tool configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Which non-boolean values reach the command line.
    #[arg(long, value_enum, default_value_t = CliEmissionPolicy::OmitFalsy)]
    policy: CliEmissionPolicy,
}

#[derive(Debug, Args)]
struct ArgsArgs {
    #[command(flatten)]
    input: PlotInput,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Report text files written by the point-to-point pass.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Write `<report>.json` beside each input instead of printing.
    #[arg(long)]
    write_json: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    input: PlotInput,
    /// Override the configured output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Schema(args) => run_schema(args),
        Command::Args(args) => run_args(args),
        Command::Decode(args) => run_decode(args),
        Command::Run(args) => run_plot(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_schema(args: SchemaArgs) -> Result<(), String> {
    let schema = ParameterSchema::signalserver();
    let errors = validate_schema(&schema);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(format!("built-in schema is invalid: {}", messages.join("; ")));
    }
    let rendered = match args.format {
        DataFormat::Json => serde_json::to_string_pretty(&schema)
            .map_err(|err| format!("JSON serialization failed: {err}"))?,
        DataFormat::Yaml => serde_yaml::to_string(&schema)
            .map_err(|err| format!("YAML serialization failed: {err}"))?,
    };
    println!("{rendered}");
    Ok(())
}

fn run_args(args: ArgsArgs) -> Result<(), String> {
    let (graph, config) = load_inputs(&args.input)?;
    let schema = ParameterSchema::signalserver();
    let vectors = Synthesizer::new(&schema, &config)
        .with_policy(args.input.policy.into())
        .synthesize(&graph)
        .map_err(|err| format!("Failed to synthesize arguments: {err}"))?;
    let json = serde_json::to_string_pretty(&vectors)
        .map_err(|err| format!("JSON serialization failed: {err}"))?;
    println!("{json}");
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<(), String> {
    let decoded: Vec<(&PathBuf, Result<AnalysisReport, ReportError>)> = args
        .inputs
        .par_iter()
        .map(|path| (path, decode_file(path)))
        .collect();

    let mut failures = 0usize;
    for (path, result) in decoded {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                eprintln!("error: {}: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        if args.write_json {
            let target = path.with_extension("json");
            write_report_json(&report, &target)?;
            info!(report = %path.display(), output = %target.display(), "Wrote report JSON");
        } else {
            if args.inputs.len() > 1 {
                println!("==> {} <==", path.display());
            }
            println!("{}", format_report(&report, args.format)?);
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} report(s) failed to decode",
            args.inputs.len()
        ));
    }
    Ok(())
}

fn run_plot(args: RunArgs) -> Result<(), String> {
    let (graph, mut config) = load_inputs(&args.input)?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    debug!(output_dir = %config.output_dir.display(), "Resolved output directory");

    let schema = ParameterSchema::signalserver();
    let runner = ProcessRunner::new(config.timeout());
    let name = &graph.plot.name;
    let mut run =
        PlotRun::with_policy(&schema, &config, &graph, runner, args.input.policy.into())
            .map_err(|err| format!("Plot '{name}' failed: {err}"))?;
    let outcome = match run.execute() {
        Ok(outcome) => outcome,
        Err(err) => {
            let Some(bbox) = run.state().bbox() else {
                return Err(format!("Plot '{name}' failed: {err}"));
            };
            warn!(plot = %name, bbox = ?bbox, "Keeping the finished area pass");
            return Err(format!(
                "Plot '{name}' failed: {err} (area plot {} kept, extent N {} E {} S {} W {})",
                run.output_base().display(),
                bbox.north,
                bbox.east,
                bbox.south,
                bbox.west
            ));
        }
    };

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|err| format!("JSON serialization failed: {err}"))?;
    println!("{json}");
    Ok(())
}

fn load_inputs(input: &PlotInput) -> Result<(RecordGraph, ToolConfig), String> {
    let text = fs::read_to_string(&input.plot)
        .map_err(|err| format!("Failed to read '{}': {err}", input.plot.display()))?;
    let graph: RecordGraph = serde_yaml::from_str(&text)
        .map_err(|err| format!("Failed to parse plot '{}': {err}", input.plot.display()))?;
    let config = ToolConfig::load(&input.config)
        .map_err(|err| format!("Failed to load config '{}': {err}", input.config.display()))?;
    Ok((graph, config))
}

fn write_report_json(report: &AnalysisReport, target: &Path) -> Result<(), String> {
    let json = format_report(report, OutputFormat::Json)?;
    fs::write(target, json).map_err(|err| format!("Failed to write '{}': {err}", target.display()))
}
