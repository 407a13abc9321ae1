//! Phenomind CLI - Command-line interface for Phenomind Analytics
//!
//! Commands:
//! - analyze: Compute trends, drivers and recommendations for one patient
//! - population: Aggregate risk statistics for a cohort
//! - thresholds: Print the effective configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use phenomind_analytics::encoder::to_json;
use phenomind_analytics::types::{AnalyticsRequest, PopulationMember};
use phenomind_analytics::{AnalyticsError, AnalyticsProcessor, PHENOMIND_VERSION};

/// Phenomind - Biomarker analytics and clinical recommendations
#[derive(Parser)]
#[command(name = "phenomind")]
#[command(version = PHENOMIND_VERSION)]
#[command(about = "Analyze patient biomarker series and cohort risk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute analytics for one patient request
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Configuration file overriding default thresholds
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (pretty by default on a terminal)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Wrap the report with producer and computation time
        #[arg(long)]
        envelope: bool,
    },

    /// Aggregate risk statistics for a JSON array of patients
    Population {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Configuration file overriding default risk bands
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format (pretty by default on a terminal)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Print the effective threshold configuration as JSON
    Thresholds {
        /// Configuration file to merge over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = CliError::from(e);
            eprintln!(
                "{}",
                serde_json::to_string(&report).unwrap_or_else(|_| report.message.clone())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            config,
            format,
            envelope,
        } => cmd_analyze(&input, &output, config.as_deref(), format, envelope),
        Commands::Population {
            input,
            output,
            config,
            format,
        } => cmd_population(&input, &output, config.as_deref(), format),
        Commands::Thresholds { config } => cmd_thresholds(config.as_deref()),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    format: Option<OutputFormat>,
    envelope: bool,
) -> Result<(), CliFailure> {
    let processor = load_processor(config)?;
    let request: AnalyticsRequest = serde_json::from_str(&read_input(input)?)?;

    if request.series.is_empty() {
        tracing::warn!("request has an empty series; report will carry no averages");
    }

    let analytics = processor.analyze_request(&request)?;
    let pretty = is_pretty(format, output);
    let encoder = processor.encoder();

    let data = if envelope {
        to_json(&encoder.encode_with_provenance(&analytics), pretty)?
    } else if pretty {
        encoder.encode_to_json_pretty(&analytics)?
    } else {
        encoder.encode_to_json(&analytics)?
    };

    write_output(output, &data)
}

fn cmd_population(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<(), CliFailure> {
    let processor = load_processor(config)?;
    let members: Vec<PopulationMember> = serde_json::from_str(&read_input(input)?)?;

    let report = processor.population_request(&members)?;
    let data = processor
        .encoder()
        .encode_population(&report, is_pretty(format, output))?;

    write_output(output, &data)
}

fn cmd_thresholds(config: Option<&Path>) -> Result<(), CliFailure> {
    let processor = load_processor(config)?;
    println!("{}", processor.config().to_json()?);
    Ok(())
}

fn load_processor(config: Option<&Path>) -> Result<AnalyticsProcessor, CliFailure> {
    match config {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(AnalyticsProcessor::from_config_json(&json)?)
        }
        None => Ok(AnalyticsProcessor::new()),
    }
}

fn read_input(input: &Path) -> Result<String, CliFailure> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), CliFailure> {
    if output.to_string_lossy() == "-" {
        println!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

/// Explicit format wins; otherwise pretty only when writing to a terminal
fn is_pretty(format: Option<OutputFormat>, output: &Path) -> bool {
    match format {
        Some(OutputFormat::JsonPretty) => true,
        Some(OutputFormat::Json) => false,
        None => output.to_string_lossy() == "-" && atty::is(atty::Stream::Stdout),
    }
}

// Error types

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Json(serde_json::Error),
    Analytics(AnalyticsError),
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(e: serde_json::Error) -> Self {
        CliFailure::Json(e)
    }
}

impl From<AnalyticsError> for CliFailure {
    fn from(e: AnalyticsError) -> Self {
        CliFailure::Analytics(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliFailure::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax and field names (camelCase)".to_string()),
            },
            CliFailure::Analytics(AnalyticsError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'phenomind thresholds' to see the accepted fields".to_string()),
            },
            CliFailure::Analytics(AnalyticsError::InvalidInput(msg)) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: msg,
                hint: Some("Risk scores must be within 0-100".to_string()),
            },
            CliFailure::Analytics(e) => CliError {
                code: "ANALYTICS_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
        }
    }
}
