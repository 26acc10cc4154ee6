use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use normalizer::{
    HitNormalizer, NoopUserAgentParser, UapUserAgentParser, UserAgentError, UserAgentParser,
};

mod config;
mod logging;
mod metrics_defs;
mod runner;

use config::Config;

#[derive(Parser)]
#[command(name = "hitflow", about = "Normalizes Measurement Protocol hits")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Normalize newline-delimited JSON hits
    Normalize {
        /// Read from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Decode raw URL-encoded hit payloads into JSON hits
    Decode {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load and validate the configuration
    CheckConfig,
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn build_normalizer(config: &Config) -> Result<HitNormalizer, UserAgentError> {
    let user_agents: Arc<dyn UserAgentParser> = match &config.user_agent {
        Some(user_agent) => Arc::new(UapUserAgentParser::from_file(&user_agent.regexes_path)?),
        None => {
            tracing::warn!("No user agent regexes configured, browser and OS fields will be null");
            Arc::new(NoopUserAgentParser)
        }
    };

    Ok(HitNormalizer::new(user_agents, (&config.normalizer).into()))
}

fn run(cli: Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        CliCommand::Normalize { input, output } => {
            let normalizer = build_normalizer(&config)?;
            let stats = runner::normalize_lines(
                &normalizer,
                open_input(input.as_deref())?,
                open_output(output.as_deref())?,
            )?;
            tracing::info!(
                processed = stats.processed,
                normalized = stats.normalized,
                failed = stats.failed,
                malformed = stats.malformed,
                "Normalization finished"
            );
        }
        CliCommand::Decode { input, output } => {
            let stats = runner::decode_lines(
                open_input(input.as_deref())?,
                open_output(output.as_deref())?,
            )?;
            tracing::info!(decoded = stats.processed, "Decoding finished");
        }
        CliCommand::CheckConfig => {
            build_normalizer(&config)?;
            tracing::info!("Configuration is valid");
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(Config::from_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry = logging::init_logging(&config.logging);

    if let Some(metrics) = &config.metrics
        && let Err(e) = logging::init_metrics(metrics)
    {
        tracing::error!(error = %e, "Failed to initialize metrics");
        return ExitCode::FAILURE;
    }

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hitflow failed");
            ExitCode::FAILURE
        }
    }
}
