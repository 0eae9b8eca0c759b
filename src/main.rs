mod report;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use canvas::config::{ConfigError, EditorConfig};
use canvas::doc::Document;
use canvas::export::ExportError;
use canvas::persist::{self, PersistError};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Config { path: PathBuf, source: serde_json::Error },
    #[error("unusable config {path}: {source}")]
    InvalidConfig { path: PathBuf, source: ConfigError },
    #[error("project snapshot: {0}")]
    Persist(#[from] PersistError),
    #[error("export: {0}")]
    Export(#[from] ExportError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Inspect and repair saved floor plan projects")]
struct Cli {
    /// Tracing filter, e.g. `warn` or `canvas=debug`.
    #[arg(long, env = "FLOORPLAN_LOG", default_value = "warn")]
    log_level: String,

    /// Editor config JSON. Missing fields take their defaults.
    #[arg(long, env = "FLOORPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project name, orientation and element counts.
    Info { file: PathBuf },
    /// Content bounds and A4 export layout.
    Bounds { file: PathBuf },
    /// Equipment legend in first-use order.
    Legend { file: PathBuf },
    /// Drop doors and windows with no host wall and clamp positions.
    Repair {
        file: PathBuf,
        /// Write the repaired snapshot here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective editor config.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "floorplan failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Info { file } => print_json(&report::info(&load_document(&file)?)),
        Command::Bounds { file } => print_json(&report::bounds(&load_document(&file)?)?),
        Command::Legend { file } => print_json(&report::legend(&load_document(&file)?)),
        Command::Repair { file, output } => run_repair(&file, output.as_deref()),
        Command::Config => print_json(&load_config(cli.config.as_deref())?),
    }
}

fn run_repair(file: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let outcome = report::repair(&read(file)?)?;
    match output {
        Some(path) => {
            fs::write(path, &outcome.json).map_err(|source| CliError::Write { path: path.to_path_buf(), source })?;
            print_json(&outcome)
        }
        None => {
            println!("{}", outcome.json);
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

/// Strict load: a malformed snapshot is an error here, not an empty plan.
fn load_document(path: &Path) -> Result<Document, CliError> {
    let doc = persist::parse_document(&read(path)?)?;
    tracing::debug!(path = %path.display(), elements = doc.len(), "loaded project");
    Ok(doc)
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, CliError> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let config: EditorConfig =
        serde_json::from_str(&read(path)?).map_err(|source| CliError::Config { path: path.to_path_buf(), source })?;
    config.validate().map_err(|source| CliError::InvalidConfig { path: path.to_path_buf(), source })?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
