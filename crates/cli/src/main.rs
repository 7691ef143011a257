// tracksla - shipment tracking reconciliation and SLA reports

mod exit_codes;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracksla_recon::TrackConfig;

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS};

/// Config file picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "tracksla.toml";

#[derive(Parser)]
#[command(name = "tracksla")]
#[command(about = "Reconcile shipment tracking reports and classify delivery SLAs")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
With no options, reads data/skynet_report.zip, extracts it to data/unzipped
and writes reports under output/.

Exit codes:
  0  success
  1  run failed after processing started
  2  configuration error (bad config, missing or unreadable archive)")]
struct Cli {
    /// TOML config file (default: ./tracksla.toml when present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Report bundle to extract
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Directory the bundle is extracted into and scanned for reports
    #[arg(long)]
    extract_to: Option<PathBuf>,

    /// Output root for dated report folders and run logs
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log filter when RUST_LOG is unset (e.g. "info", "debug", "tracksla_recon=debug")
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  tracksla-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = load_config(&cli).and_then(|config| {
        let summary = run::run(&config)?;
        if cli.json {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| CliError::io(format!("Failed to encode run summary: {}", e)))?;
            println!("{}", json);
        } else {
            println!(
                "Processing complete. Reports saved to '{}'.",
                summary.output_root.display()
            );
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Diagnostics go to stderr so stdout stays clean for `--json`.
/// `log` records from the library crates are forwarded as well.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read the config file (explicit, or the default one if present), then
/// apply command-line overrides and validate the result.
fn load_config(cli: &Cli) -> Result<TrackConfig, CliError> {
    let path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(p) => read_config(&p)?,
        None => TrackConfig::default(),
    };

    if let Some(archive) = &cli.archive {
        config.paths.archive = archive.clone();
    }
    if let Some(dir) = &cli.extract_to {
        config.paths.extract_to = dir.clone();
    }
    if let Some(dir) = &cli.output {
        config.paths.output_root = dir.clone();
    }

    config
        .validate()
        .map_err(|e| CliError::config(e.to_string()))?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<TrackConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::config(format!("Failed to read config '{}': {}", path.display(), e))
    })?;
    log::debug!("using config {}", path.display());
    TrackConfig::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
