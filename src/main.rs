// Folder Mirror
// Keeps a replica directory identical to a source directory, re-checking on an interval

// IMPORTS ------------------>>

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use folder_mirror::utilities::logging;
use folder_mirror::{ActionLog, AppConfig, CycleDriver, MirrorConfig, MirrorSettings};

//--------------------------------------------------------<<

/// Mirror a source folder into a replica folder on a fixed interval
#[derive(Debug, Parser)]
#[command(name = "folder-mirror", version, about)]
struct Cli {
    /// Path to the source folder
    source: Option<PathBuf>,

    /// Path to the replica folder
    replica: Option<PathBuf>,

    /// Synchronization interval in seconds
    interval: Option<u64>,

    /// Path to the log file
    log_file: Option<PathBuf>,

    /// YAML file providing any of the settings above
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bytes read per chunk when fingerprinting
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Record per-path failures and keep going instead of stopping
    #[arg(long)]
    continue_on_error: bool,

    /// Do not echo log lines to stdout
    #[arg(long)]
    quiet: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    /// Settings given on the command line, as overrides for the config file
    fn overrides(&self) -> MirrorConfig {
        MirrorConfig {
            source: self.source.clone(),
            replica: self.replica.clone(),
            interval_secs: self.interval,
            log_file: self.log_file.clone(),
            chunk_size: self.chunk_size,
            continue_on_error: self.continue_on_error.then_some(true),
            mirror_stdout: self.quiet.then_some(false),
            log_filter: None,
        }
    }
}

// ┌──────────────────────────────────────────────────────────────────────────────┐
// │                                MAIN ENTRY POINT                              │
// └──────────────────────────────────────────────────────────────────────────────┘

fn main() -> ExitCode {
    let cli = Cli::parse();
    let defaults = AppConfig::default();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("folder-mirror: {err:#}");
            return ExitCode::from(2);
        }
    };

    let settings = match MirrorSettings::resolve(config, &defaults) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("folder-mirror: {err}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = logging::init(&settings.log_filter) {
        eprintln!("folder-mirror: failed to initialise diagnostics: {err}");
    }

    match run(&settings, cli.once) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Merge the optional config file with command-line overrides
fn load_config(cli: &Cli) -> Result<MirrorConfig> {
    let base = match &cli.config {
        Some(path) => MirrorConfig::load(path)?,
        None => MirrorConfig::default(),
    };
    Ok(base.merged_with(cli.overrides()))
}

// ┌──────────────────────────────────────────────────────────────────────────────┐
// │                                   MAIN LOOP                                  │
// └──────────────────────────────────────────────────────────────────────────────┘

fn run(settings: &MirrorSettings, once: bool) -> Result<()> {
    let mut log = ActionLog::open(&settings.log_file, settings.mirror_stdout)
        .context("Failed to open action log")?;
    let driver = CycleDriver::from_settings(settings);

    if once {
        driver.run_cycle(&mut log).context("Synchronization cycle failed")?;
        return Ok(());
    }

    match driver.run(&mut log) {
        Ok(never) => match never {},
        Err(err) => Err(anyhow::Error::new(err).context("Synchronization stopped")),
    }
}
