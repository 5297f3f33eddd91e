//! Command runner for the commercial formatter CLI
//!
//! This module resolves configuration, station and output file, sets up
//! logging, runs the pipeline and reports the outcome.

use crate::app::services::choice_store::ChoiceStore;
use crate::app::services::pipeline::{Checkpoint, Pipeline, RunOptions};
use crate::app::services::spreadsheet::{CommandConverter, SpreadsheetConverter};
use crate::app::services::station_registry::StationRegistry;
use crate::cli::args::Args;
use crate::cli::input::{self, ConsolePrompter};
use crate::cli::output;
use crate::config::Settings;
use crate::{Error, Result};
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Run the formatter for the station named on the command line
pub fn run(args: Args) -> Result<()> {
    args.validate()?;

    let config_dir = Settings::resolve_config_dir(args.config_dir.as_deref())?;
    let (settings, registry) = with_startup_logging(|| {
        let settings = Settings::load(&config_dir)?;
        let registry = StationRegistry::load(&config_dir)?;
        Ok((settings, registry))
    })?;

    if args.list_stations {
        print!("{}", output::format_station_list(&registry));
        return Ok(());
    }

    let name = args
        .station
        .as_deref()
        .ok_or_else(|| Error::configuration("No station given".to_string()))?;
    let station = registry
        .get(name)
        .ok_or_else(|| Error::station_not_found(name))?;

    let output_file = match &args.output {
        Some(path) => path.clone(),
        None => input::prompt_output_file()?,
    };

    let log_file = setup_logging(&args, &settings, output_dir(&output_file), &station.name)?;
    info!(
        station = %station.name,
        config_dir = %config_dir.display(),
        "Processing session started"
    );
    if let Some(path) = &log_file {
        debug!("Logging to {}", path.display());
    }

    let mut store = ChoiceStore::open(
        settings.choices_path(&config_dir),
        settings.choices.remember_fixes,
    );
    if args.forget_choices {
        match store.clear_all() {
            Ok(()) => info!("Cleared remembered choices"),
            Err(e) => warn!("Could not clear remembered choices: {}", e),
        }
    }

    let prompter = if args.accept_defaults {
        ConsolePrompter::accepting_defaults()
    } else {
        ConsolePrompter::new()
    };
    let converter = CommandConverter::from_settings(&settings.convert);

    let mut pipeline = Pipeline::new(
        station,
        &settings,
        &mut store,
        prompter,
        run_options(&args, output_file.clone()),
    );
    if let Some(converter) = &converter {
        pipeline = pipeline.with_converter(converter as &dyn SpreadsheetConverter);
    }
    if args.show_progress() {
        pipeline = pipeline.with_progress(create_progress_bar("Writing output"));
    }

    let result = pipeline.run();
    output::print_summary(pipeline.stats(), &station.name);

    if let Err(error) = result {
        report_checkpoint(output_dir(&output_file));
        return Err(error);
    }
    Ok(())
}

fn run_options(args: &Args, output_file: PathBuf) -> RunOptions {
    let mut options = RunOptions::new(&args.input_dir, output_file);
    if let Some(filter) = &args.additional {
        options = options.with_additional_filter(filter);
    }
    if let Some(postfix) = &args.additional_postfix {
        options = options.with_additional_postfix(postfix);
    }
    if args.no_stopwords {
        options = options.without_stopwords();
    }
    options
}

fn output_dir(output_file: &Path) -> &Path {
    output_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn report_checkpoint(dir: &Path) {
    if let Ok(Some(checkpoint)) = Checkpoint::load(dir) {
        eprintln!(
            "{}",
            format!(
                "Run for {} stopped after {} lines (started {}). Rerun to start over.",
                checkpoint.station, checkpoint.lines_processed, checkpoint.start_time
            )
            .yellow()
        );
    }
}

/// Route warnings raised while loading configuration to stderr
fn with_startup_logging<T>(load: impl FnOnce() -> Result<T>) -> Result<T> {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::with_default(subscriber, load)
}

/// Set up structured logging for a processing session.
///
/// The console shows warnings (more with `-v`); the session log file, when
/// enabled, receives everything at the configured level.
pub fn setup_logging(
    args: &Args,
    settings: &Settings,
    base_dir: &Path,
    station: &str,
) -> Result<Option<PathBuf>> {
    use tracing_subscriber::{
        EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt,
        util::SubscriberInitExt,
    };

    let configured = settings.logging.level.to_lowercase();
    let log_level = args.get_log_level(&configured);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("komm_fmt={}", log_level)));

    let console_level: LevelFilter = args.console_level().parse().unwrap_or(LevelFilter::WARN);
    let console = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(console_level);

    let mut log_path = None;
    let file_layer = if settings.logging.enabled {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let path = settings.logging.log_path(base_dir, &date, station);
        match open_log_file(&path) {
            Ok(file) => {
                log_path = Some(path);
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(file)),
                )
            }
            Err(e) => {
                eprintln!("Could not open log file {}: {}", path.display(), e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(log_path)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Create a progress bar for output routing
pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .map(|style| style.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
