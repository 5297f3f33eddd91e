//! Processing pipeline for one station run
//!
//! The pipeline owns the cumulative line list and the set of rejected
//! indices for the duration of a run. Everything it depends on (station,
//! settings, choice store, prompter, spreadsheet converter) is handed in by
//! the caller.
//!
//! # Stages
//!
//! 1. Spreadsheet conversion (stations with `convert = true`)
//! 2. Input discovery and optional backup
//! 3. Reading, decoding, header skipping, column extraction and transformations
//! 4. Artist/title split -> multi-year filter -> long playing times -> duplicates
//! 5. Output routing with stopwords, then column pruning of the main output

pub mod checkpoint;
pub mod output;
pub mod reader;

#[cfg(test)]
pub mod tests;

pub use checkpoint::{Checkpoint, CheckpointWriter};
pub use output::{FinishedOutputs, OutputPaths, OutputStreams};
pub use reader::{InputFile, discover_input_files, read_input_file};

use crate::Result;
use crate::app::models::ProcessingStats;
use crate::app::services::anomaly_detectors::{
    ArtistTitleFixer, DuplicateDetector, LongPlayingTimeReviewer, MultiYearFilter,
};
use crate::app::services::choice_store::{ChoiceStore, ChoiceTable};
use crate::app::services::column_pruner::ColumnPruner;
use crate::app::services::decision_engine::{DecisionEngine, Prompter};
use crate::app::services::field_formatter::FieldFormatter;
use crate::app::services::line_transformer::apply_transformations;
use crate::app::services::spreadsheet::{SpreadsheetConverter, find_spreadsheets};
use crate::app::services::station_registry::StationConfig;
use crate::config::Settings;
use chrono::Local;
use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-run choices made on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    /// Lines containing this text (case-insensitive) go to the additional file
    pub additional_filter: Option<String>,
    /// Overrides `output.additional_postfix`
    pub additional_postfix: Option<String>,
    pub use_stopwords: bool,
}

impl RunOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_file: output_file.into(),
            additional_filter: None,
            additional_postfix: None,
            use_stopwords: true,
        }
    }

    pub fn with_additional_filter(mut self, filter: impl Into<String>) -> Self {
        self.additional_filter = Some(filter.into());
        self
    }

    pub fn with_additional_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.additional_postfix = Some(postfix.into());
        self
    }

    pub fn without_stopwords(mut self) -> Self {
        self.use_stopwords = false;
        self
    }

    /// Lowercased additional filter, ignoring blank filters
    fn filter_lower(&self) -> Option<String> {
        self.additional_filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase)
    }
}

/// One run of the formatter for a single station
pub struct Pipeline<'a, P: Prompter> {
    station: &'a StationConfig,
    settings: &'a Settings,
    store: &'a mut ChoiceStore,
    engine: DecisionEngine<P>,
    converter: Option<&'a dyn SpreadsheetConverter>,
    options: RunOptions,
    stats: ProcessingStats,
    progress: ProgressBar,
}

impl<'a, P: Prompter> Pipeline<'a, P> {
    pub fn new(
        station: &'a StationConfig,
        settings: &'a Settings,
        store: &'a mut ChoiceStore,
        prompter: P,
        options: RunOptions,
    ) -> Self {
        Self {
            station,
            settings,
            store,
            engine: DecisionEngine::new(prompter),
            converter: None,
            options,
            stats: ProcessingStats::new(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_converter(mut self, converter: &'a dyn SpreadsheetConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Show routing progress on the given bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Statistics so far; still meaningful after a failed run
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn prompter(&self) -> &P {
        self.engine.prompter()
    }

    /// Run every stage and return the final statistics
    pub fn run(&mut self) -> Result<ProcessingStats> {
        info!(station = %self.station.name, "Starting run");

        if self.station.convert {
            self.convert_spreadsheets()?;
        }

        let files = discover_input_files(
            &self.options.input_dir,
            self.station,
            &[self.options.output_file.as_path()],
        )?;
        self.stats.files_total = files.len();

        if self.settings.backup.enabled {
            self.backup(&files);
        }

        let mut lines = self.read_all(&files);
        let rejected = self.detect(&mut lines)?;
        self.route(&lines, &rejected)?;

        info!(
            files = self.stats.files_processed,
            lines = self.stats.lines_processed,
            rejected = self.stats.lines_rejected,
            "Processing complete"
        );
        Ok(self.stats.clone())
    }

    fn convert_spreadsheets(&mut self) -> Result<()> {
        let spreadsheets = find_spreadsheets(&self.options.input_dir)?;
        if spreadsheets.is_empty() {
            return Ok(());
        }

        match self.converter {
            Some(converter) => match converter.convert(&spreadsheets) {
                Ok(converted) => info!(
                    "Converted {} of {} spreadsheets",
                    converted.len(),
                    spreadsheets.len()
                ),
                Err(e) => warn!("Spreadsheet conversion failed: {}", e),
            },
            None => warn!(
                "Found {} spreadsheets but no converter is configured; set [convert] command",
                spreadsheets.len()
            ),
        }
        Ok(())
    }

    fn backup(&self, files: &[PathBuf]) {
        let directory = &self.settings.backup.directory;
        let root = if directory.is_absolute() {
            directory.clone()
        } else {
            self.options.input_dir.join(directory)
        };
        if let Err(e) = reader::backup_inputs(files, &root) {
            warn!("Backup failed, continuing without: {}", e);
        }
    }

    /// Decode every file, skip headers, extract columns and transform.
    ///
    /// An unreadable file is skipped with a warning.
    fn read_all(&mut self, files: &[PathBuf]) -> Vec<String> {
        let strategy = self.station.strategy();
        let mut lines = Vec::new();

        for path in files {
            let input = match read_input_file(path) {
                Ok(input) => input,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    self.stats.files_failed += 1;
                    continue;
                }
            };

            let stem = input.stem();
            let body: Vec<String> = input
                .lines
                .into_iter()
                .skip(self.station.skip_lines)
                .map(|line| {
                    if line.trim().is_empty() {
                        line
                    } else {
                        strategy.extract(&line)
                    }
                })
                .collect();

            self.stats.lines_read += body.len();
            lines.extend(apply_transformations(body, self.station, &stem));
            self.stats.files_processed += 1;
        }

        debug!("{} working lines from {} files", lines.len(), files.len());
        lines
    }

    /// Run the detectors in order and collect rejected indices
    fn detect(&mut self, lines: &mut Vec<String>) -> Result<BTreeSet<usize>> {
        let station = self.station;
        let settings = self.settings;
        let mut rejected = BTreeSet::new();

        if station.fix_artist_title_split {
            let mut memory = self.store.table(ChoiceTable::ArtistTitleFixes);
            let split = ArtistTitleFixer::new(station, lines.as_mut_slice())
                .run(&mut self.engine, &mut memory)?;
            rejected.extend(split);
        }

        if settings.multi_year.enabled {
            let outcome = MultiYearFilter::new(station).run(lines, &mut self.engine)?;
            if outcome.kept_year.is_some() {
                rejected = outcome.remap(&rejected);
                self.stats.lines_filtered = outcome.removed;
            }
        }

        let formatter = FieldFormatter::new(settings.thresholds.overflow_threshold_minutes);
        let mut memory = self.store.table(ChoiceTable::LongPlayingTimes);
        let long = LongPlayingTimeReviewer::new(
            station,
            lines.as_mut_slice(),
            formatter,
            settings.thresholds.long_playing_time_minutes,
        )
        .run(&mut self.engine, &mut memory)?;
        rejected.extend(long);

        if settings.duplicates.enabled {
            let duplicates =
                DuplicateDetector::new(station, lines.as_slice(), settings.duplicates.action)
                    .run(&mut self.engine, &rejected)?;
            rejected.extend(duplicates);
        }

        debug!("{} lines marked for rejection", rejected.len());
        Ok(rejected)
    }

    /// Write every line to the main, additional or rejection stream
    fn route(&mut self, lines: &[String], rejected: &BTreeSet<usize>) -> Result<()> {
        let station = self.station;
        let output_file = self.options.output_file.clone();
        let filter = self.options.filter_lower();
        let postfix = self
            .options
            .additional_postfix
            .clone()
            .unwrap_or_else(|| self.settings.output.additional_postfix.clone());

        let paths = OutputPaths::new(
            &output_file,
            station,
            &self.settings.output,
            filter.as_ref().map(|_| postfix.as_str()),
            Local::now().date_naive(),
        );
        let header = station.header_line();
        let mut streams = OutputStreams::open(&paths, &header, self.engine.prompter_mut())?;

        let checkpoint_dir = output_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut checkpoint = CheckpointWriter::new(checkpoint_dir, &station.name, &output_file);
        checkpoint.start();

        let formatter = FieldFormatter::new(self.settings.thresholds.overflow_threshold_minutes);
        self.progress.set_length(lines.len() as u64);
        for (index, line) in lines.iter().enumerate() {
            checkpoint.record(index + 1);
            self.progress.inc(1);
            if line.trim().is_empty() {
                continue;
            }

            let formatted = station
                .strategy()
                .format_line(line, &formatter, &station.separator);
            if rejected.contains(&index) {
                streams.write_reject(&formatted)?;
                self.stats.lines_rejected += 1;
                self.stats.forced_rejections += 1;
                continue;
            }

            let lower = line.to_lowercase();
            if self.options.use_stopwords {
                if let Some(stopword) = station.matched_stopword(&lower) {
                    debug!(stopword, line = index + 1, "Stopword match");
                    self.stats.record_stopword(stopword);
                    streams.write_reject(&formatted)?;
                    self.stats.lines_rejected += 1;
                    continue;
                }
            }

            let formatted = self.pad_to_header(formatted);
            match &filter {
                Some(filter) if lower.contains(filter.as_str()) => {
                    streams.write_additional(&formatted)?
                }
                _ => streams.write_main(&formatted)?,
            }
            self.stats.lines_processed += 1;
        }

        let finished = streams.finish()?;
        self.progress.finish_and_clear();
        if let Some(main) = &finished.main {
            self.prune(main);
        }

        self.stats.output_file = finished.main;
        self.stats.additional_file = finished.additional;
        self.stats.reject_file = finished.reject;
        checkpoint.complete();
        Ok(())
    }

    /// Pad a formatted line with empty fields up to the header width
    fn pad_to_header(&mut self, line: String) -> String {
        let width = self.station.headlines.len();
        let fields = line.split(self.station.separator.as_str()).count();
        if width == 0 || fields >= width {
            return line;
        }

        self.stats.malformed_lines += 1;
        let mut padded = line;
        for _ in fields..width {
            padded.push_str(&self.station.separator);
        }
        padded
    }

    fn prune(&self, main: &Path) {
        let pruner = ColumnPruner::for_separator(&self.station.separator).map(|pruner| {
            if self.settings.output.drop_podcast_only {
                pruner.with_podcast_filter()
            } else {
                pruner
            }
        });
        match pruner {
            Some(pruner) => {
                if let Err(e) = pruner.prune(main) {
                    warn!("Column pruning failed for {}: {}", main.display(), e);
                }
            }
            None => warn!(
                "Separator '{}' is not a single character; skipping column pruning",
                self.station.separator
            ),
        }
    }
}
