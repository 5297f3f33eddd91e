//! Output streams: main, additional and rejected lines
//!
//! Every stream starts with the station's header row. A stream that never
//! receives a data row is deleted when the run finishes.

use crate::app::services::decision_engine::{PromptKind, PromptSpec, Prompter};
use crate::app::services::station_registry::StationConfig;
use crate::config::OutputSettings;
use crate::constants::MAX_OUTPUT_OPEN_ATTEMPTS;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the three streams go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub main: PathBuf,
    pub additional: Option<PathBuf>,
    pub reject: PathBuf,
}

impl OutputPaths {
    /// Derive the additional and rejection paths from the main output.
    ///
    /// A relative rejection directory is placed beside the main output.
    pub fn new(
        main: &Path,
        station: &StationConfig,
        settings: &OutputSettings,
        additional_postfix: Option<&str>,
        date: NaiveDate,
    ) -> Self {
        let parent = main.parent().unwrap_or_else(|| Path::new(""));
        let reject_dir = if settings.reject_directory.is_absolute() {
            settings.reject_directory.clone()
        } else {
            parent.join(&settings.reject_directory)
        };

        Self {
            main: main.to_path_buf(),
            additional: additional_postfix.map(|postfix| additional_path(main, postfix)),
            reject: reject_dir.join(reject_file_name(&station.name, date)),
        }
    }
}

/// `{stem}{postfix}{ext}` beside the main output
pub fn additional_path(main: &Path, postfix: &str) -> PathBuf {
    let stem = main
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match main.extension() {
        Some(ext) => format!("{}{}.{}", stem, postfix, ext.to_string_lossy()),
        None => format!("{}{}", stem, postfix),
    };
    main.with_file_name(name)
}

/// `{Y}-{m}-{d}-reject-{station}.csv`
pub fn reject_file_name(station: &str, date: NaiveDate) -> String {
    format!("{}-reject-{}.csv", date.format("%Y-%m-%d"), station)
}

/// One output file with a header row
#[derive(Debug)]
pub struct OutputStream {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl OutputStream {
    /// Create (or replace) the file and write the header row
    pub fn create(path: &Path, header: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", header)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| Error::output_unavailable(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and close; header-only files are deleted and yield `None`
    pub fn finish(self) -> Result<Option<PathBuf>> {
        let Self { path, writer, rows } = self;
        writer
            .into_inner()
            .map_err(|e| Error::output_unavailable(&path, e.into_error()))?;

        if rows == 0 {
            debug!("Removing empty output {}", path.display());
            if let Err(e) = fs::remove_file(&path) {
                warn!("Could not remove empty output {}: {}", path.display(), e);
            }
            return Ok(None);
        }
        Ok(Some(path))
    }
}

/// Open a stream, letting the user free a locked file and retry
pub fn open_with_retry(
    path: &Path,
    header: &str,
    prompter: &mut dyn Prompter,
) -> Result<OutputStream> {
    let mut attempt = 1;
    loop {
        let error = match OutputStream::create(path, header) {
            Ok(stream) => return Ok(stream),
            Err(e) => e,
        };

        warn!("Cannot open {}: {}", path.display(), error);
        if attempt >= MAX_OUTPUT_OPEN_ATTEMPTS {
            return Err(Error::output_unavailable(path, error));
        }

        let prompt = PromptSpec {
            decision: "output_retry".to_string(),
            title: "Output file unavailable".to_string(),
            context: vec![
                format!("{}: {}", path.display(), error),
                "Close any program using the file, then press Enter to retry".to_string(),
            ],
            message: "[Enter] retry / [Q]uit: ".to_string(),
            kind: PromptKind::Choice,
            error: None,
        };
        let answer = match prompter.ask(&prompt) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("No answer to retry prompt: {}", e);
                return Err(Error::output_unavailable(path, error));
            }
        };
        if answer.trim().eq_ignore_ascii_case("q") {
            return Err(Error::output_unavailable(path, error));
        }
        attempt += 1;
    }
}

/// Paths of the streams that ended up holding data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinishedOutputs {
    pub main: Option<PathBuf>,
    pub additional: Option<PathBuf>,
    pub reject: Option<PathBuf>,
}

/// The three streams of one run
#[derive(Debug)]
pub struct OutputStreams {
    main: OutputStream,
    additional: Option<OutputStream>,
    reject: OutputStream,
}

impl OutputStreams {
    pub fn open(paths: &OutputPaths, header: &str, prompter: &mut dyn Prompter) -> Result<Self> {
        let main = open_with_retry(&paths.main, header, prompter)?;
        let additional = match &paths.additional {
            Some(path) => Some(open_with_retry(path, header, prompter)?),
            None => None,
        };
        let reject = open_with_retry(&paths.reject, header, prompter)?;

        Ok(Self {
            main,
            additional,
            reject,
        })
    }

    pub fn write_main(&mut self, line: &str) -> Result<()> {
        self.main.write_line(line)
    }

    /// Write to the additional stream, or to main when there is none
    pub fn write_additional(&mut self, line: &str) -> Result<()> {
        match &mut self.additional {
            Some(stream) => stream.write_line(line),
            None => self.main.write_line(line),
        }
    }

    pub fn write_reject(&mut self, line: &str) -> Result<()> {
        self.reject.write_line(line)
    }

    pub fn main_rows(&self) -> usize {
        self.main.rows()
    }

    pub fn finish(self) -> Result<FinishedOutputs> {
        Ok(FinishedOutputs {
            main: self.main.finish()?,
            additional: match self.additional {
                Some(stream) => stream.finish()?,
                None => None,
            },
            reject: self.reject.finish()?,
        })
    }
}
