//! Final clean-up of the main output file
//!
//! Columns whose header is the `DELETE` marker are dropped, short rows are
//! padded to the header width, and rows without an artist or a title are
//! removed. Optionally, rows whose `Podcast only` column is `TRUE` are
//! removed as well. The file is rewritten through a temporary sibling.

use crate::constants::{
    DELETE_COLUMN_MARKER, MAIN_ARTIST_HEADER, PODCAST_ONLY_HEADER, TRACK_TITLE_HEADER,
};
use crate::{Error, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// What pruning changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed_columns: usize,
    pub removed_rows: usize,
    pub padded_rows: usize,
    /// Rows dropped because they were podcast only
    pub podcast_rows: usize,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Column pruner for separator-delimited output files
#[derive(Debug, Clone, Copy)]
pub struct ColumnPruner {
    delimiter: u8,
    drop_podcast_only: bool,
}

impl ColumnPruner {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            drop_podcast_only: false,
        }
    }

    /// Also drop rows flagged `TRUE` in the `Podcast only` column
    pub fn with_podcast_filter(mut self) -> Self {
        self.drop_podcast_only = true;
        self
    }

    /// Pruner for a field separator, if it is a single byte
    pub fn for_separator(separator: &str) -> Option<Self> {
        match separator.as_bytes() {
            [byte] => Some(Self::new(*byte)),
            _ => None,
        }
    }

    /// Prune a file in place
    pub fn prune(&self, path: &Path) -> Result<PruneReport> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record.map_err(|e| Error::csv(path, e))?,
            None => return Ok(PruneReport::default()),
        };

        let width = header.len();
        let keep: Vec<bool> = header
            .iter()
            .map(|name| name.trim() != DELETE_COLUMN_MARKER)
            .collect();
        let artist_index = header.iter().position(|h| h.trim() == MAIN_ARTIST_HEADER);
        let title_index = header.iter().position(|h| h.trim() == TRACK_TITLE_HEADER);
        let podcast_index = header
            .iter()
            .position(|h| h.trim() == PODCAST_ONLY_HEADER)
            .filter(|_| self.drop_podcast_only);

        let mut report = PruneReport {
            removed_columns: keep.iter().filter(|k| !**k).count(),
            ..PruneReport::default()
        };

        let mut rows: Vec<StringRecord> = vec![project(&header, &keep)];
        for record in records {
            let mut record = record.map_err(|e| Error::csv(path, e))?;
            if record.len() < width {
                report.padded_rows += 1;
                while record.len() < width {
                    record.push_field("");
                }
            }

            let is_blank = |index: Option<usize>| {
                index.is_some_and(|i| record.get(i).is_none_or(|v| v.trim().is_empty()))
            };
            if is_blank(artist_index) || is_blank(title_index) {
                report.removed_rows += 1;
                continue;
            }
            let podcast_only = podcast_index
                .and_then(|i| record.get(i))
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
            if podcast_only {
                report.podcast_rows += 1;
                continue;
            }

            rows.push(project(&record, &keep));
        }

        if report.is_empty() {
            debug!("Nothing to prune in {}", path.display());
            return Ok(report);
        }

        write_atomically(path, self.delimiter, &rows)?;
        info!(
            removed_columns = report.removed_columns,
            removed_rows = report.removed_rows,
            padded_rows = report.padded_rows,
            podcast_rows = report.podcast_rows,
            "Pruned {}",
            path.display()
        );
        Ok(report)
    }
}

/// Fields whose column is kept; fields past the header width are kept too
fn project(record: &StringRecord, keep: &[bool]) -> StringRecord {
    record
        .iter()
        .enumerate()
        .filter(|(index, _)| keep.get(*index).copied().unwrap_or(true))
        .map(|(_, field)| field)
        .collect()
}

fn write_atomically(path: &Path, delimiter: u8, rows: &[StringRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let temp = NamedTempFile::new_in(&dir)
        .map_err(|e| Error::io(format!("Failed to stage {}", path.display()), e))?;

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(temp);

    for row in rows {
        writer.write_record(row).map_err(|e| Error::csv(path, e))?;
    }

    let temp = writer
        .into_inner()
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e.into_error()))?;
    temp.persist(path)
        .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e.error))?;
    Ok(())
}
