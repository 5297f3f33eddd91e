//! Spreadsheet conversion for stations that deliver `.xls`/`.xlsx` files
//!
//! The pipeline only relies on one contract: after conversion every
//! spreadsheet has a delimited text sibling that input discovery can find.

use crate::config::ConvertSettings;
use crate::constants::SPREADSHEET_PATTERN;
use crate::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Turns spreadsheets into sibling text files
pub trait SpreadsheetConverter {
    /// Convert every spreadsheet, returning the text files that now exist
    fn convert(&self, spreadsheets: &[PathBuf]) -> Result<Vec<PathBuf>>;
}

/// Spreadsheets directly inside `dir`, matched case-insensitively
pub fn find_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/{}", escaped, SPREADSHEET_PATTERN);
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };

    let entries = glob::glob_with(&pattern, options)
        .map_err(|e| Error::configuration(format!("Invalid spreadsheet pattern: {}", e)))?;

    let mut spreadsheets = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => spreadsheets.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path: {}", e),
        }
    }

    debug!("Found {} spreadsheets in {}", spreadsheets.len(), dir.display());
    Ok(spreadsheets)
}

/// Converter running an external program once for all spreadsheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    command: String,
    args: Vec<String>,
    output_extension: String,
}

impl CommandConverter {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        output_extension: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            output_extension: output_extension.into(),
        }
    }

    /// Converter from `[convert]` settings; `None` when no command is set
    pub fn from_settings(settings: &ConvertSettings) -> Option<Self> {
        let command = settings.command.as_deref()?.trim();
        if command.is_empty() {
            return None;
        }
        Some(Self::new(
            command,
            settings.args.clone(),
            settings.output_extension.trim_start_matches('.'),
        ))
    }

    /// Text file the program is expected to write for a spreadsheet
    pub fn converted_path(&self, spreadsheet: &Path) -> PathBuf {
        spreadsheet.with_extension(&self.output_extension)
    }
}

impl SpreadsheetConverter for CommandConverter {
    fn convert(&self, spreadsheets: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if spreadsheets.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Converting {} spreadsheets with '{}'",
            spreadsheets.len(),
            self.command
        );
        let status = Command::new(&self.command)
            .args(&self.args)
            .args(spreadsheets)
            .status()
            .map_err(|e| Error::io(format!("Failed to run '{}'", self.command), e))?;

        if !status.success() {
            return Err(Error::io(
                format!("Spreadsheet conversion with '{}' failed", self.command),
                io::Error::other(status.to_string()),
            ));
        }

        let mut converted = Vec::with_capacity(spreadsheets.len());
        for spreadsheet in spreadsheets {
            let target = self.converted_path(spreadsheet);
            if target.exists() {
                converted.push(target);
            } else {
                warn!(
                    "No converted file for {} (expected {})",
                    spreadsheet.display(),
                    target.display()
                );
            }
        }
        Ok(converted)
    }
}
