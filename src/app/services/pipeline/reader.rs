//! Input discovery, decoding and backups

use crate::app::services::station_registry::StationConfig;
use crate::{Error, Result};
use chardetng::EncodingDetector;
use chrono::Local;
use encoding_rs::{Encoding, ISO_8859_15, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One decoded input file
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub encoding: &'static Encoding,
    pub lines: Vec<String>,
}

impl InputFile {
    /// File name without extension, used by `prepend_filename`
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Files in `input_dir` whose name carries one of the station's extensions.
///
/// Only the directory itself is searched, in enumeration order. The output
/// file is never treated as input.
pub fn discover_input_files(
    input_dir: &Path,
    station: &StationConfig,
    exclude: &[&Path],
) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(Error::configuration(format!(
            "Input directory not found: {}",
            input_dir.display()
        )));
    }

    let excluded: Vec<PathBuf> = exclude.iter().map(|p| normalize(p)).collect();
    let mut files = Vec::new();

    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !station.matches_file_name(&file_name) {
            continue;
        }
        if excluded.contains(&normalize(entry.path())) {
            debug!("Not reading output file {} as input", entry.path().display());
            continue;
        }

        files.push(entry.into_path());
    }

    if files.is_empty() {
        return Err(Error::no_input_files(&station.name));
    }

    info!("Found {} input files for {}", files.len(), station.name);
    Ok(files)
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Pick the encoding of raw file contents.
///
/// Valid UTF-8 wins. Otherwise the detector's guess is used, except that
/// Western guesses (and a contradictory UTF-8 guess) become Windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if std::str::from_utf8(body).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, false);

    if guess == UTF_8 || guess == WINDOWS_1252 || guess == ISO_8859_15 {
        WINDOWS_1252
    } else {
        guess
    }
}

/// Decode raw contents, replacing undecodable bytes
pub fn decode(bytes: &[u8]) -> (String, &'static Encoding) {
    let encoding = detect_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("Replaced undecodable bytes while reading as {}", used.name());
    }
    (text.into_owned(), used)
}

/// Read and decode one input file into lines
pub fn read_input_file(path: &Path) -> Result<InputFile> {
    let bytes =
        fs::read(path).map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    let (text, encoding) = decode(&bytes);
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    info!(
        file = %path.display(),
        encoding = encoding.name(),
        lines = lines.len(),
        "Read input file"
    );

    Ok(InputFile {
        path: path.to_path_buf(),
        encoding,
        lines,
    })
}

/// Copy inputs into a timestamped directory below `backup_root`
pub fn backup_inputs(files: &[PathBuf], backup_root: &Path) -> Result<PathBuf> {
    let target = backup_root.join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&target)
        .map_err(|e| Error::io(format!("Failed to create {}", target.display()), e))?;

    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        fs::copy(file, target.join(name))
            .map_err(|e| Error::io(format!("Failed to back up {}", file.display()), e))?;
    }

    info!("Backed up {} files to {}", files.len(), target.display());
    Ok(target)
}
