//! Configuration management and validation.
//!
//! Provides the read-only settings that steer a run: detector thresholds,
//! duplicate policy, remembered-choice storage, logging, backups and
//! output locations. Settings are loaded once from `settings.toml` and
//! passed down by reference; nothing in the pipeline mutates them.

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_ADDITIONAL_POSTFIX, DEFAULT_BACKUP_DIR,
    DEFAULT_CHOICES_FILE, DEFAULT_CONVERTED_EXTENSION, DEFAULT_LOG_FILENAME,
    DEFAULT_LONG_PLAYING_TIME_MINUTES, DEFAULT_OVERFLOW_THRESHOLD_MINUTES, DEFAULT_REJECT_DIR,
    LOCAL_CONFIG_DIR, SETTINGS_FILE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Detector thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Playing times at or above this many minutes are reviewed
    pub long_playing_time_minutes: u32,

    /// Playing times at or above this many minutes are corrected for day overflow
    pub overflow_threshold_minutes: u32,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            long_playing_time_minutes: DEFAULT_LONG_PLAYING_TIME_MINUTES,
            overflow_threshold_minutes: DEFAULT_OVERFLOW_THRESHOLD_MINUTES,
        }
    }
}

/// How duplicate tracks are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Ask once per unique duplicate group
    #[default]
    Prompt,
    /// Keep every occurrence
    Keep,
    /// Keep only the first occurrence
    Reject,
}

/// Duplicate detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateSettings {
    pub enabled: bool,
    pub action: DuplicatePolicy,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            action: DuplicatePolicy::Prompt,
        }
    }
}

/// Remembered choice configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceSettings {
    /// When false the store never recalls and never persists
    pub remember_fixes: bool,

    /// Choice file, relative to the configuration directory unless absolute
    pub choices_file: PathBuf,
}

impl Default for ChoiceSettings {
    fn default() -> Self {
        Self {
            remember_fixes: true,
            choices_file: PathBuf::from(DEFAULT_CHOICES_FILE),
        }
    }
}

/// Session log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub enabled: bool,

    /// Log file pattern with `{date}` and `{station}` placeholders
    pub filename: String,

    /// Level written to the log file
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filename: DEFAULT_LOG_FILENAME.to_string(),
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Resolve the log file path for a station on a given date
    pub fn log_path(&self, base_dir: &Path, date: &str, station: &str) -> PathBuf {
        let filename = self
            .filename
            .replace("{date}", date)
            .replace("{station}", &station.to_lowercase());
        let path = PathBuf::from(filename);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    }
}

/// Input backup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSettings {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from(DEFAULT_BACKUP_DIR),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory receiving dated rejection files
    pub reject_directory: PathBuf,

    /// Postfix inserted before the extension of the additional file
    pub additional_postfix: String,

    /// Drop main-output rows whose `Podcast only` column is `TRUE`
    pub drop_podcast_only: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            reject_directory: PathBuf::from(DEFAULT_REJECT_DIR),
            additional_postfix: DEFAULT_ADDITIONAL_POSTFIX.to_string(),
            drop_podcast_only: false,
        }
    }
}

/// Multi-year filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiYearSettings {
    pub enabled: bool,
}

impl Default for MultiYearSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Spreadsheet conversion configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// External program invoked with the spreadsheet paths as arguments
    pub command: Option<String>,

    /// Arguments placed before the spreadsheet paths
    pub args: Vec<String>,

    /// Extension of the text file the program writes next to each spreadsheet
    pub output_extension: String,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            output_extension: DEFAULT_CONVERTED_EXTENSION.to_string(),
        }
    }
}

/// Global application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub thresholds: ThresholdSettings,
    pub duplicates: DuplicateSettings,
    pub choices: ChoiceSettings,
    pub logging: LoggingSettings,
    pub backup: BackupSettings,
    pub output: OutputSettings,
    pub multi_year: MultiYearSettings,
    pub convert: ConvertSettings,
}

impl Settings {
    /// Load settings from `settings.toml` in the given directory.
    ///
    /// A missing file yields defaults. A file that cannot be parsed is
    /// reported and also yields defaults, so a typo never blocks a run.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE);
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;

        match toml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Resolve the configuration directory.
    ///
    /// Order: explicit path, `KOMM_FMT_CONFIG_DIR`, `./config` when present,
    /// then the platform configuration directory.
    pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_DIR);
        if local.is_dir() {
            return Ok(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::configuration("Could not determine a configuration directory"))
    }

    /// Resolve the remembered-choice file against the configuration directory
    pub fn choices_path(&self, config_dir: &Path) -> PathBuf {
        if self.choices.choices_file.is_absolute() {
            self.choices.choices_file.clone()
        } else {
            config_dir.join(&self.choices.choices_file)
        }
    }

    /// Set the long playing time threshold
    pub fn with_long_playing_time(mut self, minutes: u32) -> Self {
        self.thresholds.long_playing_time_minutes = minutes;
        self
    }

    /// Set the overflow threshold
    pub fn with_overflow_threshold(mut self, minutes: u32) -> Self {
        self.thresholds.overflow_threshold_minutes = minutes;
        self
    }

    /// Set the duplicate policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates.action = policy;
        self
    }

    /// Disable remembered choices
    pub fn without_remembered_choices(mut self) -> Self {
        self.choices.remember_fixes = false;
        self
    }

    /// Disable input backups
    pub fn without_backup(mut self) -> Self {
        self.backup.enabled = false;
        self
    }

    /// Disable the session log file
    pub fn without_log_file(mut self) -> Self {
        self.logging.enabled = false;
        self
    }

    /// Drop podcast-only rows from the main output
    pub fn with_podcast_filter(mut self) -> Self {
        self.output.drop_podcast_only = true;
        self
    }

    /// Set the rejection directory
    pub fn with_reject_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.reject_directory = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path()).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.thresholds.long_playing_time_minutes, 30);
        assert_eq!(settings.thresholds.overflow_threshold_minutes, 1400);
        assert_eq!(settings.duplicates.action, DuplicatePolicy::Prompt);
        assert!(settings.choices.remember_fixes);
    }

    #[test]
    fn test_partial_settings_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            r#"
[thresholds]
long_playing_time_minutes = 12

[duplicates]
action = "reject"
"#,
        )
        .unwrap();

        let settings = Settings::load(temp_dir.path()).unwrap();
        assert_eq!(settings.thresholds.long_playing_time_minutes, 12);
        assert_eq!(settings.thresholds.overflow_threshold_minutes, 1400);
        assert_eq!(settings.duplicates.action, DuplicatePolicy::Reject);
        assert!(settings.duplicates.enabled);
        assert!(settings.backup.enabled);
    }

    #[test]
    fn test_malformed_settings_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE), "[thresholds\nnope").unwrap();

        let settings = Settings::load(temp_dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_log_path_substitutes_placeholders() {
        let logging = LoggingSettings::default();
        let path = logging.log_path(Path::new("/work"), "2024-03-01", "Globus");
        assert_eq!(
            path,
            PathBuf::from("/work/logs/komm_fmt_2024-03-01_globus.log")
        );
    }

    #[test]
    fn test_choices_path_relative_to_config_dir() {
        let settings = Settings::default();
        assert_eq!(
            settings.choices_path(Path::new("/etc/komm")),
            PathBuf::from("/etc/komm/remembered_choices.toml")
        );
    }

    #[test]
    fn test_explicit_config_dir_wins() {
        let dir = Settings::resolve_config_dir(Some(Path::new("/explicit"))).unwrap();
        assert_eq!(dir, PathBuf::from("/explicit"));
    }
}
