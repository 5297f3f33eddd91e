//! Application constants for the commercial formatter
//!
//! This module contains default values, file names and fixed markers
//! used throughout the formatter.

// =============================================================================
// Configuration Files
// =============================================================================

/// Directory name used for configuration when no explicit directory is given
pub const CONFIG_DIR_NAME: &str = "komm_fmt";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "KOMM_FMT_CONFIG_DIR";

/// Local configuration directory checked before the platform config dir
pub const LOCAL_CONFIG_DIR: &str = "config";

/// Settings file inside the configuration directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Station definitions inside the configuration directory
pub const STATIONS_FILE: &str = "stations.toml";

/// Stopword lists inside the configuration directory
pub const STOPWORDS_FILE: &str = "stopwords.toml";

/// Stopword table applied to every station
pub const DEFAULT_STOPWORD_TABLE: &str = "default";

// =============================================================================
// Thresholds
// =============================================================================

/// Playing times at or above this many minutes are reviewed
pub const DEFAULT_LONG_PLAYING_TIME_MINUTES: u32 = 30;

/// Playing times at or above this many minutes are treated as day overflow
pub const DEFAULT_OVERFLOW_THRESHOLD_MINUTES: u32 = 1400;

/// Seconds in one day, used to undo the midnight overflow
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Two-digit years below this pivot belong to the 2000s
pub const YEAR_PIVOT: u32 = 50;

// =============================================================================
// Remembered Choices
// =============================================================================

/// Default file name for remembered choices
pub const DEFAULT_CHOICES_FILE: &str = "remembered_choices.toml";

/// Joins issue key components into a fingerprint.
///
/// Components are escaped before joining, so the separator never appears
/// inside a component.
pub const FINGERPRINT_SEPARATOR: char = '\u{1f}';

// =============================================================================
// Output
// =============================================================================

/// Default postfix for the additional output file
pub const DEFAULT_ADDITIONAL_POSTFIX: &str = "_additional";

/// Default directory for dated rejection files
pub const DEFAULT_REJECT_DIR: &str = "rejected";

/// Default directory for input backups
pub const DEFAULT_BACKUP_DIR: &str = "backup";

/// Default log file pattern; `{date}` and `{station}` are substituted
pub const DEFAULT_LOG_FILENAME: &str = "logs/komm_fmt_{date}_{station}.log";

/// Checkpoint file written next to the output file
pub const CHECKPOINT_FILE: &str = ".komm_fmt_checkpoint.json";

/// Lines routed between checkpoint updates
pub const CHECKPOINT_INTERVAL: usize = 1000;

/// Attempts at opening an output file before giving up
pub const MAX_OUTPUT_OPEN_ATTEMPTS: usize = 5;

/// Stopwords listed in the run summary
pub const STOPWORD_SUMMARY_TOP_N: usize = 10;

/// Default field separator
pub const DEFAULT_SEPARATOR: &str = ";";

/// Separator used by exports that join fields for humans
pub const DASH_SEPARATOR: &str = " - ";

// =============================================================================
// Column Pruning
// =============================================================================

/// Header marking a column for removal from the final output
pub const DELETE_COLUMN_MARKER: &str = "DELETE";

/// Output header holding the artist
pub const MAIN_ARTIST_HEADER: &str = "Main Artist";

/// Output header holding the title
pub const TRACK_TITLE_HEADER: &str = "Track Title";

/// Output header flagging tracks that were only aired as podcast
pub const PODCAST_ONLY_HEADER: &str = "Podcast only";

// =============================================================================
// Field Roles
// =============================================================================

/// Header names recognised for each semantic field role, by exact match
pub mod field_headers {
    pub const TITLE: &[&str] = &["Track Title", "Title"];
    pub const ARTIST: &[&str] = &["Main Artist", "Artist"];
    pub const DURATION: &[&str] = &["Playing Time", "Duration"];
    pub const DATE: &[&str] = &["Date", "Broadcast Date"];
    pub const TIME: &[&str] = &["Time", "Broadcast Time"];
}

/// Marketing suffix stripped by `remove_title_suffix` unless a station overrides it
pub const DEFAULT_TITLE_SUFFIX_PATTERN: &str =
    r"(?i)\s*[(\[]\s*(?:radio\s+edit|single\s+edit|radio\s+version|radio\s+mix|commercial)\s*[)\]]\s*$";

/// Spreadsheet files handed to the converter for `convert = true` stations
pub const SPREADSHEET_PATTERN: &str = "*.xls*";

/// Extension of the text files written by the spreadsheet converter
pub const DEFAULT_CONVERTED_EXTENSION: &str = "txt";
