//! Commercial Formatter Library
//!
//! A Rust library for normalizing broadcast-metadata exports from radio
//! stations into a single standardized delimited report.
//!
//! This library provides tools for:
//! - Loading per-station input layouts (fixed-width or delimited) and stopwords
//! - Normalizing date, time and playing-time fields
//! - Applying station-specific line transformations
//! - Detecting data-quality anomalies and resolving them interactively
//! - Remembering resolutions across runs, keyed by a content fingerprint
//! - Routing lines to main, additional and rejection outputs

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod anomaly_detectors;
        pub mod choice_store;
        pub mod column_pruner;
        pub mod decision_engine;
        pub mod field_formatter;
        pub mod line_transformer;
        pub mod pipeline;
        pub mod spreadsheet;
        pub mod station_registry;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
    pub mod output;
}

// Re-export commonly used types
pub use app::models::{Decision, Issue, IssueKey, ProcessingStats};
pub use app::services::station_registry::StationConfig;
pub use config::Settings;

use std::path::PathBuf;

/// Result type alias for the formatter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for formatter operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// TOML document could not be parsed
    #[error("Could not parse '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Station not found by name or alias
    #[error("'{name}' is not a valid station or alias")]
    StationNotFound { name: String },

    /// Station lists a transformation that does not exist
    #[error("Station '{station}' lists unknown transformation '{name}'")]
    UnknownTransformation { station: String, name: String },

    /// No input files matched the station's extensions
    #[error("No eligible files found for station '{station}'")]
    NoInputFiles { station: String },

    /// Remembered-choice persistence failed
    #[error("Choice store error: {message}")]
    ChoiceStore { message: String },

    /// Interactive prompt could not obtain an answer
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// Output stream could not be opened or written
    #[error("Output file '{path}' is unavailable: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited file could not be read or rewritten
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a TOML parse error for a file
    pub fn toml_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::TomlParse {
            path: path.into(),
            source,
        }
    }

    /// Create a station not found error
    pub fn station_not_found(name: impl Into<String>) -> Self {
        Self::StationNotFound { name: name.into() }
    }

    /// Create an unknown transformation error
    pub fn unknown_transformation(station: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownTransformation {
            station: station.into(),
            name: name.into(),
        }
    }

    /// Create a no input files error
    pub fn no_input_files(station: impl Into<String>) -> Self {
        Self::NoInputFiles {
            station: station.into(),
        }
    }

    /// Create a choice store error
    pub fn choice_store(message: impl Into<String>) -> Self {
        Self::ChoiceStore {
            message: message.into(),
        }
    }

    /// Create a prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }

    /// Create an output unavailable error
    pub fn output_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a CSV error for a file
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should end the process with a non-zero exit code.
    ///
    /// Only configuration problems and unrecoverable output streams are fatal;
    /// everything else is reported and the run carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::TomlParse { .. }
                | Self::StationNotFound { .. }
                | Self::UnknownTransformation { .. }
                | Self::NoInputFiles { .. }
                | Self::OutputUnavailable { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
