//! Station registry with case-insensitive lookup by key or alias
//!
//! This module loads every station definition from `stations.toml`,
//! merges in the default and station-specific stopwords from
//! `stopwords.toml`, and exposes immutable [`StationConfig`] values.
//! A station is constructed once at startup and only read afterwards.

use crate::app::models::FieldRole;
use crate::app::services::line_transformer::Transformation;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

pub mod loader;
pub mod parse_strategy;
pub mod stopwords;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use parse_strategy::{DelimitedStrategy, ParseStrategy, PositionalStrategy, StationLayout};
pub use stopwords::StopwordMatcher;

/// Immutable description of one station's input format
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// Lowercased lookup key from `stations.toml`
    pub key: String,

    /// Display name, also used in rejection and log file names
    pub name: String,

    /// Substrings matched against lowercased file names
    pub extensions: Vec<String>,

    pub aliases: Vec<String>,

    /// Output field separator
    pub separator: String,

    /// Leading lines skipped in every input file
    pub skip_lines: usize,

    /// Whether spreadsheets must be converted before reading
    pub convert: bool,

    /// Header row written at the top of every output stream
    pub headlines: Vec<String>,

    pub transformations: Vec<Transformation>,

    /// Whether the artist/title split detector runs for this station
    pub fix_artist_title_split: bool,

    /// Marketing suffix stripped by `remove_title_suffix`
    pub title_suffix: Regex,

    pub(crate) layout: StationLayout,
    pub(crate) field_roles: BTreeMap<FieldRole, usize>,
    pub(crate) stopwords: StopwordMatcher,
}

impl StationConfig {
    /// Parsing strategy chosen for this station's layout
    pub fn strategy(&self) -> &dyn ParseStrategy {
        self.layout.strategy()
    }

    pub fn is_positional(&self) -> bool {
        self.layout.is_positional()
    }

    /// Separator between fields of extracted lines
    pub fn field_separator(&self) -> &str {
        self.strategy().field_separator()
    }

    /// Column index of a semantic field, if the station has one
    pub fn field_index(&self, role: FieldRole) -> Option<usize> {
        self.field_roles.get(&role).copied()
    }

    pub fn field_roles(&self) -> &BTreeMap<FieldRole, usize> {
        &self.field_roles
    }

    pub fn stopwords(&self) -> &StopwordMatcher {
        &self.stopwords
    }

    /// Matched stopword in an already lowercased line
    pub fn matched_stopword<'a>(&self, line_lower: &'a str) -> Option<&'a str> {
        self.stopwords.find_lower(line_lower)
    }

    /// Header row joined with the output separator
    pub fn header_line(&self) -> String {
        self.headlines.join(&self.separator)
    }

    /// Whether a file name carries one of this station's extensions
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let name_lower = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| name_lower.contains(&ext.to_lowercase()))
    }
}

/// Every configured station, indexed by lowercased key and alias
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    pub(crate) stations: BTreeMap<String, StationConfig>,
    pub(crate) aliases: BTreeMap<String, String>,
}

impl StationRegistry {
    /// Load stations and stopwords from a configuration directory
    pub fn load(config_dir: &Path) -> crate::Result<Self> {
        loader::load_from_dir(config_dir)
    }

    /// Build a registry from TOML documents
    pub fn from_toml_str(stations: &str, stopwords: &str) -> crate::Result<Self> {
        loader::load_from_str(stations, stopwords, Path::new("<inline>"))
    }

    /// Look up a station by key, falling back to aliases.
    ///
    /// Direct station keys take precedence over aliases.
    pub fn get(&self, name: &str) -> Option<&StationConfig> {
        let name_lower = name.to_lowercase();
        self.stations.get(&name_lower).or_else(|| {
            self.aliases
                .get(&name_lower)
                .and_then(|key| self.stations.get(key))
        })
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Station keys with their aliases, ordered by key
    pub fn list(&self) -> Vec<(&str, Vec<&str>)> {
        self.stations
            .keys()
            .map(|key| {
                let aliases = self
                    .aliases
                    .iter()
                    .filter(|(_, target)| *target == key)
                    .map(|(alias, _)| alias.as_str())
                    .collect();
                (key.as_str(), aliases)
            })
            .collect()
    }
}
