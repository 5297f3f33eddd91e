//! Loading station definitions and stopwords from TOML
//!
//! Station tables are validated here so that every configuration mistake
//! (unknown transformation, missing column boundaries, bad suffix pattern)
//! surfaces at startup rather than in the middle of a run.

use super::{
    DelimitedStrategy, PositionalStrategy, StationConfig, StationLayout, StationRegistry,
    StopwordMatcher,
};
use crate::app::models::FieldRole;
use crate::app::services::line_transformer::Transformation;
use crate::constants::{
    DEFAULT_SEPARATOR, DEFAULT_STOPWORD_TABLE, DEFAULT_TITLE_SUFFIX_PATTERN, STATIONS_FILE,
    STOPWORDS_FILE, field_headers,
};
use crate::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A station table as written in `stations.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStation {
    name: Option<String>,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    positional: bool,
    #[serde(default)]
    positions: Vec<usize>,
    separator: Option<String>,
    input_separator: Option<String>,
    #[serde(default)]
    has_headlines: bool,
    skip_lines: Option<usize>,
    #[serde(default)]
    convert: bool,
    #[serde(default)]
    headlines: Vec<String>,
    #[serde(default)]
    transformations: Vec<String>,
    #[serde(default = "default_true")]
    fix_artist_title_split: bool,
    title_suffix_pattern: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, usize>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawStopwords {
    #[serde(default)]
    words: Vec<String>,
}

/// Load `stations.toml` (required) and `stopwords.toml` (optional)
pub fn load_from_dir(config_dir: &Path) -> Result<StationRegistry> {
    let stations_path = config_dir.join(STATIONS_FILE);
    if !stations_path.exists() {
        return Err(Error::configuration(format!(
            "Stations config not found: {}",
            stations_path.display()
        )));
    }

    let stations = fs::read_to_string(&stations_path)
        .map_err(|e| Error::io(format!("Failed to read {}", stations_path.display()), e))?;

    let stopwords_path = config_dir.join(STOPWORDS_FILE);
    let stopwords = if stopwords_path.exists() {
        fs::read_to_string(&stopwords_path)
            .map_err(|e| Error::io(format!("Failed to read {}", stopwords_path.display()), e))?
    } else {
        debug!("No stopwords file at {}", stopwords_path.display());
        String::new()
    };

    load_from_str(&stations, &stopwords, config_dir)
}

/// Build a registry from the two TOML documents
pub fn load_from_str(stations: &str, stopwords: &str, origin: &Path) -> Result<StationRegistry> {
    let raw_stations: BTreeMap<String, RawStation> = toml::from_str(stations)
        .map_err(|e| Error::toml_parse(origin.join(STATIONS_FILE), e))?;
    let raw_stopwords: BTreeMap<String, RawStopwords> = toml::from_str(stopwords)
        .map_err(|e| Error::toml_parse(origin.join(STOPWORDS_FILE), e))?;

    let default_words = raw_stopwords
        .get(DEFAULT_STOPWORD_TABLE)
        .map(|table| table.words.clone())
        .unwrap_or_default();

    let mut registry = StationRegistry::default();

    for (key, raw) in raw_stations {
        let key = key.to_lowercase();

        let mut words = default_words.clone();
        if let Some(table) = raw_stopwords.get(&key) {
            words.extend(table.words.iter().cloned());
        }

        let station = build_station(&key, raw, &words)?;
        debug!(
            "Loaded station '{}' ({}, {} stopwords, {} transformations)",
            station.name,
            station.strategy().name(),
            station.stopwords.word_count(),
            station.transformations.len()
        );

        for alias in &station.aliases {
            let alias = alias.to_lowercase();
            if let Some(previous) = registry.aliases.insert(alias.clone(), key.clone()) {
                warn!(
                    "Alias '{}' reassigned from station '{}' to '{}'",
                    alias, previous, key
                );
            }
        }
        registry.stations.insert(key, station);
    }

    Ok(registry)
}

fn build_station(key: &str, raw: RawStation, stopwords: &[String]) -> Result<StationConfig> {
    let name = raw.name.unwrap_or_else(|| key.to_string());
    let separator = raw
        .separator
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());

    let layout = if raw.positional {
        if raw.positions.is_empty() {
            return Err(Error::configuration(format!(
                "Station '{}' is positional but declares no positions",
                name
            )));
        }
        StationLayout::Positional(PositionalStrategy::new(raw.positions, separator.clone()))
    } else {
        let input_separator = raw.input_separator.unwrap_or_else(|| separator.clone());
        if input_separator.is_empty() {
            return Err(Error::configuration(format!(
                "Station '{}' has an empty input separator",
                name
            )));
        }
        StationLayout::Delimited(DelimitedStrategy::new(input_separator))
    };

    let transformations = raw
        .transformations
        .iter()
        .map(|t| {
            t.parse::<Transformation>()
                .map_err(|unknown| Error::unknown_transformation(&name, unknown))
        })
        .collect::<Result<Vec<_>>>()?;

    let field_roles = resolve_field_roles(&name, &raw.fields, &raw.headlines)?;

    for transformation in &transformations {
        for role in transformation.required_roles() {
            if !field_roles.contains_key(role) {
                return Err(Error::configuration(format!(
                    "Station '{}' uses '{}' but has no '{}' field",
                    name, transformation, role
                )));
            }
        }
    }

    let suffix_pattern = match &raw.title_suffix_pattern {
        Some(pattern) => format!("(?i){}", pattern),
        None => DEFAULT_TITLE_SUFFIX_PATTERN.to_string(),
    };
    let title_suffix = Regex::new(&suffix_pattern).map_err(|e| {
        Error::configuration(format!(
            "Station '{}' has an invalid title suffix pattern: {}",
            name, e
        ))
    })?;

    let skip_lines = raw
        .skip_lines
        .unwrap_or(if raw.has_headlines { 1 } else { 0 });

    Ok(StationConfig {
        key: key.to_string(),
        name,
        extensions: raw.extensions,
        aliases: raw.aliases,
        separator,
        skip_lines,
        convert: raw.convert,
        headlines: raw.headlines,
        transformations,
        fix_artist_title_split: raw.fix_artist_title_split,
        title_suffix,
        layout,
        field_roles,
        stopwords: StopwordMatcher::new(stopwords)?,
    })
}

/// Explicit `[fields]` indices win; other roles come from the header row
/// by exact name match.
fn resolve_field_roles(
    station: &str,
    explicit: &BTreeMap<String, usize>,
    headlines: &[String],
) -> Result<BTreeMap<FieldRole, usize>> {
    let mut roles = BTreeMap::new();

    for (name, index) in explicit {
        let role = name.parse::<FieldRole>().map_err(|e| {
            Error::configuration(format!("Station '{}' [fields]: {}", station, e))
        })?;
        roles.insert(role, *index);
    }

    for role in FieldRole::ALL {
        if roles.contains_key(&role) {
            continue;
        }
        if let Some(index) = header_index(role, headlines) {
            roles.insert(role, index);
        }
    }

    Ok(roles)
}

fn header_index(role: FieldRole, headlines: &[String]) -> Option<usize> {
    let candidates = match role {
        FieldRole::Title => field_headers::TITLE,
        FieldRole::Artist => field_headers::ARTIST,
        FieldRole::Duration => field_headers::DURATION,
        FieldRole::Date => field_headers::DATE,
        FieldRole::Time => field_headers::TIME,
    };
    candidates
        .iter()
        .find_map(|candidate| headlines.iter().position(|h| h == candidate))
}
