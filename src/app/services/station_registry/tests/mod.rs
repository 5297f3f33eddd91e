//! Shared test utilities and fixtures for station registry tests

use super::StationRegistry;
use std::fs;
use std::path::Path;

pub mod loader_tests;

/// Station definitions covering both layouts
pub const TEST_STATIONS: &str = r#"
[globus]
name = "Globus"
extensions = [".txt", "_globus.csv"]
aliases = ["globusradio", "gr"]
has_headlines = true
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]
transformations = ["replace_dash_separator"]

[bauer]
name = "Bauer"
extensions = [".dat"]
aliases = ["100fm"]
positional = true
positions = [18, 6, 12]
headlines = ["Date", "Time", "Playing Time"]
skip_lines = 2

[radio4]
name = "Radio4"
extensions = [".csv"]
input_separator = ","
headlines = ["Date", "Time", "Playing Time", "Title", "Artist"]
fix_artist_title_split = false

[radio4.fields]
title = 3
artist = 4
"#;

/// Stopwords with a default table and one station table
pub const TEST_STOPWORDS: &str = r#"
[default]
words = ["Jingle", "Promo"]

[globus]
words = ["Globus News"]
"#;

/// Registry built from the inline fixtures
pub fn test_registry() -> StationRegistry {
    StationRegistry::from_toml_str(TEST_STATIONS, TEST_STOPWORDS).unwrap()
}

/// Write the fixtures into a configuration directory
pub fn write_test_config(dir: &Path) -> std::io::Result<()> {
    fs::write(dir.join("stations.toml"), TEST_STATIONS)?;
    fs::write(dir.join("stopwords.toml"), TEST_STOPWORDS)?;
    Ok(())
}
