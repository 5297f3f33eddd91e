//! Test fixtures for the anomaly detectors

use super::*;
use crate::app::services::decision_engine::{DecisionEngine, ScriptedPrompter};
use crate::app::services::station_registry::StationRegistry;
use std::collections::BTreeSet;

pub mod multi_year_tests;
pub mod playing_time_tests;

/// Delimited station: Date;Time;Playing Time;Track Title;Main Artist
pub const TEST_STATION: &str = r#"
[test]
name = "Test"
extensions = [".txt"]
separator = ";"
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]
"#;

pub const TEST_STOPWORDS: &str = r#"
[default]
words = ["jingle"]
"#;

pub fn test_station() -> StationConfig {
    let registry = StationRegistry::from_toml_str(TEST_STATION, TEST_STOPWORDS).unwrap();
    registry.get("test").unwrap().clone()
}

pub fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

pub fn engine(responses: &[&str]) -> DecisionEngine<ScriptedPrompter> {
    DecisionEngine::new(ScriptedPrompter::new(responses.iter().copied()))
}
