//! Tests for station loading and validation

use super::*;
use crate::Error;
use crate::app::models::FieldRole;
use crate::app::services::line_transformer::Transformation;
use tempfile::TempDir;

#[test]
fn test_load_from_dir() {
    let temp_dir = TempDir::new().unwrap();
    write_test_config(temp_dir.path()).unwrap();

    let registry = StationRegistry::load(temp_dir.path()).unwrap();
    assert_eq!(registry.station_count(), 3);
}

#[test]
fn test_load_from_dir_without_stations_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = StationRegistry::load(temp_dir.path());
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_load_from_dir_without_stopwords_file_has_no_stopwords() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("stations.toml"), TEST_STATIONS).unwrap();

    let registry = StationRegistry::load(temp_dir.path()).unwrap();
    let globus = registry.get("globus").unwrap();
    assert!(globus.stopwords().is_empty());
}

#[test]
fn test_skip_lines_defaults_from_has_headlines() {
    let registry = test_registry();
    assert_eq!(registry.get("globus").unwrap().skip_lines, 1);
    assert_eq!(registry.get("radio4").unwrap().skip_lines, 0);
    assert_eq!(registry.get("bauer").unwrap().skip_lines, 2);
}

#[test]
fn test_positional_station_sorts_positions() {
    let registry = test_registry();
    let bauer = registry.get("bauer").unwrap();

    assert!(bauer.is_positional());
    assert_eq!(bauer.field_separator(), ";");
    assert_eq!(bauer.strategy().extract("230101210000 03:45"), "230101;210000;03:45");
}

#[test]
fn test_delimited_station_uses_input_separator() {
    let registry = test_registry();
    let radio4 = registry.get("radio4").unwrap();

    assert!(!radio4.is_positional());
    assert_eq!(radio4.field_separator(), ",");
    assert_eq!(radio4.separator, ";");
}

#[test]
fn test_field_roles_derived_from_headlines() {
    let registry = test_registry();
    let globus = registry.get("globus").unwrap();

    assert_eq!(globus.field_index(FieldRole::Date), Some(0));
    assert_eq!(globus.field_index(FieldRole::Time), Some(1));
    assert_eq!(globus.field_index(FieldRole::Duration), Some(2));
    assert_eq!(globus.field_index(FieldRole::Title), Some(3));
    assert_eq!(globus.field_index(FieldRole::Artist), Some(4));
}

#[test]
fn test_explicit_fields_override_headlines() {
    let stations = r#"
[s]
headlines = ["Date", "Track Title", "Main Artist"]

[s.fields]
title = 5
"#;
    let registry = StationRegistry::from_toml_str(stations, "").unwrap();
    let station = registry.get("s").unwrap();

    assert_eq!(station.field_index(FieldRole::Title), Some(5));
    assert_eq!(station.field_index(FieldRole::Artist), Some(2));
    assert_eq!(station.field_index(FieldRole::Duration), None);
}

#[test]
fn test_stopwords_merge_default_and_station_tables() {
    let registry = test_registry();

    let globus = registry.get("globus").unwrap();
    assert_eq!(globus.stopwords().word_count(), 3);
    assert!(globus.stopwords().matches("GLOBUS NEWS at noon"));
    assert!(globus.stopwords().matches("station jingle"));

    let radio4 = registry.get("radio4").unwrap();
    assert_eq!(radio4.stopwords().word_count(), 2);
    assert!(!radio4.stopwords().matches("globus news"));
}

#[test]
fn test_transformations_are_parsed() {
    let registry = test_registry();
    let globus = registry.get("globus").unwrap();
    assert_eq!(
        globus.transformations,
        vec![Transformation::ReplaceDashSeparator]
    );
}

#[test]
fn test_unknown_transformation_is_a_load_error() {
    let stations = r#"
[s]
transformations = ["replace_dash_separator", "make_it_better"]
"#;
    let err = StationRegistry::from_toml_str(stations, "").unwrap_err();
    match err {
        Error::UnknownTransformation { station, name } => {
            assert_eq!(station, "s");
            assert_eq!(name, "make_it_better");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_title_suffix_requires_title_field() {
    let stations = r#"
[s]
headlines = ["Date"]
transformations = ["remove_title_suffix"]
"#;
    let err = StationRegistry::from_toml_str(stations, "").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_positional_without_positions_is_rejected() {
    let stations = r#"
[s]
positional = true
"#;
    let err = StationRegistry::from_toml_str(stations, "").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_unknown_station_key_is_rejected() {
    let stations = r#"
[s]
colour = "blue"
"#;
    let err = StationRegistry::from_toml_str(stations, "").unwrap_err();
    assert!(matches!(err, Error::TomlParse { .. }));
}

#[test]
fn test_custom_title_suffix_pattern_is_case_insensitive() {
    let stations = r#"
[s]
headlines = ["Track Title"]
title_suffix_pattern = '\s*- reklame$'
"#;
    let registry = StationRegistry::from_toml_str(stations, "").unwrap();
    let station = registry.get("s").unwrap();
    assert_eq!(station.title_suffix.replace("Spot - REKLAME", ""), "Spot");
}
