//! Fixtures for end-to-end pipeline tests

use super::*;
use crate::app::services::decision_engine::ScriptedPrompter;
use crate::app::services::station_registry::StationRegistry;
use std::fs;
use tempfile::TempDir;


pub const TEST_STATIONS: &str = r#"
[test]
name = "Test"
extensions = [".txt"]
separator = ";"
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]

[pruned]
name = "Pruned"
extensions = [".txt"]
separator = ";"
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist", "DELETE"]

[podcast]
name = "Podcast"
extensions = [".txt"]
separator = ";"
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist", "Podcast only"]

[comma]
name = "Comma"
extensions = [".txt"]
separator = ";"
input_separator = ","
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]
"#;

pub const TEST_STOPWORDS: &str = r#"
[default]
words = ["jingle"]
"#;

/// Week of broadcasts with one split title and one jingle
pub const WEEK: &str = "\
230101;210000;009:15;Track - Remix;Artist
230101;211500;00:20;Jingle Bells;Promo Team
230102;093000;04:00;Song;Singer
";

pub fn station(key: &str) -> StationConfig {
    let registry = StationRegistry::from_toml_str(TEST_STATIONS, TEST_STOPWORDS).unwrap();
    registry.get(key).unwrap().clone()
}

pub fn settings() -> Settings {
    Settings::default().without_backup().without_log_file()
}

/// Input and output directories for one test run
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("in")).unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join("in").join(name), contents).unwrap();
        }
        Self { dir }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.dir.path().join("in")
    }

    pub fn output_file(&self) -> PathBuf {
        self.dir.path().join("out").join("report.csv")
    }

    pub fn options(&self) -> RunOptions {
        RunOptions::new(self.input_dir(), self.output_file())
    }

    pub fn reject_file(&self, station: &str) -> PathBuf {
        self.dir
            .path()
            .join("out")
            .join("rejected")
            .join(output::reject_file_name(station, Local::now().date_naive()))
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

/// Run the pipeline once and hand back the prompter for inspection
pub fn run_with(
    station: &StationConfig,
    settings: &Settings,
    store: &mut ChoiceStore,
    prompter: ScriptedPrompter,
    options: RunOptions,
) -> (Result<ProcessingStats>, ScriptedPrompter) {
    let mut pipeline = Pipeline::new(station, settings, store, prompter, options);
    let result = pipeline.run();
    (result, pipeline.engine.into_prompter())
}
