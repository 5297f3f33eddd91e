//! Integration tests running the pipeline against files on disk

use komm_fmt::Settings;
use komm_fmt::app::services::choice_store::{ChoiceStore, ChoiceTable};
use komm_fmt::app::services::decision_engine::ScriptedPrompter;
use komm_fmt::app::services::pipeline::{Pipeline, RunOptions};
use komm_fmt::app::services::station_registry::StationRegistry;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STATIONS: &str = r#"
[globus]
name = "Globus"
extensions = [".txt"]
aliases = ["gr"]
has_headlines = true
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]

[bauer]
name = "Bauer"
extensions = [".dat"]
positional = true
positions = [6, 12, 18, 30, 50]
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]
"#;

const STOPWORDS: &str = r#"
[default]
words = ["Jingle"]

[globus]
words = ["Globus Nyheder"]
"#;

fn registry() -> StationRegistry {
    StationRegistry::from_toml_str(STATIONS, STOPWORDS).unwrap()
}

fn settings() -> Settings {
    Settings::default().without_backup().without_log_file()
}

fn write_input(dir: &Path, name: &str, contents: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_remembered_choices_survive_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("out").join("week.csv");
    let choices = temp_dir.path().join("config").join("remembered_choices.toml");
    write_input(
        &input,
        "week.txt",
        "Date;Time;Playing Time;Track Title;Main Artist\n\
         230105;101500;1439:00;Morning - Radio;Host\n\
         230105;104500;55:00;Long Set;DJ\n\
         230105;110000;00:15;Globus Nyheder;Studio\n",
    );

    let registry = registry();
    let station = registry.get("GR").unwrap();
    let settings = settings();

    {
        let mut store = ChoiceStore::open(&choices, true);
        let mut pipeline = Pipeline::new(
            station,
            &settings,
            &mut store,
            ScriptedPrompter::new(["y", "a"]),
            RunOptions::new(&input, &output),
        );
        let stats = pipeline.run().unwrap();
        assert_eq!(pipeline.prompter().choice_prompt_count(), 2);
        assert_eq!(stats.lines_processed, 2);
        assert_eq!(stats.lines_rejected, 1);
    }

    let first = fs::read_to_string(&output).unwrap();
    assert!(first.contains("05-01-2023;10:15:00;01:00;Radio;Host-Morning"));
    assert!(first.contains("05-01-2023;10:45:00;55:00;Long Set;DJ"));
    assert!(choices.exists());

    let mut store = ChoiceStore::open(&choices, true);
    assert_eq!(store.len(ChoiceTable::ArtistTitleFixes), 1);
    assert_eq!(store.len(ChoiceTable::LongPlayingTimes), 1);

    let mut pipeline = Pipeline::new(
        station,
        &settings,
        &mut store,
        ScriptedPrompter::new(Vec::<String>::new()),
        RunOptions::new(&input, &output),
    );
    pipeline.run().unwrap();
    assert_eq!(pipeline.prompter().prompt_count(), 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), first);
}

#[test]
fn test_disabled_store_prompts_every_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("week.csv");
    let choices = temp_dir.path().join("remembered_choices.toml");
    write_input(
        &input,
        "week.txt",
        "header\n230105;101500;03:00;Morning - Radio;Host\n",
    );

    let registry = registry();
    let station = registry.get("globus").unwrap();
    let settings = settings();

    for _ in 0..2 {
        let mut store = ChoiceStore::open(&choices, false);
        let mut pipeline = Pipeline::new(
            station,
            &settings,
            &mut store,
            ScriptedPrompter::new(["n"]),
            RunOptions::new(&input, &output),
        );
        pipeline.run().unwrap();
        assert_eq!(pipeline.prompter().choice_prompt_count(), 1);
    }
    assert!(!choices.exists());
}

#[test]
fn test_positional_station_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    let output = temp_dir.path().join("bauer.csv");
    write_input(
        &input,
        "week.dat",
        "230105101500003:10Song        Band\n\
         230106111500004:00Jingle      Station\n",
    );

    let registry = registry();
    let station = registry.get("bauer").unwrap();
    let settings = settings();
    let mut store = ChoiceStore::in_memory();

    let mut pipeline = Pipeline::new(
        station,
        &settings,
        &mut store,
        ScriptedPrompter::accepting_defaults(),
        RunOptions::new(&input, &output),
    );
    let stats = pipeline.run().unwrap();

    assert_eq!(stats.lines_processed, 1);
    assert_eq!(stats.lines_rejected, 1);
    let report = fs::read_to_string(&output).unwrap();
    assert_eq!(
        report,
        "Date;Time;Playing Time;Track Title;Main Artist\n\
         05-01-2023;101500;003:10;Song;Band\n"
    );
}
