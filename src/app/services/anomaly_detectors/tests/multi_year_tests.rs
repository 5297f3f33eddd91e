//! Tests for the multi-year filter

use super::*;

fn mixed_years() -> Vec<String> {
    let mut raw = Vec::new();
    for i in 0..10 {
        let date = if [1, 4, 8].contains(&i) { "231231" } else { "240101" };
        raw.push(format!("{};21000{};03:00;Song {};Band", date, i, i));
    }
    raw
}

#[test]
fn test_year_counts() {
    let station = test_station();
    let counts = MultiYearFilter::new(&station).year_counts(&mixed_years());
    assert_eq!(counts.get(&2023), Some(&3));
    assert_eq!(counts.get(&2024), Some(&7));
}

#[test]
fn test_keeping_one_year_retains_order() {
    let station = test_station();
    let mut working = mixed_years();
    let expected: Vec<String> = working
        .iter()
        .filter(|line| line.starts_with("240101"))
        .cloned()
        .collect();
    let mut engine = engine(&["2"]);

    let outcome = MultiYearFilter::new(&station)
        .run(&mut working, &mut engine)
        .unwrap();

    assert_eq!(outcome.kept_year, Some(2024));
    assert_eq!(outcome.removed, 3);
    assert_eq!(working.len(), 7);
    assert_eq!(working, expected);
}

#[test]
fn test_keep_all_changes_nothing() {
    let station = test_station();
    let mut working = mixed_years();
    let original = working.clone();
    let mut engine = engine(&["k"]);

    let outcome = MultiYearFilter::new(&station)
        .run(&mut working, &mut engine)
        .unwrap();

    assert_eq!(outcome.kept_year, None);
    assert_eq!(working, original);
}

#[test]
fn test_single_year_does_not_prompt() {
    let station = test_station();
    let mut working = lines(&["240101;210000;03:00;A;B", "240102;210000;03:00;C;D"]);
    let mut engine = engine(&[]);

    let outcome = MultiYearFilter::new(&station)
        .run(&mut working, &mut engine)
        .unwrap();

    assert_eq!(engine.prompter().prompt_count(), 0);
    assert_eq!(outcome.removed, 0);
}

#[test]
fn test_prompt_shows_counts_and_percentages() {
    let station = test_station();
    let mut working = mixed_years();
    let mut engine = engine(&["k"]);

    MultiYearFilter::new(&station)
        .run(&mut working, &mut engine)
        .unwrap();

    let prompt = &engine.prompter().asked()[0];
    assert_eq!(
        prompt.context,
        vec![
            "2023: 3 lines (30.0%)".to_string(),
            "2024: 7 lines (70.0%)".to_string()
        ]
    );
}

#[test]
fn test_remap_moves_rejections_to_new_indices() {
    let station = test_station();
    let mut working = mixed_years();
    let mut engine = engine(&["2024"]);

    let outcome = MultiYearFilter::new(&station)
        .run(&mut working, &mut engine)
        .unwrap();

    // Old 1 and 4 were 2023 lines; old 5 is the fourth surviving line
    let remapped = outcome.remap(&BTreeSet::from([1, 4, 5]));
    assert_eq!(remapped, BTreeSet::from([3]));
}
