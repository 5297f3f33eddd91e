//! Tests for the long playing time review

use super::*;
use crate::app::services::decision_engine::NoMemory;
use crate::app::services::field_formatter::FieldFormatter;

fn reviewer<'a>(
    station: &'a StationConfig,
    lines: &'a mut [String],
) -> LongPlayingTimeReviewer<'a> {
    LongPlayingTimeReviewer::new(station, lines, FieldFormatter::default(), 30)
}

#[test]
fn test_groups_by_title_artist_and_corrected_duration() {
    let station = test_station();
    let mut lines = lines(&[
        "230101;210000;45:00;Long;Band",
        "230101;220000;03:00;Short;Band",
        "230102;210000;45:00;Long;Band",
        "230103;210000;50:10;Long;Band",
    ]);

    let issues = reviewer(&station, &mut lines).find_issues();

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].key, IssueKey::new(["Long", "Band", "45:00"]));
    assert_eq!(issues[0].indices, vec![0, 2]);
    assert_eq!(issues[1].indices, vec![3]);
}

#[test]
fn test_overflow_is_repaired_before_review() {
    let station = test_station();
    // 1436:15 is 03:45 after the overflow repair
    let mut lines = lines(&[
        "230101;235900;1436:15;Song;Band",
        "230101;000000;009:15;Song;Band",
    ]);

    assert!(reviewer(&station, &mut lines).find_issues().is_empty());
}

#[test]
fn test_unrepairable_overflow_is_reviewed() {
    let station = test_station();
    let mut lines = lines(&["230101;235900;1500:00;Song;Band"]);

    let issues = reviewer(&station, &mut lines).find_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].key.part(2), "1500:00");
}

#[test]
fn test_edit_sets_playing_time_on_every_line() {
    let station = test_station();
    let mut lines = lines(&[
        "230101;210000;45:00;Long;Band",
        "230102;210000;45:00;Long;Band",
    ]);
    let mut engine = engine(&["e", "bad", "04:30"]);

    let rejected = reviewer(&station, &mut lines)
        .run(&mut engine, &mut NoMemory)
        .unwrap();

    assert!(rejected.is_empty());
    assert_eq!(engine.prompter().prompt_count(), 3);
    assert_eq!(lines[0], "230101;210000;04:30;Long;Band");
    assert_eq!(lines[1], "230102;210000;04:30;Long;Band");
}

#[test]
fn test_reject_returns_group_indices() {
    let station = test_station();
    let mut lines = lines(&[
        "230101;210000;03:00;Short;Band",
        "230101;220000;59:59;Long;Band",
    ]);
    let mut engine = engine(&["r"]);

    let rejected = reviewer(&station, &mut lines)
        .run(&mut engine, &mut NoMemory)
        .unwrap();

    assert_eq!(rejected, BTreeSet::from([1]));
}

#[test]
fn test_unparseable_duration_is_not_reviewed() {
    let station = test_station();
    let mut lines = lines(&[
        "230101;210000;long;Song;Band",
        "230101;210000;4500;Song;Band",
    ]);

    assert!(reviewer(&station, &mut lines).find_issues().is_empty());
}
