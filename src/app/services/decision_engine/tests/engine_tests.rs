//! Tests for the engine driver loop

use super::*;

#[test]
fn test_prompts_once_per_issue_not_per_line() {
    let config = DecisionConfig::artist_title();
    let issues = vec![
        issue("A - x", "Band", &[0, 1, 2, 3]),
        issue("B - y", "Band", &[4, 5]),
        issue("C - z", "Band", &[6]),
    ];
    let mut handler = RecordingHandler::default();
    let mut memory = MapMemory::default();
    let mut engine = DecisionEngine::new(ScriptedPrompter::new(["y", "n", "x"]));

    let rejected = engine
        .process_issues(&config, &issues, &mut handler, &mut memory)
        .unwrap();

    assert_eq!(engine.prompter().prompt_count(), 3);
    assert_eq!(rejected, BTreeSet::from([6]));
    assert_eq!(handler.applied.len(), 3);
    assert_eq!(memory.decisions.len(), 3);
}

#[test]
fn test_second_run_with_remembered_keys_prompts_zero_times() {
    let config = DecisionConfig::long_playing_time();
    let issues = vec![
        Issue::new(IssueKey::new(["Long", "Band", "45:00"]), vec![0, 2]),
        Issue::new(IssueKey::new(["Other", "Band", "50:00"]), vec![1]),
    ];
    let mut memory = MapMemory::default();

    let mut first = DecisionEngine::new(ScriptedPrompter::new(["e", "04:30", "r"]));
    let rejected = first
        .process_issues(&config, &issues, &mut RecordingHandler::default(), &mut memory)
        .unwrap();
    assert_eq!(rejected, BTreeSet::from([1]));

    let mut second = DecisionEngine::new(ScriptedPrompter::new(Vec::<String>::new()));
    let mut handler = RecordingHandler::default();
    let rejected = second
        .process_issues(&config, &issues, &mut handler, &mut memory)
        .unwrap();

    assert_eq!(second.prompter().prompt_count(), 0);
    assert_eq!(rejected, BTreeSet::from([1]));
    assert_eq!(
        handler.applied[0].1,
        Decision::with_value(actions::EDIT, "04:30")
    );
}

#[test]
fn test_no_memory_never_recalls() {
    let config = DecisionConfig::duplicate();
    let issues = vec![issue("Song", "Band", &[0, 4])];
    let mut engine = DecisionEngine::new(ScriptedPrompter::new(["r", "r"]));

    for _ in 0..2 {
        engine
            .process_issues(
                &config,
                &issues,
                &mut RecordingHandler::default(),
                &mut NoMemory,
            )
            .unwrap();
    }

    assert_eq!(engine.prompter().prompt_count(), 2);
}

#[test]
fn test_exhausted_prompter_is_an_error() {
    let config = DecisionConfig::artist_title();
    let issues = vec![issue("A - x", "Band", &[0])];
    let mut engine = DecisionEngine::new(ScriptedPrompter::new(Vec::<String>::new()));

    let result = engine.process_issues(
        &config,
        &issues,
        &mut RecordingHandler::default(),
        &mut NoMemory,
    );
    assert!(matches!(result, Err(crate::Error::Prompt { .. })));
}

#[test]
fn test_accepting_defaults_resolves_every_issue() {
    let config = DecisionConfig::artist_title();
    let issues = vec![issue("A - x", "Band", &[0]), issue("B - y", "Band", &[1])];
    let mut handler = RecordingHandler::default();
    let mut engine = DecisionEngine::new(ScriptedPrompter::accepting_defaults());

    let rejected = engine
        .process_issues(&config, &issues, &mut handler, &mut NoMemory)
        .unwrap();

    assert!(rejected.is_empty());
    assert!(handler.applied.iter().all(|(_, d)| d.is(actions::FIX)));
}

#[test]
fn test_automatic_answers_are_not_remembered() {
    let config = DecisionConfig::artist_title();
    let issues = vec![issue("A - x", "Band", &[0]), issue("B - y", "Band", &[1])];
    let mut memory = MapMemory::default();
    let mut engine = DecisionEngine::new(ScriptedPrompter::accepting_defaults());

    engine
        .process_issues(&config, &issues, &mut RecordingHandler::default(), &mut memory)
        .unwrap();

    assert_eq!(engine.prompter().choice_prompt_count(), 2);
    assert!(memory.decisions.is_empty());

    let mut interactive = DecisionEngine::new(ScriptedPrompter::new(["", ""]));
    interactive
        .process_issues(&config, &issues, &mut RecordingHandler::default(), &mut memory)
        .unwrap();
    assert_eq!(interactive.prompter().choice_prompt_count(), 2);
    assert_eq!(memory.decisions.len(), 2);
}

#[test]
fn test_retries_do_not_count_as_new_issues() {
    let config = DecisionConfig::artist_title();
    let issues = vec![issue("A - x", "Band", &[0])];
    let mut engine = DecisionEngine::new(ScriptedPrompter::new(["?", "maybe", "y"]));

    engine
        .process_issues(
            &config,
            &issues,
            &mut RecordingHandler::default(),
            &mut NoMemory,
        )
        .unwrap();

    assert_eq!(engine.prompter().prompt_count(), 3);
    assert_eq!(engine.prompter().choice_prompt_count(), 1);
}
