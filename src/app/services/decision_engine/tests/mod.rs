//! Test fixtures for the decision engine

use super::*;
use crate::app::models::{Decision, Issue, IssueKey};
use std::collections::{BTreeMap, BTreeSet};

pub mod engine_tests;

/// Handler recording every applied decision; rejects all indices on "reject"
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub applied: Vec<(IssueKey, Decision)>,
}

impl IssueHandler for RecordingHandler {
    fn describe(&self, issue: &Issue) -> Vec<String> {
        vec![format!("{} ({} lines)", issue.key, issue.count())]
    }

    fn apply(&mut self, decision: &Decision, issue: &Issue) -> BTreeSet<usize> {
        self.applied.push((issue.key.clone(), decision.clone()));
        if decision.is(actions::REJECT) {
            issue.indices.iter().copied().collect()
        } else {
            BTreeSet::new()
        }
    }
}

/// In-memory decision memory
#[derive(Debug, Default)]
pub struct MapMemory {
    pub decisions: BTreeMap<IssueKey, Decision>,
}

impl DecisionMemory for MapMemory {
    fn recall(&self, key: &IssueKey) -> Option<Decision> {
        self.decisions.get(key).cloned()
    }

    fn remember(&mut self, key: &IssueKey, decision: &Decision) {
        self.decisions.insert(key.clone(), decision.clone());
    }
}

pub fn issue(title: &str, artist: &str, indices: &[usize]) -> Issue {
    Issue::new(IssueKey::new([title, artist]), indices.to_vec())
}
