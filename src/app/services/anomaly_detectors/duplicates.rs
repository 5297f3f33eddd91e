//! Duplicate broadcast detection
//!
//! A line is a duplicate when its lowercased title and artist and its raw
//! date were already seen at an earlier index. Depending on the configured
//! policy repeats are kept, rejected, or decided per group.

use super::{field_value, group_issues, lines_label};
use crate::Result;
use crate::app::models::{Decision, FieldRole, Issue, IssueKey};
use crate::app::services::decision_engine::{
    DecisionConfig, DecisionEngine, IssueHandler, NoMemory, Prompter, actions,
};
use crate::app::services::station_registry::StationConfig;
use crate::config::DuplicatePolicy;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Detector and handler for repeated broadcasts
pub struct DuplicateDetector<'a> {
    station: &'a StationConfig,
    lines: &'a [String],
    policy: DuplicatePolicy,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(station: &'a StationConfig, lines: &'a [String], policy: DuplicatePolicy) -> Self {
        Self {
            station,
            lines,
            policy,
        }
    }

    /// Groups of two or more lines sharing a duplicate key.
    ///
    /// Indices in `exclude` (already rejected) do not take part.
    pub fn find_issues(&self, exclude: &BTreeSet<usize>) -> Vec<Issue> {
        let candidates = self.lines.iter().enumerate().filter_map(|(index, line)| {
            if line.trim().is_empty() || exclude.contains(&index) {
                return None;
            }
            let title = field_value(self.station, line, FieldRole::Title)?;
            let artist = field_value(self.station, line, FieldRole::Artist)?;
            let date = field_value(self.station, line, FieldRole::Date).unwrap_or("");
            Some((
                IssueKey::new([
                    title.trim().to_lowercase(),
                    artist.trim().to_lowercase(),
                    date.trim().to_string(),
                ]),
                index,
            ))
        });

        group_issues(candidates)
            .into_iter()
            .filter(|issue| issue.count() > 1)
            .collect()
    }

    /// Apply the duplicate policy and return the rejected indices
    pub fn run<P: Prompter>(
        mut self,
        engine: &mut DecisionEngine<P>,
        exclude: &BTreeSet<usize>,
    ) -> Result<BTreeSet<usize>> {
        if self.policy == DuplicatePolicy::Keep {
            debug!("Duplicate policy is keep; nothing to check");
            return Ok(BTreeSet::new());
        }

        let issues = self.find_issues(exclude);
        if issues.is_empty() {
            return Ok(BTreeSet::new());
        }

        let repeats: usize = issues.iter().map(|issue| issue.count() - 1).sum();
        info!(
            "Found {} duplicate groups ({} repeated lines)",
            issues.len(),
            repeats
        );

        let rejected = match self.policy {
            DuplicatePolicy::Reject => {
                let decision = Decision::new(actions::REJECT);
                issues
                    .iter()
                    .flat_map(|issue| self.apply(&decision, issue))
                    .collect()
            }
            _ => {
                let config = DecisionConfig::duplicate();
                engine.process_issues(&config, &issues, &mut self, &mut NoMemory)?
            }
        };

        info!("Duplicates: {} lines rejected", rejected.len());
        Ok(rejected)
    }
}

impl IssueHandler for DuplicateDetector<'_> {
    fn describe(&self, issue: &Issue) -> Vec<String> {
        let mut description = vec![format!(
            "\"{}\" by {} on {}",
            issue.key.part(0),
            issue.key.part(1),
            issue.key.part(2)
        )];
        for &index in &issue.indices {
            if let Some(line) = self.lines.get(index) {
                description.push(format!("  {:>6}: {}", index + 1, line));
            }
        }
        description.push(format!("Affects {}", lines_label(issue.count())));
        description
    }

    /// Rejecting keeps the first occurrence of each group
    fn apply(&mut self, decision: &Decision, issue: &Issue) -> BTreeSet<usize> {
        if decision.is(actions::REJECT) {
            issue.indices.iter().skip(1).copied().collect()
        } else {
            BTreeSet::new()
        }
    }
}
