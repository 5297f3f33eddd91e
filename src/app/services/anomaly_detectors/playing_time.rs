//! Review of long playing times
//!
//! Durations are repaired for the midnight overflow first. Whatever is still
//! at or above the long playing time threshold is grouped by title, artist
//! and repaired duration, and the user may accept, reject or edit it.

use super::{field_value, group_issues, lines_label, replace_fields};
use crate::Result;
use crate::app::models::{Decision, FieldRole, Issue, IssueKey};
use crate::app::services::decision_engine::{
    DecisionConfig, DecisionEngine, DecisionMemory, IssueHandler, Prompter, actions,
};
use crate::app::services::field_formatter::{FieldFormatter, minutes_of};
use crate::app::services::station_registry::StationConfig;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Detector and handler for suspiciously long playing times
pub struct LongPlayingTimeReviewer<'a> {
    station: &'a StationConfig,
    lines: &'a mut [String],
    formatter: FieldFormatter,
    long_minutes: u32,
    edited: usize,
}

impl<'a> LongPlayingTimeReviewer<'a> {
    pub fn new(
        station: &'a StationConfig,
        lines: &'a mut [String],
        formatter: FieldFormatter,
        long_minutes: u32,
    ) -> Self {
        Self {
            station,
            lines,
            formatter,
            long_minutes,
            edited: 0,
        }
    }

    /// Lines whose playing time was edited so far
    pub fn edited_count(&self) -> usize {
        self.edited
    }

    /// Group lines whose repaired duration is at least the threshold
    pub fn find_issues(&self) -> Vec<Issue> {
        if self.station.field_index(FieldRole::Duration).is_none() {
            debug!(
                "Station '{}' has no playing time field; skipping review",
                self.station.name
            );
            return Vec::new();
        }

        let threshold = i64::from(self.long_minutes);
        let candidates = self.lines.iter().enumerate().filter_map(|(index, line)| {
            if line.trim().is_empty() {
                return None;
            }
            let raw = field_value(self.station, line, FieldRole::Duration)?;
            let corrected = self.formatter.fix_duration(raw);
            let minutes = minutes_of(&corrected)?;
            if minutes < threshold {
                return None;
            }

            let title = field_value(self.station, line, FieldRole::Title).unwrap_or("");
            let artist = field_value(self.station, line, FieldRole::Artist).unwrap_or("");
            Some((IssueKey::new([title, artist, corrected.as_str()]), index))
        });

        group_issues(candidates)
    }

    /// Find long playing times and resolve them through the engine
    pub fn run<P: Prompter>(
        mut self,
        engine: &mut DecisionEngine<P>,
        memory: &mut dyn DecisionMemory,
    ) -> Result<BTreeSet<usize>> {
        let issues = self.find_issues();
        if issues.is_empty() {
            return Ok(BTreeSet::new());
        }

        info!(
            "Found {} tracks with playing time of {} minutes or more",
            issues.len(),
            self.long_minutes
        );
        let config = DecisionConfig::long_playing_time();
        let rejected = engine.process_issues(&config, &issues, &mut self, memory)?;

        info!(
            "Long playing times: {} lines edited, {} rejected",
            self.edited,
            rejected.len()
        );
        Ok(rejected)
    }
}

impl IssueHandler for LongPlayingTimeReviewer<'_> {
    fn describe(&self, issue: &Issue) -> Vec<String> {
        vec![
            format!("Title:        {}", issue.key.part(0)),
            format!("Artist:       {}", issue.key.part(1)),
            format!("Playing time: {}", issue.key.part(2)),
            format!("Affects {}", lines_label(issue.count())),
        ]
    }

    fn apply(&mut self, decision: &Decision, issue: &Issue) -> BTreeSet<usize> {
        if decision.is(actions::REJECT) {
            return issue.indices.iter().copied().collect();
        }

        if let (true, Some(value)) = (decision.is(actions::EDIT), decision.value.as_deref()) {
            for &index in &issue.indices {
                let Some(line) = self.lines.get(index) else {
                    continue;
                };
                if let Some(edited) =
                    replace_fields(self.station, line, &[(FieldRole::Duration, value)])
                {
                    debug!(index, playing_time = value, "Edited playing time");
                    self.lines[index] = edited;
                    self.edited += 1;
                }
            }
        }

        BTreeSet::new()
    }
}
