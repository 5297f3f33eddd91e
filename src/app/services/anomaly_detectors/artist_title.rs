//! Artist/title split repair
//!
//! Some stations export `Artist - Title` in the title column. Such lines are
//! grouped by their raw title and artist; fixing moves the prefix onto the
//! artist as `Artist-Prefix` and keeps the remainder as the title.

use super::{field_value, group_issues, lines_label, replace_fields};
use crate::Result;
use crate::app::models::{Decision, FieldRole, Issue, IssueKey};
use crate::app::services::decision_engine::{
    DecisionConfig, DecisionEngine, DecisionMemory, IssueHandler, Prompter, actions,
};
use crate::app::services::station_registry::StationConfig;
use crate::constants::DASH_SEPARATOR;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Compute the repaired `(title, artist)` pair, if the title carries a prefix
pub fn split_fix(title: &str, artist: &str) -> Option<(String, String)> {
    let (prefix, remainder) = title.split_once(DASH_SEPARATOR)?;
    Some((remainder.to_string(), format!("{}-{}", artist, prefix)))
}

/// Detector and handler for titles containing `" - "`
pub struct ArtistTitleFixer<'a> {
    station: &'a StationConfig,
    lines: &'a mut [String],
    fixed: usize,
}

impl<'a> ArtistTitleFixer<'a> {
    pub fn new(station: &'a StationConfig, lines: &'a mut [String]) -> Self {
        Self {
            station,
            lines,
            fixed: 0,
        }
    }

    /// Lines repaired so far
    pub fn fixed_count(&self) -> usize {
        self.fixed
    }

    /// Group candidate lines by raw title and artist.
    ///
    /// Blank lines and lines that will be dropped by a stopword are skipped.
    pub fn find_issues(&self) -> Vec<Issue> {
        if self.station.field_index(FieldRole::Title).is_none()
            || self.station.field_index(FieldRole::Artist).is_none()
        {
            debug!(
                "Station '{}' has no title/artist fields; skipping split check",
                self.station.name
            );
            return Vec::new();
        }

        let candidates = self.lines.iter().enumerate().filter_map(|(index, line)| {
            if line.trim().is_empty() || self.station.stopwords().matches(line) {
                return None;
            }
            let title = field_value(self.station, line, FieldRole::Title)?;
            let artist = field_value(self.station, line, FieldRole::Artist)?;
            title
                .contains(DASH_SEPARATOR)
                .then(|| (IssueKey::new([title, artist]), index))
        });

        group_issues(candidates)
    }

    /// Find split issues and resolve them through the engine
    pub fn run<P: Prompter>(
        mut self,
        engine: &mut DecisionEngine<P>,
        memory: &mut dyn DecisionMemory,
    ) -> Result<BTreeSet<usize>> {
        let issues = self.find_issues();
        if issues.is_empty() {
            return Ok(BTreeSet::new());
        }

        info!("Found {} possible artist/title splits", issues.len());
        let config = DecisionConfig::artist_title();
        let rejected = engine.process_issues(&config, &issues, &mut self, memory)?;

        info!(
            "Artist/title: {} lines fixed, {} rejected",
            self.fixed,
            rejected.len()
        );
        Ok(rejected)
    }
}

impl IssueHandler for ArtistTitleFixer<'_> {
    fn describe(&self, issue: &Issue) -> Vec<String> {
        let (title, artist) = (issue.key.part(0), issue.key.part(1));
        let mut description = vec![
            format!("Title:  {}", title),
            format!("Artist: {}", artist),
        ];
        if let Some((new_title, new_artist)) = split_fix(title, artist) {
            description.push(format!("Fixed:  {} / {}", new_title, new_artist));
        }
        description.push(format!("Affects {}", lines_label(issue.count())));
        description
    }

    fn apply(&mut self, decision: &Decision, issue: &Issue) -> BTreeSet<usize> {
        if decision.is(actions::REJECT) {
            return issue.indices.iter().copied().collect();
        }
        if !decision.is(actions::FIX) {
            return BTreeSet::new();
        }

        for &index in &issue.indices {
            let Some(line) = self.lines.get(index) else {
                continue;
            };
            let repaired = field_value(self.station, line, FieldRole::Title)
                .zip(field_value(self.station, line, FieldRole::Artist))
                .and_then(|(title, artist)| split_fix(title, artist))
                .and_then(|(title, artist)| {
                    replace_fields(
                        self.station,
                        line,
                        &[
                            (FieldRole::Title, title.as_str()),
                            (FieldRole::Artist, artist.as_str()),
                        ],
                    )
                });

            if let Some(repaired) = repaired {
                debug!(index, line = %repaired, "Fixed artist/title split");
                self.lines[index] = repaired;
                self.fixed += 1;
            }
        }

        BTreeSet::new()
    }
}
