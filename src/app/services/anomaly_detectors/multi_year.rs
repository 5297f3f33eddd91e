//! Year filter for runs spanning several years
//!
//! Unlike the other detectors this one removes lines from the working list.
//! The returned [`YearFilterOutcome`] maps old indices to new ones so that
//! rejections decided earlier can follow the lines that survive.

use super::{field_value, lines_label};
use crate::Result;
use crate::app::models::{Decision, FieldRole, Issue, IssueKey};
use crate::app::services::decision_engine::{
    DecisionConfig, DecisionEngine, IssueHandler, NoMemory, Prompter, actions,
};
use crate::app::services::field_formatter::year_of;
use crate::app::services::station_registry::StationConfig;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Result of running the year filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFilterOutcome {
    /// Year the user chose to keep; `None` keeps everything
    pub kept_year: Option<u32>,
    pub removed: usize,
    /// New index of every old line, `None` for removed lines
    pub index_map: Vec<Option<usize>>,
}

impl YearFilterOutcome {
    fn unchanged(len: usize) -> Self {
        Self {
            kept_year: None,
            removed: 0,
            index_map: (0..len).map(Some).collect(),
        }
    }

    /// Translate old indices to new ones, dropping removed lines
    pub fn remap(&self, indices: &BTreeSet<usize>) -> BTreeSet<usize> {
        indices
            .iter()
            .filter_map(|&old| self.index_map.get(old).copied().flatten())
            .collect()
    }
}

/// Detector and handler for multi-year line lists
pub struct MultiYearFilter<'a> {
    station: &'a StationConfig,
    counts: BTreeMap<u32, usize>,
    chosen: Option<u32>,
}

impl<'a> MultiYearFilter<'a> {
    pub fn new(station: &'a StationConfig) -> Self {
        Self {
            station,
            counts: BTreeMap::new(),
            chosen: None,
        }
    }

    fn year_of_line(&self, line: &str) -> Option<u32> {
        field_value(self.station, line, FieldRole::Date).and_then(year_of)
    }

    /// Lines per broadcast year; lines without a readable date are not counted
    pub fn year_counts(&self, lines: &[String]) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for line in lines {
            if let Some(year) = self.year_of_line(line) {
                *counts.entry(year).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Ask which year to keep when more than one is present, and drop every
    /// line of any other year
    pub fn run<P: Prompter>(
        mut self,
        lines: &mut Vec<String>,
        engine: &mut DecisionEngine<P>,
    ) -> Result<YearFilterOutcome> {
        if self.station.field_index(FieldRole::Date).is_none() {
            debug!(
                "Station '{}' has no date field; skipping year check",
                self.station.name
            );
            return Ok(YearFilterOutcome::unchanged(lines.len()));
        }

        self.counts = self.year_counts(lines);
        if self.counts.len() <= 1 {
            return Ok(YearFilterOutcome::unchanged(lines.len()));
        }

        info!("Found lines from {} different years", self.counts.len());

        let years: Vec<u32> = self.counts.keys().copied().collect();
        let dated: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.year_of_line(line).is_some())
            .map(|(index, _)| index)
            .collect();
        let issue = Issue::new(IssueKey::new(years.iter().map(u32::to_string)), dated);

        let config = DecisionConfig::multi_year(&years);
        engine.process_issues(&config, &[issue], &mut self, &mut NoMemory)?;

        let Some(kept) = self.chosen else {
            return Ok(YearFilterOutcome::unchanged(lines.len()));
        };

        let mut index_map = Vec::with_capacity(lines.len());
        let mut retained = Vec::new();
        for line in lines.drain(..) {
            if self.year_of_line(&line) == Some(kept) {
                index_map.push(Some(retained.len()));
                retained.push(line);
            } else {
                index_map.push(None);
            }
        }
        let removed = index_map.len() - retained.len();
        *lines = retained;

        info!(year = kept, removed, "Kept lines from a single year");
        Ok(YearFilterOutcome {
            kept_year: Some(kept),
            removed,
            index_map,
        })
    }
}

impl IssueHandler for MultiYearFilter<'_> {
    fn describe(&self, _issue: &Issue) -> Vec<String> {
        let total: usize = self.counts.values().sum();
        self.counts
            .iter()
            .map(|(year, &count)| {
                let percent = if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                };
                format!("{}: {} ({:.1}%)", year, lines_label(count), percent)
            })
            .collect()
    }

    fn apply(&mut self, decision: &Decision, _issue: &Issue) -> BTreeSet<usize> {
        if decision.is(actions::KEEP_YEAR) {
            self.chosen = decision.value.as_deref().and_then(|v| v.parse().ok());
        }
        BTreeSet::new()
    }
}
