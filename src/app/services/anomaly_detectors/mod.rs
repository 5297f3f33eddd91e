//! Anomaly detectors for broadcast lines
//!
//! Each detector scans the working line list, groups suspicious lines by a
//! key so identical anomalies are decided once, and hands the groups to the
//! [`DecisionEngine`](crate::app::services::decision_engine::DecisionEngine).
//!
//! # Detectors
//!
//! - [`artist_title`] - titles that still carry an `Artist - ` prefix
//! - [`multi_year`] - broadcasts spread over more than one year
//! - [`playing_time`] - playing times that are too long, after overflow repair
//! - [`duplicates`] - the same track on the same date more than once
//!
//! All detectors address lines by their index in the list they were given.

use crate::app::models::{FieldRole, Issue, IssueKey};
use crate::app::services::station_registry::StationConfig;
use std::collections::HashMap;

pub mod artist_title;
pub mod duplicates;
pub mod multi_year;
pub mod playing_time;

#[cfg(test)]
pub mod tests;

pub use artist_title::ArtistTitleFixer;
pub use duplicates::DuplicateDetector;
pub use multi_year::{MultiYearFilter, YearFilterOutcome};
pub use playing_time::LongPlayingTimeReviewer;

/// Value of a role's field in a working line
pub fn field_value<'a>(
    station: &StationConfig,
    line: &'a str,
    role: FieldRole,
) -> Option<&'a str> {
    let index = station.field_index(role)?;
    line.split(station.field_separator()).nth(index)
}

/// Rewrite role fields of a working line.
///
/// Returns `None` when the line has no column for one of the roles.
pub fn replace_fields(
    station: &StationConfig,
    line: &str,
    updates: &[(FieldRole, &str)],
) -> Option<String> {
    let separator = station.field_separator();
    let mut fields: Vec<&str> = line.split(separator).collect();

    for (role, value) in updates {
        let index = station.field_index(*role)?;
        let field = fields.get_mut(index)?;
        *field = *value;
    }

    Some(fields.join(separator))
}

/// Group `(key, index)` pairs into issues, ordered by first appearance
pub fn group_issues<I>(pairs: I) -> Vec<Issue>
where
    I: IntoIterator<Item = (IssueKey, usize)>,
{
    let mut positions: HashMap<IssueKey, usize> = HashMap::new();
    let mut issues: Vec<Issue> = Vec::new();

    for (key, index) in pairs {
        match positions.get(&key) {
            Some(&position) => issues[position].indices.push(index),
            None => {
                positions.insert(key.clone(), issues.len());
                issues.push(Issue::new(key, vec![index]));
            }
        }
    }

    issues
}

/// Line count with the right plural, for issue descriptions
pub(crate) fn lines_label(count: usize) -> String {
    if count == 1 {
        "1 line".to_string()
    } else {
        format!("{} lines", count)
    }
}
