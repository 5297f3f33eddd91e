//! Core data models for broadcast-metadata normalization
//!
//! This module contains the value types shared by the detectors, the
//! decision engine and the pipeline: issue keys and their fingerprints,
//! decisions, semantic field roles and run statistics.

use crate::constants::FINGERPRINT_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Semantic role of a field within a station's line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Title,
    Artist,
    Duration,
    Date,
    Time,
}

impl FieldRole {
    /// All roles in a stable order
    pub const ALL: [FieldRole; 5] = [
        FieldRole::Title,
        FieldRole::Artist,
        FieldRole::Duration,
        FieldRole::Date,
        FieldRole::Time,
    ];

    /// Configuration name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Title => "title",
            FieldRole::Artist => "artist",
            FieldRole::Duration => "duration",
            FieldRole::Date => "date",
            FieldRole::Time => "time",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown field role '{}'", s))
    }
}

/// Discriminating field values shared by every line of one issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueKey(Vec<String>);

impl IssueKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn part(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }

    /// Deterministic persistence key for this issue.
    ///
    /// Backslashes and separator characters inside components are escaped
    /// before joining, so two different keys never share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let escaped: Vec<String> = self
            .0
            .iter()
            .map(|part| {
                part.replace('\\', "\\\\")
                    .replace(FINGERPRINT_SEPARATOR, "\\u001f")
            })
            .collect();
        escaped.join(&FINGERPRINT_SEPARATOR.to_string())
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [title, artist] => write!(f, "\"{}\" by {}", title, artist),
            [title, artist, extra] => write!(f, "\"{}\" by {} ({})", title, artist, extra),
            parts => write!(f, "{}", parts.join(", ")),
        }
    }
}

/// A group of mechanically identical anomalies, resolved once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: IssueKey,

    /// Line indices sharing the key, in ascending order
    pub indices: Vec<usize>,
}

impl Issue {
    pub fn new(key: IssueKey, indices: Vec<usize>) -> Self {
        Self { key, indices }
    }

    /// Number of affected lines
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Outcome chosen for an issue, with optional extra data (e.g. an edited time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: String,
    pub value: Option<String>,
}

impl Decision {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            value: None,
        }
    }

    pub fn with_value(action: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            value: Some(value.into()),
        }
    }

    pub fn is(&self, action: &str) -> bool {
        self.action == action
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} to {}", self.action, value),
            None => f.write_str(&self.action),
        }
    }
}

/// Statistics for one pipeline run
#[derive(Debug, Clone)]
pub struct ProcessingStats {
    pub started: Instant,
    pub files_total: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub lines_read: usize,
    /// Lines written to the main or additional output
    pub lines_processed: usize,
    /// Lines written to the rejection output
    pub lines_rejected: usize,
    /// Rejections decided by a detector rather than a stopword
    pub forced_rejections: usize,
    /// Lines removed by the multi-year filter
    pub lines_filtered: usize,
    /// Lines too short to carry every configured field role
    pub malformed_lines: usize,
    pub stopword_counts: BTreeMap<String, usize>,
    pub output_file: Option<PathBuf>,
    pub additional_file: Option<PathBuf>,
    pub reject_file: Option<PathBuf>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            files_total: 0,
            files_processed: 0,
            files_failed: 0,
            lines_read: 0,
            lines_processed: 0,
            lines_rejected: 0,
            forced_rejections: 0,
            lines_filtered: 0,
            malformed_lines: 0,
            stopword_counts: BTreeMap::new(),
            output_file: None,
            additional_file: None,
            reject_file: None,
        }
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record_stopword(&mut self, stopword: &str) {
        *self.stopword_counts.entry(stopword.to_string()).or_default() += 1;
    }

    /// Matched stopwords ordered by count (descending), then alphabetically
    pub fn top_stopwords(&self, n: usize) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .stopword_counts
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts.truncate(n);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = IssueKey::new(["Song - Edit", "Band"]);
        let b = IssueKey::new(["Song - Edit", "Band"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_does_not_collide_on_separator() {
        let sep = FINGERPRINT_SEPARATOR.to_string();
        let a = IssueKey::new([format!("a{}b", sep), "c".to_string()]);
        let b = IssueKey::new(["a".to_string(), format!("b{}c", sep)]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_does_not_collide_on_escape_char() {
        let a = IssueKey::new(["a\\", "b"]);
        let b = IssueKey::new(["a", "\\b"]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_issue_key_display() {
        assert_eq!(IssueKey::new(["T", "A"]).to_string(), "\"T\" by A");
        assert_eq!(
            IssueKey::new(["T", "A", "45:00"]).to_string(),
            "\"T\" by A (45:00)"
        );
    }

    #[test]
    fn test_field_role_from_str() {
        assert_eq!("Title".parse::<FieldRole>().unwrap(), FieldRole::Title);
        assert!("genre".parse::<FieldRole>().is_err());
    }

    #[test]
    fn test_top_stopwords_ordering() {
        let mut stats = ProcessingStats::new();
        stats.record_stopword("jingle");
        stats.record_stopword("promo");
        stats.record_stopword("promo");
        stats.record_stopword("ad");

        let top = stats.top_stopwords(2);
        assert_eq!(top, vec![("promo", 2), ("ad", 1)]);
    }
}
