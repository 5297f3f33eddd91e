//! Compiled stopword matching
//!
//! All stopwords of a station are escaped, lowercased and joined into one
//! alternation pattern, so each line costs a single regex search.

use crate::{Error, Result};
use regex::Regex;

/// Case-insensitive substring matcher over a station's stopwords
#[derive(Debug, Clone, Default)]
pub struct StopwordMatcher {
    pattern: Option<Regex>,
    word_count: usize,
}

impl StopwordMatcher {
    /// Compile a matcher; an empty word list never matches
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let mut lowered: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        // Longest first; the alternation matches leftmost-first
        lowered.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        lowered.dedup();
        let escaped: Vec<String> = lowered.iter().map(|w| regex::escape(w)).collect();

        if escaped.is_empty() {
            return Ok(Self::default());
        }

        let pattern = Regex::new(&escaped.join("|"))
            .map_err(|e| Error::configuration(format!("Invalid stopword pattern: {}", e)))?;

        Ok(Self {
            pattern: Some(pattern),
            word_count: escaped.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Whether a line contains any stopword
    pub fn matches(&self, line: &str) -> bool {
        self.find_lower(&line.to_lowercase()).is_some()
    }

    /// Matched stopword in an already lowercased line
    pub fn find_lower<'a>(&self, line_lower: &'a str) -> Option<&'a str> {
        self.pattern
            .as_ref()
            .and_then(|pattern| pattern.find(line_lower))
            .map(|m| m.as_str())
    }
}
