//! Line layouts: fixed-width and delimited
//!
//! A station declares its layout once; the matching [`ParseStrategy`] is
//! chosen at load time. Raw lines pass through [`ParseStrategy::extract`]
//! right after header skipping, so every later stage reads fields by
//! splitting on [`ParseStrategy::field_separator`] regardless of layout.

use crate::app::services::field_formatter::{FieldFormatter, normalize_date, normalize_time};

/// How a station's lines are cut into fields and formatted for output
pub trait ParseStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Separator between fields of an extracted line
    fn field_separator(&self) -> &str;

    /// Convert a raw input line into its separator-joined working form
    fn extract(&self, line: &str) -> String;

    /// Normalize an extracted line for output
    fn format_line(&self, line: &str, formatter: &FieldFormatter, output_separator: &str)
    -> String;

    /// Split an extracted line into fields
    fn fields<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.split(self.field_separator()).collect()
    }
}

/// Fixed-width columns cut at strictly increasing character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalStrategy {
    sorted_positions: Vec<usize>,
    separator: String,
}

impl PositionalStrategy {
    /// Build from column boundaries; positions are sorted and deduplicated
    pub fn new(mut positions: Vec<usize>, separator: impl Into<String>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self {
            sorted_positions: positions,
            separator: separator.into(),
        }
    }

    pub fn sorted_positions(&self) -> &[usize] {
        &self.sorted_positions
    }
}

impl ParseStrategy for PositionalStrategy {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn field_separator(&self) -> &str {
        &self.separator
    }

    /// Slice the line at each boundary and trim every column.
    ///
    /// Boundaries past the end of a short line are clamped to its length,
    /// and text after the last boundary is not part of any column.
    fn extract(&self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut parts: Vec<String> = Vec::with_capacity(self.sorted_positions.len());
        let mut start = 0;

        for &pos in &self.sorted_positions {
            let end = pos.min(chars.len());
            if end >= start {
                let part: String = chars[start..end].iter().collect();
                parts.push(part.trim().to_string());
                start = end;
            }
        }

        parts.join(&self.separator)
    }

    fn format_line(
        &self,
        line: &str,
        _formatter: &FieldFormatter,
        output_separator: &str,
    ) -> String {
        let mut fields: Vec<String> = self.fields(line).into_iter().map(str::to_string).collect();
        if let Some(date) = fields.first_mut() {
            *date = normalize_date(date);
        }
        fields.join(output_separator)
    }
}

/// Fields separated by an input delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedStrategy {
    input_separator: String,
}

impl DelimitedStrategy {
    pub fn new(input_separator: impl Into<String>) -> Self {
        Self {
            input_separator: input_separator.into(),
        }
    }
}

impl ParseStrategy for DelimitedStrategy {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn field_separator(&self) -> &str {
        &self.input_separator
    }

    fn extract(&self, line: &str) -> String {
        line.to_string()
    }

    /// Normalize date (field 0), time (field 1) and playing time (field 2)
    fn format_line(
        &self,
        line: &str,
        formatter: &FieldFormatter,
        output_separator: &str,
    ) -> String {
        let mut fields: Vec<String> = self.fields(line).into_iter().map(str::to_string).collect();

        if let Some(date) = fields.get_mut(0) {
            *date = normalize_date(date);
        }
        if let Some(time) = fields.get_mut(1) {
            *time = normalize_time(time);
        }
        if let Some(duration) = fields.get_mut(2) {
            *duration = formatter.fix_duration(duration);
        }

        fields.join(output_separator)
    }
}

/// The layout variant a station declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationLayout {
    Positional(PositionalStrategy),
    Delimited(DelimitedStrategy),
}

impl StationLayout {
    pub fn strategy(&self) -> &dyn ParseStrategy {
        match self {
            StationLayout::Positional(strategy) => strategy,
            StationLayout::Delimited(strategy) => strategy,
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, StationLayout::Positional(_))
    }
}
