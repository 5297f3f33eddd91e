//! Station-specific line transformations
//!
//! Transformations run in the order a station lists them, after header
//! lines are skipped and before any anomaly detection. Each one maps a
//! line list to a new line list and leaves blank lines alone.

use crate::app::models::FieldRole;
use crate::app::services::station_registry::StationConfig;
use crate::constants::DASH_SEPARATOR;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A named transformation from a station's `transformations` list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    /// Prefix each non-blank line with the source file's stem
    PrependFilename,
    /// Replace `" - "` with the station's field separator
    ReplaceDashSeparator,
    /// Split `"DD-MM-YYYY HH-HH"` into a date field and an `HH:00:00` time field
    SplitDatetime,
    /// Strip the marketing suffix from the title field
    RemoveTitleSuffix,
}

impl Transformation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transformation::PrependFilename => "prepend_filename",
            Transformation::ReplaceDashSeparator => "replace_dash_separator",
            Transformation::SplitDatetime => "split_datetime",
            Transformation::RemoveTitleSuffix => "remove_title_suffix",
        }
    }

    /// Field roles this transformation cannot work without
    pub fn required_roles(&self) -> &'static [FieldRole] {
        match self {
            Transformation::RemoveTitleSuffix => &[FieldRole::Title],
            _ => &[],
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transformation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "prepend_filename" => Ok(Transformation::PrependFilename),
            "replace_dash_separator" => Ok(Transformation::ReplaceDashSeparator),
            "split_datetime" => Ok(Transformation::SplitDatetime),
            "remove_title_suffix" => Ok(Transformation::RemoveTitleSuffix),
            other => Err(other.to_string()),
        }
    }
}

fn datetime_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{2}-\d{2}-\d{4})\s+(\d{1,2})-(\d{1,2})\s*$")
            .expect("datetime range pattern is valid")
    })
}

/// Apply every transformation a station lists, in order
pub fn apply_transformations(
    lines: Vec<String>,
    station: &StationConfig,
    file_stem: &str,
) -> Vec<String> {
    station
        .transformations
        .iter()
        .fold(lines, |lines, transformation| {
            apply(*transformation, lines, station, file_stem)
        })
}

/// Apply a single transformation to every line
pub fn apply(
    transformation: Transformation,
    lines: Vec<String>,
    station: &StationConfig,
    file_stem: &str,
) -> Vec<String> {
    let separator = station.field_separator();

    lines
        .into_iter()
        .map(|line| {
            if line.trim().is_empty() {
                return line;
            }
            match transformation {
                Transformation::PrependFilename => format!("{}{}{}", file_stem, separator, line),
                Transformation::ReplaceDashSeparator => line.replace(DASH_SEPARATOR, separator),
                Transformation::SplitDatetime => split_datetime(&line, separator),
                Transformation::RemoveTitleSuffix => match station.field_index(FieldRole::Title) {
                    Some(title_idx) => remove_title_suffix(&line, separator, title_idx, station),
                    None => line,
                },
            }
        })
        .collect()
}

fn split_datetime(line: &str, separator: &str) -> String {
    let mut fields: Vec<String> = line.split(separator).map(str::to_string).collect();

    let Some(captures) = datetime_range_pattern().captures(&fields[0]) else {
        return line.to_string();
    };

    let date = captures[1].to_string();
    let first_hour: u32 = match captures[2].parse() {
        Ok(hour) => hour,
        Err(_) => return line.to_string(),
    };

    fields[0] = date;
    fields.insert(1, format!("{:02}:00:00", first_hour));
    fields.join(separator)
}

fn remove_title_suffix(
    line: &str,
    separator: &str,
    title_idx: usize,
    station: &StationConfig,
) -> String {
    let mut fields: Vec<String> = line.split(separator).map(str::to_string).collect();
    match fields.get_mut(title_idx) {
        Some(title) => {
            *title = station.title_suffix.replace(title, "").into_owned();
            fields.join(separator)
        }
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::station_registry::StationRegistry;

    fn station_with(transformations: &str) -> StationConfig {
        let stations = format!(
            r#"
[test]
name = "Test"
extensions = [".txt"]
headlines = ["Date", "Time", "Playing Time", "Track Title", "Main Artist"]
transformations = [{}]
"#,
            transformations
        );
        let registry = StationRegistry::from_toml_str(&stations, "").unwrap();
        registry.get("test").unwrap().clone()
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_known_names() {
        assert_eq!(
            "prepend_filename".parse::<Transformation>().unwrap(),
            Transformation::PrependFilename
        );
        assert_eq!(
            "remove_title_suffix".parse::<Transformation>().unwrap(),
            Transformation::RemoveTitleSuffix
        );
        assert_eq!(
            "shout_loudly".parse::<Transformation>().unwrap_err(),
            "shout_loudly"
        );
    }

    #[test]
    fn test_prepend_filename_skips_blank_lines() {
        let station = station_with(r#""prepend_filename""#);
        let out = apply_transformations(lines(&["a;b", "", "c;d"]), &station, "week12");
        assert_eq!(out, lines(&["week12;a;b", "", "week12;c;d"]));
    }

    #[test]
    fn test_replace_dash_separator() {
        let station = station_with(r#""replace_dash_separator""#);
        let out = apply_transformations(lines(&["230101 - 2100 - Song"]), &station, "f");
        assert_eq!(out, lines(&["230101;2100;Song"]));
    }

    #[test]
    fn test_split_datetime() {
        let station = station_with(r#""split_datetime""#);
        let out = apply_transformations(
            lines(&["01-02-2024 7-8;03:00;Song;Band", "no range here;x"]),
            &station,
            "f",
        );
        assert_eq!(
            out,
            lines(&["01-02-2024;07:00:00;03:00;Song;Band", "no range here;x"])
        );
    }

    #[test]
    fn test_remove_title_suffix_targets_title_field_only() {
        let station = station_with(r#""remove_title_suffix""#);
        let out = apply_transformations(
            lines(&["230101;210000;03:00;Song (Radio Edit);Band (radio edit)"]),
            &station,
            "f",
        );
        assert_eq!(
            out,
            lines(&["230101;210000;03:00;Song;Band (radio edit)"])
        );
    }

    #[test]
    fn test_transformations_compose_in_order() {
        let station = station_with(r#""replace_dash_separator", "prepend_filename""#);
        let out = apply_transformations(lines(&["a - b"]), &station, "src");
        assert_eq!(out, lines(&["src;a;b"]));
    }
}
