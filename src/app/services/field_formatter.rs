//! Field normalization for dates, times and playing times
//!
//! Every function here is total: input that is not recognized comes back
//! unchanged, so a malformed field never aborts a run.

use crate::constants::{DEFAULT_OVERFLOW_THRESHOLD_MINUTES, SECONDS_PER_DAY, YEAR_PIVOT};
use tracing::debug;

/// Formats and normalizes field values for broadcast metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFormatter {
    overflow_threshold: u32,
}

impl Default for FieldFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_OVERFLOW_THRESHOLD_MINUTES)
    }
}

impl FieldFormatter {
    pub fn new(overflow_threshold: u32) -> Self {
        Self { overflow_threshold }
    }

    pub fn overflow_threshold(&self) -> u32 {
        self.overflow_threshold
    }

    /// Undo the midnight overflow using this formatter's threshold
    pub fn fix_duration(&self, duration: &str) -> String {
        fix_overflow_duration(duration, self.overflow_threshold)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a date to `DD-MM-YYYY`.
///
/// Handles:
/// - `YYMMDD` (pivot year 50)
/// - `DDMMYYYY`
/// - `YYYY-MM-DD`
/// - `DD.MM.YYYY`
///
/// Anything else, including an already canonical date, is returned as-is.
pub fn normalize_date(date: &str) -> String {
    let trimmed = date.trim();

    if trimmed.len() == 6 && is_digits(trimmed) {
        let (yy, mm, dd) = (&trimmed[0..2], &trimmed[2..4], &trimmed[4..6]);
        let century = match yy.parse::<u32>() {
            Ok(year) if year < YEAR_PIVOT => "20",
            _ => "19",
        };
        return format!("{}-{}-{}{}", dd, mm, century, yy);
    }

    if trimmed.len() == 8 && is_digits(trimmed) {
        let (dd, mm, yyyy) = (&trimmed[0..2], &trimmed[2..4], &trimmed[4..8]);
        return format!("{}-{}-{}", dd, mm, yyyy);
    }

    let parts: Vec<&str> = trimmed.split('-').collect();
    if trimmed.len() == 10
        && parts.len() == 3
        && parts[0].len() == 4
        && parts[1].len() == 2
        && parts.iter().all(|p| is_digits(p))
    {
        return format!("{}-{}-{}", parts[2], parts[1], parts[0]);
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if trimmed.len() == 10
        && parts.len() == 3
        && parts[0].len() == 2
        && parts[1].len() == 2
        && parts.iter().all(|p| is_digits(p))
    {
        return parts.join("-");
    }

    date.to_string()
}

/// Year of a date in any format [`normalize_date`] understands
pub fn year_of(date: &str) -> Option<u32> {
    let normalized = normalize_date(date);
    let parts: Vec<&str> = normalized.split('-').collect();
    match parts.as_slice() {
        [dd, mm, yyyy] if dd.len() == 2 && mm.len() == 2 && yyyy.len() == 4 => {
            if is_digits(dd) && is_digits(mm) && is_digits(yyyy) {
                yyyy.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Format a 6-digit `HHMMSS` time as `HH:MM:SS`; anything else is unchanged
pub fn normalize_time(time: &str) -> String {
    if time.len() == 6 && is_digits(time) {
        format!("{}:{}:{}", &time[0..2], &time[2..4], &time[4..6])
    } else {
        time.to_string()
    }
}

/// Split a duration into its first two colon-delimited components
fn minutes_and_seconds(duration: &str) -> Option<(i64, i64)> {
    let mut parts = duration.split(':');
    let minutes = parts.next()?.trim().parse().ok()?;
    let seconds = parts.next()?.trim().parse().ok()?;
    Some((minutes, seconds))
}

/// Correct a playing time that a station inflated by a full day.
///
/// Some stations compute the playing time of a track spanning midnight by
/// adding 1440 minutes. Durations with at least `threshold` minutes are
/// mapped back to `86400 - total_seconds` and reformatted as `MM:SS`.
/// When that subtraction goes negative the original text is returned, and
/// the long playing time review downstream picks it up instead.
pub fn fix_overflow_duration(duration: &str, threshold: u32) -> String {
    let Some((minutes, seconds)) = minutes_and_seconds(duration) else {
        return duration.to_string();
    };

    if minutes < i64::from(threshold) {
        return duration.to_string();
    }

    let corrected = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .and_then(|total| SECONDS_PER_DAY.checked_sub(total));
    let Some(corrected) = corrected.filter(|c| *c >= 0) else {
        return duration.to_string();
    };

    let fixed = format!("{:02}:{:02}", corrected / 60, corrected % 60);
    debug!(original = duration, corrected = %fixed, "Fixed playing time overflow");
    fixed
}

/// Minutes component of a duration, or `None` when it cannot be parsed
pub fn minutes_of(duration: &str) -> Option<i64> {
    if !duration.contains(':') {
        return None;
    }
    duration.split(':').next()?.trim().parse().ok()
}

/// Whether a value is two integer components separated by a colon
pub fn is_valid_mm_ss(value: &str) -> bool {
    let parts: Vec<&str> = value.trim().split(':').collect();
    parts.len() == 2 && parts.iter().all(|p| p.trim().parse::<u32>().is_ok())
}
