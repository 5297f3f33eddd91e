//! Console output: station list, run summary and stopword summary

use crate::app::models::ProcessingStats;
use crate::app::services::station_registry::StationRegistry;
use crate::constants::STOPWORD_SUMMARY_TOP_N;
use colored::*;
use indicatif::HumanDuration;
use std::fmt::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// `key (aliases: a, b)` lines for `--list-stations`
pub fn format_station_list(registry: &StationRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Configured stations:".bold());
    for (key, aliases) in registry.list() {
        if aliases.is_empty() {
            let _ = writeln!(out, "   • {}", key);
        } else {
            let _ = writeln!(out, "   • {} (aliases: {})", key, aliases.join(", "));
        }
    }
    out
}

fn file_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "-".to_string())
}

/// The summary box printed after every run, successful or not
pub fn format_summary(stats: &ProcessingStats, station: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", format!("{} processing summary", station).bold());
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "   • Files processed: {}/{}",
        stats.files_processed, stats.files_total
    );
    if stats.files_failed > 0 {
        let _ = writeln!(
            out,
            "   • {}",
            format!("Files failed: {}", stats.files_failed).yellow()
        );
    }
    let _ = writeln!(out, "   • Lines processed: {}", stats.lines_processed);
    let _ = writeln!(out, "   • Lines rejected: {}", stats.lines_rejected);
    if stats.lines_filtered > 0 {
        let _ = writeln!(out, "   • Lines from other years: {}", stats.lines_filtered);
    }
    if stats.malformed_lines > 0 {
        let _ = writeln!(
            out,
            "   • {}",
            format!("Short lines padded: {}", stats.malformed_lines).yellow()
        );
    }
    let _ = writeln!(out, "   • Processing time: {}", HumanDuration(stats.elapsed()));
    let _ = writeln!(out, "   • Output file: {}", file_name(stats.output_file.as_deref()).green());
    if stats.additional_file.is_some() {
        let _ = writeln!(
            out,
            "   • Additional file: {}",
            file_name(stats.additional_file.as_deref()).green()
        );
    }
    if stats.reject_file.is_some() {
        let _ = writeln!(out, "   • Rejection file: {}", file_name(stats.reject_file.as_deref()));
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

/// Most frequent stopwords, or `None` when nothing matched
pub fn format_stopword_summary(stats: &ProcessingStats) -> Option<String> {
    let top = stats.top_stopwords(STOPWORD_SUMMARY_TOP_N);
    if top.is_empty() {
        return None;
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Top stopwords:".bold());
    for (word, count) in top {
        let _ = writeln!(out, "   • {}: {}", word, count);
    }
    Some(out)
}

pub fn print_summary(stats: &ProcessingStats, station: &str) {
    print!("{}", format_summary(stats, station));
    if let Some(stopwords) = format_stopword_summary(stats) {
        print!("{}", stopwords);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_summary_lists_outputs() {
        colored::control::set_override(false);
        let mut stats = ProcessingStats::new();
        stats.files_total = 2;
        stats.files_processed = 2;
        stats.lines_processed = 40;
        stats.lines_rejected = 3;
        stats.output_file = Some(PathBuf::from("/out/week.csv"));

        let summary = format_summary(&stats, "Globus");
        assert!(summary.contains("Globus processing summary"));
        assert!(summary.contains("Files processed: 2/2"));
        assert!(summary.contains("Lines rejected: 3"));
        assert!(summary.contains("Output file: week.csv"));
        assert!(!summary.contains("Additional file"));
        assert!(!summary.contains("Files failed"));
    }

    #[test]
    fn test_stopword_summary_orders_by_count() {
        colored::control::set_override(false);
        let mut stats = ProcessingStats::new();
        assert!(format_stopword_summary(&stats).is_none());

        stats.record_stopword("promo");
        stats.record_stopword("jingle");
        stats.record_stopword("jingle");

        let summary = format_stopword_summary(&stats).unwrap();
        let jingle = summary.find("jingle: 2").unwrap();
        let promo = summary.find("promo: 1").unwrap();
        assert!(jingle < promo);
    }

    #[test]
    fn test_station_list_shows_aliases() {
        colored::control::set_override(false);
        let registry = StationRegistry::from_toml_str(
            "[globus]\naliases = [\"gr\"]\n\n[bauer]\n",
            "",
        )
        .unwrap();

        let listing = format_station_list(&registry);
        assert!(listing.contains("• bauer\n"));
        assert!(listing.contains("• globus (aliases: gr)"));
    }
}
