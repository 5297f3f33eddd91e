//! Command-line argument definitions for the commercial formatter
//!
//! This module defines the CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI arguments for the commercial formatter
///
/// Reads a station's weekly broadcast exports from the input directory and
/// writes one normalized report, with rejected lines in a dated file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "komm_fmt",
    version,
    about = "Normalize radio station broadcast-metadata exports into a standardized report",
    long_about = "Reads a station's broadcast-metadata exports (fixed-width or delimited), \
                  normalizes dates, times and playing times, repairs common data-quality \
                  problems with interactive prompts whose answers are remembered across runs, \
                  and writes a main report, an optional filtered report and a dated rejection file."
)]
pub struct Args {
    /// Station key or alias from stations.toml
    #[arg(
        value_name = "STATION",
        required_unless_present = "list_stations",
        help = "Station key or alias"
    )]
    pub station: Option<String>,

    /// Lines containing this text (case-insensitive) go to the additional file
    #[arg(
        short = 'a',
        long = "additional",
        value_name = "TEXT",
        help = "Route lines containing TEXT to the additional output file"
    )]
    pub additional: Option<String>,

    /// Overrides `output.additional_postfix` from settings.toml
    #[arg(
        long = "additional-postfix",
        value_name = "POSTFIX",
        requires = "additional",
        help = "File name postfix for the additional output file"
    )]
    pub additional_postfix: Option<String>,

    #[arg(long = "no-stopwords", help = "Do not reject lines matching stopwords")]
    pub no_stopwords: bool,

    #[arg(long = "list-stations", help = "List configured stations and exit")]
    pub list_stations: bool,

    /// Output file; asked for interactively when omitted
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output file for the normalized report"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'i',
        long = "input-dir",
        value_name = "PATH",
        default_value = ".",
        help = "Directory holding the station's export files"
    )]
    pub input_dir: PathBuf,

    /// Configuration directory
    ///
    /// Defaults to $KOMM_FMT_CONFIG_DIR, then ./config, then the platform
    /// configuration directory.
    #[arg(
        short = 'c',
        long = "config-dir",
        value_name = "PATH",
        help = "Directory holding settings.toml, stations.toml and stopwords.toml"
    )]
    pub config_dir: Option<PathBuf>,

    #[arg(
        long = "accept-defaults",
        help = "Answer every prompt with its default choice"
    )]
    pub accept_defaults: bool,

    #[arg(
        long = "forget-choices",
        help = "Clear all remembered choices before processing"
    )]
    pub forget_choices: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help = "Only print errors to the console"
    )]
    pub quiet: bool,
}

impl Args {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.list_stations {
            return Ok(());
        }

        if !self.input_dir.is_dir() {
            return Err(Error::configuration(format!(
                "Input directory does not exist: {}",
                self.input_dir.display()
            )));
        }

        if let Some(output) = &self.output {
            if output.is_dir() {
                return Err(Error::configuration(format!(
                    "Output path is a directory: {}",
                    output.display()
                )));
            }
        }

        if matches!(&self.additional, Some(text) if text.trim().is_empty()) {
            return Err(Error::configuration(
                "Additional filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Level for the log file and the global filter
    pub fn get_log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    }

    /// Level for console output
    pub fn console_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("komm_fmt").chain(args.iter().copied()))
    }

    #[test]
    fn test_station_is_required_unless_listing() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--list-stations"]).is_ok());

        let args = parse(&["globus", "-o", "report.csv"]).unwrap();
        assert_eq!(args.station.as_deref(), Some("globus"));
        assert_eq!(args.output, Some(PathBuf::from("report.csv")));
        assert_eq!(args.input_dir, PathBuf::from("."));
    }

    #[test]
    fn test_additional_postfix_requires_filter() {
        assert!(parse(&["globus", "--additional-postfix", "_x"]).is_err());

        let args = parse(&["globus", "-a", "Reklame", "--additional-postfix", "_x"]).unwrap();
        assert_eq!(args.additional.as_deref(), Some("Reklame"));
        assert_eq!(args.additional_postfix.as_deref(), Some("_x"));
    }

    #[test]
    fn test_log_levels() {
        let args = parse(&["globus"]).unwrap();
        assert_eq!(args.get_log_level("info"), "info");
        assert_eq!(args.console_level(), "warn");

        let args = parse(&["globus", "-vv"]).unwrap();
        assert_eq!(args.get_log_level("info"), "trace");
        assert_eq!(args.console_level(), "debug");

        let args = parse(&["globus", "-q"]).unwrap();
        assert_eq!(args.console_level(), "error");
        assert!(!args.show_progress());

        assert!(parse(&["globus", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_validation() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().to_str().unwrap();

        let args = parse(&["globus", "-i", input]).unwrap();
        assert!(args.validate().is_ok());

        let args = parse(&["globus", "-i", input, "-o", input]).unwrap();
        assert!(args.validate().is_err());

        let args = parse(&["globus", "-i", "/definitely/not/here"]).unwrap();
        assert!(matches!(
            args.validate(),
            Err(Error::Configuration { .. })
        ));

        let args = parse(&["globus", "-i", input, "-a", "  "]).unwrap();
        assert!(args.validate().is_err());
    }
}
