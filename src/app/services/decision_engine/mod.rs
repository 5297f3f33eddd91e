//! Generic decision engine for grouped anomalies
//!
//! Every detector hands the engine a list of [`Issue`]s together with a
//! [`DecisionConfig`] describing the options the user may pick from. The
//! engine resolves each issue exactly once, either from memory or by asking
//! a [`Prompter`], and collects the line indices that must be rejected.
//!
//! # Architecture
//!
//! - [`DecisionConfig`] / [`DecisionOption`] - option tables and presets
//! - [`engine`] - the per-issue [`IssueSession`] state machine and the driver loop
//! - [`prompter`] - the [`Prompter`] seam plus a scripted implementation for tests
//!   and non-interactive runs
//!
//! Terminal I/O never happens in this module. A session yields a [`Step`]
//! and the driver decides where the answer comes from.
//!
//! [`Issue`]: crate::app::models::Issue

use crate::app::models::{Decision, IssueKey};
use crate::app::services::field_formatter::is_valid_mm_ss;

pub mod engine;
pub mod prompter;

#[cfg(test)]
pub mod tests;

pub use engine::{DecisionEngine, IssueHandler, IssueSession, SessionState, Step};
pub use prompter::{PromptKind, PromptSpec, Prompter, ScriptedPrompter};

/// Action names shared by detectors and the choice store
pub mod actions {
    pub const FIX: &str = "fix";
    pub const SKIP: &str = "skip";
    pub const REJECT: &str = "reject";
    pub const ACCEPT: &str = "accept";
    pub const EDIT: &str = "edit";
    pub const KEEP: &str = "keep";
    pub const KEEP_YEAR: &str = "keep_year";
}

/// Recall source and remember sink for decisions
pub trait DecisionMemory {
    fn recall(&self, key: &IssueKey) -> Option<Decision>;
    fn remember(&mut self, key: &IssueKey, decision: &Decision);
}

/// Memory that never recalls anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemory;

impl DecisionMemory for NoMemory {
    fn recall(&self, _key: &IssueKey) -> Option<Decision> {
        None
    }

    fn remember(&mut self, _key: &IssueKey, _decision: &Decision) {}
}

/// Validates a value collected after the base choice
pub type ValueValidator = fn(&str) -> bool;

/// Extra input an option needs before it becomes a decision
#[derive(Debug, Clone)]
pub struct ValueRequirement {
    pub prompt: String,
    pub validator: ValueValidator,
    /// Shown when the validator rejects a value
    pub hint: String,
}

/// One selectable answer
#[derive(Debug, Clone)]
pub struct DecisionOption {
    /// Canonical key, matched case-insensitively
    pub key: String,
    pub aliases: Vec<String>,
    /// Text shown in the prompt, e.g. `[Y]es fix`
    pub label: String,
    pub action: String,
    pub is_default: bool,
    pub value: Option<ValueRequirement>,
    /// Value attached without asking, e.g. the year of a multi-year option
    pub fixed_value: Option<String>,
}

impl DecisionOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into().to_lowercase(),
            aliases: Vec::new(),
            label: label.into(),
            action: action.into(),
            is_default: false,
            value: None,
            fixed_value: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_lowercase());
        self
    }

    pub fn default_choice(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn requires_value(
        mut self,
        prompt: impl Into<String>,
        validator: ValueValidator,
        hint: impl Into<String>,
    ) -> Self {
        self.value = Some(ValueRequirement {
            prompt: prompt.into(),
            validator,
            hint: hint.into(),
        });
        self
    }

    pub fn with_fixed_value(mut self, value: impl Into<String>) -> Self {
        self.fixed_value = Some(value.into());
        self
    }

    /// Whether a trimmed, lowercased response selects this option
    pub fn accepts(&self, response: &str) -> bool {
        self.key == response || self.aliases.iter().any(|a| a == response)
    }

    /// Whether a recalled decision is one this option could have produced
    pub fn produced(&self, decision: &Decision) -> bool {
        if decision.action != self.action {
            return false;
        }
        match (&self.value, &self.fixed_value) {
            (Some(requirement), _) => decision
                .value
                .as_deref()
                .is_some_and(|v| (requirement.validator)(v)),
            (None, Some(fixed)) => decision.value.as_deref() == Some(fixed.as_str()),
            (None, None) => true,
        }
    }
}

/// Option table for one kind of issue
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Short machine name used in logs
    pub name: String,
    /// Heading shown above each prompted issue
    pub title: String,
    pub options: Vec<DecisionOption>,
}

impl DecisionConfig {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            options: Vec::new(),
        }
    }

    /// Add an option; a later default replaces an earlier one
    pub fn option(mut self, option: DecisionOption) -> Self {
        if option.is_default {
            for existing in &mut self.options {
                existing.is_default = false;
            }
        }
        self.options.push(option);
        self
    }

    pub fn default_option(&self) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.is_default)
    }

    /// Prompt line, e.g. `[Y]es fix / [N]o skip / [X]reject: `
    pub fn prompt_text(&self) -> String {
        let labels: Vec<&str> = self.options.iter().map(|o| o.label.as_str()).collect();
        format!("{}: ", labels.join(" / "))
    }

    /// Option selected by a raw response; empty input picks the default
    pub fn parse_response(&self, response: &str) -> Option<&DecisionOption> {
        let response = response.trim().to_lowercase();
        if response.is_empty() {
            return self.default_option();
        }
        self.options.iter().find(|o| o.accepts(&response))
    }

    /// Option that could have produced a recalled decision
    pub fn option_for(&self, decision: &Decision) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.produced(decision))
    }

    /// Fix / skip / reject for titles carrying an artist prefix
    pub fn artist_title() -> Self {
        Self::new("artist_title", "Possible artist/title split")
            .option(
                DecisionOption::new("y", "[Y]es fix", actions::FIX)
                    .alias("yes")
                    .default_choice(),
            )
            .option(DecisionOption::new("n", "[N]o skip", actions::SKIP).alias("no"))
            .option(DecisionOption::new("x", "[X]reject", actions::REJECT).alias("reject"))
    }

    /// Accept / reject / edit for suspiciously long playing times
    pub fn long_playing_time() -> Self {
        Self::new("long_playing_time", "Long playing time")
            .option(
                DecisionOption::new("a", "[A]ccept", actions::ACCEPT)
                    .alias("accept")
                    .default_choice(),
            )
            .option(DecisionOption::new("r", "[R]eject", actions::REJECT).alias("reject"))
            .option(
                DecisionOption::new("e", "[E]dit", actions::EDIT)
                    .alias("edit")
                    .requires_value(
                        "New playing time (MM:SS): ",
                        is_valid_mm_ss,
                        "Please enter the time as MM:SS",
                    ),
            )
    }

    /// Keep all / reject repeats for duplicated broadcasts
    pub fn duplicate() -> Self {
        Self::new("duplicate", "Duplicate track")
            .option(
                DecisionOption::new("k", "[K]eep all", actions::KEEP)
                    .alias("keep")
                    .default_choice(),
            )
            .option(
                DecisionOption::new("r", "[R]eject duplicates", actions::REJECT)
                    .alias("reject"),
            )
    }

    /// Keep all, or keep a single year chosen by its number in the list
    pub fn multi_year(years: &[u32]) -> Self {
        let mut config = Self::new("multi_year", "Multiple years found").option(
            DecisionOption::new("k", "[K]eep all", actions::KEEP)
                .alias("keep")
                .default_choice(),
        );
        for (position, year) in years.iter().enumerate() {
            let number = (position + 1).to_string();
            let label = format!("[{}] {}", number, year);
            config = config.option(
                DecisionOption::new(number, label, actions::KEEP_YEAR)
                    .alias(year.to_string())
                    .with_fixed_value(year.to_string()),
            );
        }
        config
    }
}
