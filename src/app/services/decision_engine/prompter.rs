//! Where answers come from
//!
//! The console implementation lives in the CLI layer. [`ScriptedPrompter`]
//! answers from a queue of canned responses and records every prompt it is
//! shown, which is all the engine tests need.

use crate::{Error, Result};
use std::collections::VecDeque;

/// What the user is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// One of the configured option keys
    Choice,
    /// Extra data for an already chosen option
    Value,
}

/// Everything needed to render one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    /// Decision table name, e.g. `artist_title`
    pub decision: String,
    pub title: String,
    /// Description of the issue being decided
    pub context: Vec<String>,
    /// The question itself, ending in `: `
    pub message: String,
    pub kind: PromptKind,
    /// Why the previous answer was refused
    pub error: Option<String>,
}

/// Source of answers for the decision engine
pub trait Prompter {
    /// Return one line of input for a prompt, without the trailing newline
    fn ask(&mut self, prompt: &PromptSpec) -> Result<String>;

    /// Whether answers come from a person. Automatic answers are applied
    /// but never remembered.
    fn is_interactive(&self) -> bool {
        true
    }
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, prompt: &PromptSpec) -> Result<String> {
        (**self).ask(prompt)
    }

    fn is_interactive(&self) -> bool {
        (**self).is_interactive()
    }
}

/// Prompter backed by canned responses
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    responses: VecDeque<String>,
    fallback: Option<String>,
    automatic: bool,
    asked: Vec<PromptSpec>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            fallback: None,
            automatic: false,
            asked: Vec::new(),
        }
    }

    /// Answer every prompt with empty input, i.e. the default option
    pub fn accepting_defaults() -> Self {
        Self {
            automatic: true,
            ..Self::default().with_fallback("")
        }
    }

    /// Response used once the queue is empty
    pub fn with_fallback(mut self, response: impl Into<String>) -> Self {
        self.fallback = Some(response.into());
        self
    }

    /// Every prompt shown so far, in order
    pub fn asked(&self) -> &[PromptSpec] {
        &self.asked
    }

    pub fn prompt_count(&self) -> usize {
        self.asked.len()
    }

    /// Choice prompts shown so far, ignoring value and retry prompts
    pub fn choice_prompt_count(&self) -> usize {
        self.asked
            .iter()
            .filter(|p| p.kind == PromptKind::Choice && p.error.is_none())
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &PromptSpec) -> Result<String> {
        self.asked.push(prompt.clone());
        match self.responses.pop_front().or_else(|| self.fallback.clone()) {
            Some(response) => Ok(response),
            None => Err(Error::prompt(format!(
                "no scripted response left for '{}'",
                prompt.message.trim_end()
            ))),
        }
    }

    fn is_interactive(&self) -> bool {
        !self.automatic
    }
}
