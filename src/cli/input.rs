//! User input for interactive CLI prompts
//!
//! [`ConsolePrompter`] answers the decision engine's prompts from stdin.
//! The output file name prompt lives here too.

use crate::app::services::decision_engine::{PromptKind, PromptSpec, Prompter};
use crate::{Error, Result};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Prompter reading answers from the terminal
#[derive(Debug, Default)]
pub struct ConsolePrompter {
    accept_defaults: bool,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show every prompt but answer it with the default choice
    pub fn accepting_defaults() -> Self {
        Self {
            accept_defaults: true,
        }
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, prompt: &PromptSpec) -> Result<String> {
        let mut stdout = io::stdout();
        write_prompt(&mut stdout, prompt)
            .map_err(|e| Error::io("Failed to write prompt".to_string(), e))?;

        if self.accept_defaults {
            println!("{}", "(default)".dimmed());
            return Ok(String::new());
        }

        read_answer(&mut io::stdin().lock())
    }

    fn is_interactive(&self) -> bool {
        !self.accept_defaults
    }
}

/// Render a prompt: title and context on a fresh choice, then the question
pub fn write_prompt(out: &mut impl Write, prompt: &PromptSpec) -> io::Result<()> {
    match &prompt.error {
        Some(error) => writeln!(out, "{}", error.red())?,
        None if prompt.kind == PromptKind::Choice => {
            writeln!(out)?;
            writeln!(out, "{}", prompt.title.bold())?;
            for line in &prompt.context {
                writeln!(out, "  {}", line)?;
            }
        }
        None => {}
    }
    write!(out, "{}", prompt.message)?;
    out.flush()
}

/// Read one line, failing when input is closed
pub fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut answer = String::new();
    let read = input
        .read_line(&mut answer)
        .map_err(|e| Error::io("Failed to read user input".to_string(), e))?;
    if read == 0 {
        return Err(Error::prompt("Input closed while waiting for an answer"));
    }
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask for the output file name; an empty answer is a configuration error
pub fn prompt_output_file() -> Result<PathBuf> {
    print!("Set output filename: ");
    io::stdout()
        .flush()
        .map_err(|e| Error::io("Failed to flush stdout".to_string(), e))?;

    read_output_file(&mut io::stdin().lock())
}

/// Closed input counts as an empty answer
fn read_output_file(input: &mut impl BufRead) -> Result<PathBuf> {
    match read_answer(input) {
        Err(Error::Prompt { .. }) => parse_output_file(""),
        answer => parse_output_file(&answer?),
    }
}

fn parse_output_file(answer: &str) -> Result<PathBuf> {
    let name = answer.trim();
    if name.is_empty() {
        return Err(Error::configuration(
            "No output filename given".to_string(),
        ));
    }
    Ok(PathBuf::from(name))
}
