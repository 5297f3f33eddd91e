//! Per-issue state machine and the loop that drives it
//!
//! Each issue moves `Pending -> (Recalled | Prompted) -> Resolved` exactly
//! once. [`IssueSession`] never touches a terminal; it yields a [`Step`],
//! and [`DecisionEngine`] answers `NeedsInput` through its [`Prompter`].

use super::prompter::{PromptKind, PromptSpec, Prompter};
use super::{DecisionConfig, DecisionMemory, DecisionOption, ValueRequirement};
use crate::Result;
use crate::app::models::{Decision, Issue};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Detector-specific half of a decision: how to show an issue and what a
/// decision does to the lines
pub trait IssueHandler {
    /// Lines describing the issue, shown above the prompt
    fn describe(&self, issue: &Issue) -> Vec<String>;

    /// Apply a decision to the issue's lines, returning the indices that
    /// must be rejected
    fn apply(&mut self, decision: &Decision, issue: &Issue) -> BTreeSet<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Recalled,
    Prompted,
    Resolved,
}

/// What a session needs next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A remembered decision is ready to be applied
    Recalled(Decision),
    /// An answer is required
    NeedsInput(PromptSpec),
    /// The decision was applied; the set holds the rejected indices
    Resolved(Decision, BTreeSet<usize>),
}

#[derive(Debug, Clone, Copy)]
enum Awaiting<'a> {
    Choice,
    Value(&'a DecisionOption),
}

/// Resolution of a single issue
#[derive(Debug)]
pub struct IssueSession<'a> {
    config: &'a DecisionConfig,
    issue: &'a Issue,
    context: Vec<String>,
    state: SessionState,
    awaiting: Awaiting<'a>,
    prompted: bool,
    decision: Option<Decision>,
}

impl<'a> IssueSession<'a> {
    pub fn new(config: &'a DecisionConfig, issue: &'a Issue, context: Vec<String>) -> Self {
        Self {
            config,
            issue,
            context,
            state: SessionState::Pending,
            awaiting: Awaiting::Choice,
            prompted: false,
            decision: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn issue(&self) -> &Issue {
        self.issue
    }

    /// Whether the decision came from the user rather than from memory
    pub fn was_prompted(&self) -> bool {
        self.prompted
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }

    /// Leave `Pending`, using a remembered decision when there is a valid one
    pub fn start(&mut self, recalled: Option<Decision>) -> Step {
        if self.state != SessionState::Pending {
            return self.repeat_step();
        }

        if let Some(decision) = recalled {
            if self.config.option_for(&decision).is_some() {
                self.state = SessionState::Recalled;
                self.decision = Some(decision.clone());
                return Step::Recalled(decision);
            }
            warn!(
                "Ignoring remembered '{}' for {}: not a valid {} choice",
                decision, self.issue.key, self.config.name
            );
        }

        self.state = SessionState::Prompted;
        self.prompted = true;
        self.awaiting = Awaiting::Choice;
        Step::NeedsInput(self.choice_prompt(None))
    }

    /// Feed one answer to a prompted session.
    ///
    /// Invalid choices repeat the choice question; invalid values repeat only
    /// the value question.
    pub fn respond(&mut self, response: &str, handler: &mut dyn IssueHandler) -> Step {
        if self.state != SessionState::Prompted {
            return self.repeat_step();
        }

        let config: &'a DecisionConfig = self.config;
        match self.awaiting {
            Awaiting::Choice => match config.parse_response(response) {
                None => Step::NeedsInput(self.choice_prompt(Some(format!(
                    "'{}' is not a valid choice",
                    response.trim()
                )))),
                Some(option) => match &option.value {
                    Some(requirement) => {
                        self.awaiting = Awaiting::Value(option);
                        Step::NeedsInput(self.value_prompt(requirement, None))
                    }
                    None => {
                        let decision = Decision {
                            action: option.action.clone(),
                            value: option.fixed_value.clone(),
                        };
                        self.finish(decision, handler)
                    }
                },
            },
            Awaiting::Value(option) => {
                let Some(requirement) = &option.value else {
                    return self.finish(Decision::new(option.action.clone()), handler);
                };
                let value = response.trim();
                if (requirement.validator)(value) {
                    self.finish(Decision::with_value(option.action.clone(), value), handler)
                } else {
                    Step::NeedsInput(self.value_prompt(requirement, Some(requirement.hint.clone())))
                }
            }
        }
    }

    /// Apply the remembered decision, moving `Recalled -> Resolved`
    pub fn apply_recalled(&mut self, handler: &mut dyn IssueHandler) -> Step {
        match (self.state, self.decision.clone()) {
            (SessionState::Recalled, Some(decision)) => self.finish(decision, handler),
            _ => self.repeat_step(),
        }
    }

    fn finish(&mut self, decision: Decision, handler: &mut dyn IssueHandler) -> Step {
        let rejected = handler.apply(&decision, self.issue);
        self.state = SessionState::Resolved;
        self.decision = Some(decision.clone());
        Step::Resolved(decision, rejected)
    }

    /// Step for a method called in the wrong state; never applies twice
    fn repeat_step(&self) -> Step {
        match (self.state, &self.decision) {
            (SessionState::Recalled, Some(decision)) => Step::Recalled(decision.clone()),
            (SessionState::Resolved, Some(decision)) => {
                Step::Resolved(decision.clone(), BTreeSet::new())
            }
            _ => match self.awaiting {
                Awaiting::Value(option) => match &option.value {
                    Some(requirement) => Step::NeedsInput(self.value_prompt(requirement, None)),
                    None => Step::NeedsInput(self.choice_prompt(None)),
                },
                Awaiting::Choice => Step::NeedsInput(self.choice_prompt(None)),
            },
        }
    }

    fn choice_prompt(&self, error: Option<String>) -> PromptSpec {
        PromptSpec {
            decision: self.config.name.clone(),
            title: self.config.title.clone(),
            context: self.context.clone(),
            message: self.config.prompt_text(),
            kind: PromptKind::Choice,
            error,
        }
    }

    fn value_prompt(&self, requirement: &ValueRequirement, error: Option<String>) -> PromptSpec {
        PromptSpec {
            decision: self.config.name.clone(),
            title: self.config.title.clone(),
            context: self.context.clone(),
            message: requirement.prompt.clone(),
            kind: PromptKind::Value,
            error,
        }
    }
}

/// Drives issue sessions, answering prompts through a [`Prompter`]
#[derive(Debug)]
pub struct DecisionEngine<P: Prompter> {
    prompter: P,
}

impl<P: Prompter> DecisionEngine<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Resolve every issue in order and return the union of rejected indices.
    ///
    /// Remembered decisions are applied without prompting. Decisions made by
    /// the user are passed to `memory` after they are applied; answers from a
    /// non-interactive prompter are not.
    pub fn process_issues(
        &mut self,
        config: &DecisionConfig,
        issues: &[Issue],
        handler: &mut dyn IssueHandler,
        memory: &mut dyn DecisionMemory,
    ) -> Result<BTreeSet<usize>> {
        let mut rejected = BTreeSet::new();
        let mut recalled = 0;
        let mut prompted = 0;

        for issue in issues {
            let mut session = IssueSession::new(config, issue, handler.describe(issue));
            let mut step = session.start(memory.recall(&issue.key));

            loop {
                step = match step {
                    Step::Recalled(decision) => {
                        info!(
                            decision_type = %config.name,
                            key = %issue.key,
                            action = %decision,
                            lines = issue.count(),
                            "Auto-applied remembered decision"
                        );
                        recalled += 1;
                        session.apply_recalled(handler)
                    }
                    Step::NeedsInput(prompt) => {
                        let response = self.prompter.ask(&prompt)?;
                        session.respond(&response, handler)
                    }
                    Step::Resolved(decision, rejects) => {
                        if session.was_prompted() {
                            info!(
                                decision_type = %config.name,
                                key = %issue.key,
                                action = %decision,
                                lines = issue.count(),
                                rejected = rejects.len(),
                                "User decision"
                            );
                            if self.prompter.is_interactive() {
                                memory.remember(&issue.key, &decision);
                            }
                            prompted += 1;
                        }
                        rejected.extend(rejects);
                        break;
                    }
                };
            }
        }

        debug!(
            "{}: {} issues, {} recalled, {} prompted, {} lines rejected",
            config.name,
            issues.len(),
            recalled,
            prompted,
            rejected.len()
        );

        Ok(rejected)
    }
}
