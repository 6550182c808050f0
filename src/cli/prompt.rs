// file: src/cli/prompt.rs
// version: 1.0.0
// guid: 9764531e-705d-4bed-a70e-86046e9125aa

//! Terminal input for the interactive menus

use crate::error::AdminError;
use crate::security::guard::{is_affirmative, Confirm};
use crate::Result;
use colored::Colorize;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Line-oriented operator input
pub trait Prompt {
    /// Print `question` and return the answer without its line ending
    fn ask(&mut self, question: &str) -> Result<String>;

    fn clear_screen(&mut self);

    fn pause(&mut self) -> Result<()> {
        self.ask("\nPress Enter to continue...").map(|_| ())
    }
}

/// Reads from stdin, draws on stdout
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            return Err(input_closed());
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn clear_screen(&mut self) {
        if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
            debug!("Could not clear screen: {}", e);
        }
    }
}

/// Error returned once stdin is exhausted
pub fn input_closed() -> AdminError {
    AdminError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "standard input closed",
    ))
}

/// Whether `err` means no more operator input will arrive
pub fn is_input_closed(err: &AdminError) -> bool {
    matches!(err, AdminError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

/// Uses a [`Prompt`] to collect confirmation for guarded actions
pub struct PromptConfirm<'a> {
    prompt: &'a mut dyn Prompt,
}

impl<'a> PromptConfirm<'a> {
    pub fn new(prompt: &'a mut dyn Prompt) -> Self {
        Self { prompt }
    }
}

impl Confirm for PromptConfirm<'_> {
    fn confirm(&mut self, warning: &str) -> Result<bool> {
        println!("\n{}", warning.yellow().bold());
        let answer = self
            .prompt
            .ask("Are you sure you want to continue? (yes/no): ")?;
        let accepted = is_affirmative(&answer);
        if !accepted {
            println!("Operation cancelled.");
        }
        Ok(accepted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers; reports closed input when they run out
    pub(crate) struct ScriptedPrompt {
        answers: VecDeque<String>,
        pub(crate) questions: Vec<String>,
    }

    impl ScriptedPrompt {
        pub(crate) fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                questions: Vec::new(),
            }
        }

        pub(crate) fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, question: &str) -> Result<String> {
            self.questions.push(question.to_string());
            self.answers.pop_front().ok_or_else(input_closed)
        }

        fn clear_screen(&mut self) {}
    }

    #[test]
    fn test_prompt_confirm_accepts_only_yes() {
        let mut prompt = ScriptedPrompt::new(&["YES", "y", "no"]);
        let mut confirm = PromptConfirm::new(&mut prompt);

        assert!(confirm.confirm("careful").unwrap());
        assert!(!confirm.confirm("careful").unwrap());
        assert!(!confirm.confirm("careful").unwrap());
    }

    #[test]
    fn test_exhausted_script_reports_closed_input() {
        let mut prompt = ScriptedPrompt::new(&[]);

        let err = prompt.ask("anything? ").unwrap_err();

        assert!(is_input_closed(&err));
        assert!(!is_input_closed(&AdminError::validation("x")));
    }

    #[test]
    fn test_pause_consumes_one_answer() {
        let mut prompt = ScriptedPrompt::new(&["", "next"]);

        prompt.pause().unwrap();

        assert_eq!(prompt.remaining(), 1);
        assert!(prompt.questions[0].contains("Press Enter"));
    }
}
