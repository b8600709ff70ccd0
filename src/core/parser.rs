//! Smallsh Parser
//!
//! Splits a line into words, pulling out `<` and `>` redirections and
//! expanding `$$` in every word that is kept. A trailing `&` stays in the
//! word list until the launcher consumes it with `take_background`.

use log::debug;

use crate::core::variable_expansion::VariableExpander;
use crate::errors::{Error, Result};

/// Longest accepted line, in bytes, not counting the trailing newline.
pub const MAX_LINE_LENGTH: usize = 2048;
/// Most words a command line may hold.
pub const MAX_ARGUMENTS: usize = 512;

const INPUT_REDIRECT: &str = "<";
const OUTPUT_REDIRECT: &str = ">";
const BACKGROUND: &str = "&";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandLine {
    input: String,
    words: Vec<String>,
    stdin: Option<String>,
    stdout: Option<String>,
    background: bool,
}

impl CommandLine {
    pub fn parse(input: &str, expander: &VariableExpander) -> Result<Self> {
        Self::parse_with_limit(input, expander, MAX_LINE_LENGTH)
    }

    pub fn parse_with_limit(
        input: &str,
        expander: &VariableExpander,
        max_line_length: usize,
    ) -> Result<Self> {
        let line = strip_newline(input);
        if line.len() > max_line_length {
            return Err(Error::syntax(format!(
                "line exceeds {} bytes",
                max_line_length
            )));
        }

        let mut command = CommandLine {
            input: line.to_string(),
            ..Default::default()
        };

        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                INPUT_REDIRECT => {
                    command.stdin = Some(redirect_target(token, tokens.next(), expander)?)
                }
                OUTPUT_REDIRECT => {
                    command.stdout = Some(redirect_target(token, tokens.next(), expander)?)
                }
                word => command.words.push(expander.expand_word(word)),
            }
        }

        if command.words.len() > MAX_ARGUMENTS {
            return Err(Error::syntax(format!(
                "more than {} arguments",
                MAX_ARGUMENTS
            )));
        }
        if command.words.is_empty() && command.has_redirects() {
            return Err(Error::syntax("missing command"));
        }

        debug!("parsed CommandLine: {:?}", command);
        Ok(command)
    }

    /// The line as typed, without its trailing newline.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Program name followed by its arguments.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn program(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn stdin(&self) -> Option<&str> {
        self.stdin.as_ref().map(String::as_str)
    }

    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_ref().map(String::as_str)
    }

    pub fn has_redirects(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some()
    }

    /// Removes a trailing `&` word, returning whether the command asked to
    /// run in the background.
    pub fn take_background(&mut self) -> bool {
        if self.words.last().map(String::as_str) == Some(BACKGROUND) {
            self.words.pop();
            self.background = true;
        }
        self.background
    }
}

fn strip_newline(input: &str) -> &str {
    let line = input.strip_suffix('\n').unwrap_or(input);
    line.strip_suffix('\r').unwrap_or(line)
}

fn redirect_target(
    operator: &str,
    target: Option<&str>,
    expander: &VariableExpander,
) -> Result<String> {
    match target {
        Some(INPUT_REDIRECT) | Some(OUTPUT_REDIRECT) | None => {
            Err(Error::missing_redirection_target(operator))
        }
        Some(target) => Ok(expander.expand_word(target)),
    }
}
