use std::fmt;

use nix::unistd;

/// Replaced by the shell's own pid wherever it appears in a word.
pub const PID_VARIABLE: &str = "$$";

/// Expands `$$` in the words of a command line.
#[derive(Clone, Debug)]
pub struct VariableExpander {
    pid: String,
}

impl VariableExpander {
    pub fn new<T: fmt::Display>(pid: T) -> Self {
        Self {
            pid: pid.to_string(),
        }
    }

    /// An expander that substitutes the pid of the calling process.
    pub fn for_current_process() -> Self {
        Self::new(unistd::getpid())
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn expand_word(&self, word: &str) -> String {
        expand_pid(word, &self.pid)
    }
}

/// Replaces every non-overlapping `$$` in `word`, scanning left to right, with `pid`.
///
/// A lone trailing `$` is left as is.
pub fn expand_pid(word: &str, pid: &str) -> String {
    word.replace(PID_VARIABLE, pid)
}
