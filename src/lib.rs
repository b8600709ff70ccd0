//! Smallsh - a small interactive command shell
//!
//! Reads one command per line, expands `$$` to the shell's pid, wires `<` and
//! `>` redirections, and either runs a builtin (`cd`, `exit`, `status`) or
//! forks and execs an external program in the foreground or background.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

/// Logs the error of a `Result` and otherwise discards it.
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {{
        if let Err(e) = $result {
            log::error!("{}: {}", $fmt, e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)+) => {{
        if let Err(e) = $result {
            log::error!("{}: {}", format!($fmt, $($arg)+), e);
        }
    }};
}

mod core;
pub mod errors;
mod shell;
mod util;

pub use crate::core::{
    parser::{CommandLine, MAX_LINE_LENGTH},
    variable_expansion::VariableExpander,
};
pub use crate::shell::{Shell, ShellConfig};
pub use crate::util::SmallshExitStatusExt;
