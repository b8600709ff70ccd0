//! Smallsh builtins
//!
//! `cd`, `exit` and `status` run inside the shell process. Blank lines and
//! comments are recognised here too, before any parsing happens.

use log::debug;

use self::dirs::Cd;
use self::exit::Exit;
use self::prelude::*;
use self::status::Status;

pub mod prelude {
    pub use std::io::Write;

    pub use failure::ResultExt;

    pub use crate::errors::{Error, ErrorKind, Result};
    pub use crate::shell::Shell;
    pub use crate::util::SmallshExitStatusExt;
}

mod dirs;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

const COMMENT_PREFIX: char = '#';

/// Represents a Smallsh builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()>;
}

/// Returns `true` for a blank line or one whose first word starts with `#`.
pub fn is_noop<T: AsRef<str>>(input: T) -> bool {
    match input.as_ref().split_whitespace().next() {
        Some(first) => first.starts_with(COMMENT_PREFIX),
        None => true,
    }
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    [CD_NAME, EXIT_NAME, STATUS_NAME].contains(&program.as_ref())
}

/// precondition: command is a builtin.
///
/// A builtin's own failure (e.g. `cd` to a missing directory) is printed
/// to `stdout` and is not an error for the caller.
pub fn run<S1, S2>(shell: &mut Shell, program: S1, args: &[S2], stdout: &mut dyn Write) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug_assert!(is_builtin(&program));

    let result = match program.as_ref() {
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        STATUS_NAME => Status::run(shell, args, stdout),
        _ => unreachable!(),
    };

    if let Err(ref e) = result {
        if let ErrorKind::BuiltinCommand { ref message, code } = *e.kind() {
            debug!("{} failed with {}: {}", program.as_ref(), code, message);
            writeln!(stdout, "{}", message).context(ErrorKind::Io)?;
            return Ok(());
        }
    }

    result
}
