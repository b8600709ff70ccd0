//! Error module. See the [failure](https://crates.io/crates/failure) crate for details.

use std::fmt;
use std::result;

use failure::{Backtrace, Context, Fail};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    ctx: Context<ErrorKind>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.ctx.get_context()
    }

    /// Returns `true` if the shell cannot keep running after this error.
    pub fn is_fatal(&self) -> bool {
        match *self.kind() {
            ErrorKind::Fork => true,
            _ => false,
        }
    }

    pub(crate) fn syntax<T: AsRef<str>>(detail: T) -> Error {
        Error::from(ErrorKind::Syntax(detail.as_ref().to_string()))
    }

    pub(crate) fn missing_redirection_target<T: AsRef<str>>(operator: T) -> Error {
        Error::syntax(format!(
            "missing redirection target after '{}'",
            operator.as_ref()
        ))
    }

    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        Error::from(ErrorKind::BuiltinCommand {
            message: message.as_ref().to_string(),
            code,
        })
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.ctx.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.ctx.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ctx, f)
    }
}

/// Which standard stream a redirection rebinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Syntax(String),
    BuiltinCommand { message: String, code: i32 },
    Redirection { path: String, direction: Direction },
    Fork,
    Io,
    Nix,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::Syntax(ref detail) => write!(f, "syntax error: {}", detail),
            ErrorKind::BuiltinCommand { ref message, .. } => write!(f, "{}", message),
            ErrorKind::Redirection {
                ref path,
                direction,
            } => write!(f, "cannot open {} as {} file", path, direction),
            ErrorKind::Fork => write!(f, "unable to create a new process"),
            ErrorKind::Io => write!(f, "I/O error occurred"),
            ErrorKind::Nix => write!(f, "Nix error occurred"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(ctx: Context<ErrorKind>) -> Error {
        Error { ctx }
    }
}
