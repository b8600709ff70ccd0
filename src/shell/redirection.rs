//! Binds a child's stdin/stdout to the files named by `<` and `>`.
//!
//! Everything here that touches descriptors runs in the forked child, so the
//! shell itself never holds a redirection descriptor open.

use std::os::unix::io::RawFd;

use failure::ResultExt;
use nix::fcntl::{self, OFlag};
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd;

use crate::core::parser::CommandLine;
use crate::errors::{Direction, ErrorKind, Result};

const DEV_NULL: &str = "/dev/null";

#[derive(Clone, Debug, PartialEq)]
pub enum Stdio {
    Inherit,
    Null,
    File(String),
}

impl Stdio {
    /// An explicit redirect wins; an unredirected background stream goes to `/dev/null`.
    fn new(redirect: Option<&str>, background: bool) -> Self {
        match (redirect, background) {
            (Some(path), _) => Stdio::File(path.to_string()),
            (None, true) => Stdio::Null,
            (None, false) => Stdio::Inherit,
        }
    }

    fn path(&self) -> Option<&str> {
        match *self {
            Stdio::Inherit => None,
            Stdio::Null => Some(DEV_NULL),
            Stdio::File(ref path) => Some(path.as_str()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Redirects {
    pub stdin: Stdio,
    pub stdout: Stdio,
}

impl Redirects {
    pub fn new(command: &CommandLine, background: bool) -> Self {
        Self {
            stdin: Stdio::new(command.stdin(), background),
            stdout: Stdio::new(command.stdout(), background),
        }
    }

    /// Opens each target and dups it onto fd 0 or 1.
    ///
    /// Must only be called in the child between fork and exec.
    pub fn apply(&self) -> Result<()> {
        bind(&self.stdin, Direction::Input)?;
        bind(&self.stdout, Direction::Output)
    }
}

fn bind(stdio: &Stdio, direction: Direction) -> Result<()> {
    let path = match stdio.path() {
        Some(path) => path,
        None => return Ok(()),
    };

    let (flags, target) = match direction {
        Direction::Input => (OFlag::O_RDONLY, libc::STDIN_FILENO),
        Direction::Output => (
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            libc::STDOUT_FILENO,
        ),
    };

    let fd: RawFd = fcntl::open(path, flags, Mode::from_bits_truncate(0o644)).with_context(
        |_| ErrorKind::Redirection {
            path: path.to_string(),
            direction,
        },
    )?;

    if fd != target {
        unistd::dup2(fd, target).context(ErrorKind::Nix)?;
        unistd::close(fd).context(ErrorKind::Nix)?;
    }

    Ok(())
}
