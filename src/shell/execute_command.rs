use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{self, ExitStatus};

use failure::ResultExt;
use log::{debug, error, info};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};

use crate::core::parser::CommandLine;
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::{job_control, redirection::Redirects, signal_mode};
use crate::util::SmallshExitStatusExt;

/// Exit status of a child that could not redirect or exec.
const CHILD_FAILURE_EXIT_STATUS: i32 = 1;

/// An external process started by the shell.
#[derive(Clone, Debug, PartialEq)]
pub struct Process {
    id: Pid,
    foreground: bool,
}

impl Process {
    pub fn id(&self) -> Pid {
        self.id
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }
}

/// Launches `command` as an external program.
///
/// Consumes a trailing `&`. The request is honored unless foreground-only
/// mode is active, in which case the command runs in the foreground anyway.
/// Returns the exit status of a foreground command, or `None` for a
/// background one.
pub fn run_external_command(
    command: &mut CommandLine,
    stdout: &mut dyn Write,
) -> Result<Option<ExitStatus>> {
    let background_requested = command.take_background();
    let foreground = !background_requested || signal_mode::is_foreground_only();
    if background_requested && foreground {
        debug!("foreground-only mode, ignoring '&' for: {}", command.input());
    }

    if command.is_empty() {
        return Err(Error::syntax("missing command"));
    }

    let process = spawn_process(command, foreground)?;
    if !process.is_foreground() {
        job_control::put_job_in_background(process.id(), stdout)?;
        return Ok(None);
    }

    let status = job_control::wait_for_job(process.id())?;
    if status.signal().is_some() {
        writeln!(stdout, "{}", status.describe()).context(ErrorKind::Io)?;
    }
    Ok(Some(status))
}

/// Forks; the child applies redirections and signal dispositions, then execs.
///
/// A failure to fork is fatal to the shell. Failures in the child are
/// reported by the child and surface only as its exit status.
pub fn spawn_process(command: &CommandLine, foreground: bool) -> Result<Process> {
    let argv = command
        .words()
        .iter()
        .map(|word| CString::new(word.as_bytes()))
        .collect::<::std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::syntax("argument contains a NUL byte"))?;
    if argv.is_empty() {
        return Err(Error::syntax("missing command"));
    }
    let redirects = Redirects::new(command, !foreground);

    // anything still buffered would otherwise be written twice
    io::stdout().flush().context(ErrorKind::Io)?;

    match unsafe { unistd::fork() }.context(ErrorKind::Fork)? {
        ForkResult::Parent { child } => {
            info!(
                "started {} process {}: {}",
                if foreground { "foreground" } else { "background" },
                child,
                command.input()
            );
            Ok(Process {
                id: child,
                foreground,
            })
        }
        ForkResult::Child => exec_child(&argv, &redirects, foreground),
    }
}

fn exec_child(argv: &[CString], redirects: &Redirects, foreground: bool) -> ! {
    if let Err(e) = redirects.apply() {
        eprintln!("{}", e);
        exit_child();
    }

    reset_signal_handling(foreground);

    match unistd::execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(e) => error!("execvp {:?}: {}", argv[0], e),
    }
    println!("{}: not valid file or directory", argv[0].to_string_lossy());
    exit_child()
}

/// A foreground child can be interrupted; a background child keeps the
/// shell's ignored SIGINT. No child reacts to SIGTSTP.
fn reset_signal_handling(foreground: bool) {
    if foreground {
        let temp_result = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) };
        log_if_err!(temp_result, "failed to restore SIGINT");
    }
    let temp_result = unsafe { signal::signal(Signal::SIGTSTP, SigHandler::SigIgn) };
    log_if_err!(temp_result, "failed to ignore SIGTSTP");
}

fn exit_child() -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    process::exit(CHILD_FAILURE_EXIT_STATUS)
}
