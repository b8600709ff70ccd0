//! Waiting on the foreground process and reaping finished background jobs.
//!
//! The shell keeps no job table. Background jobs are found by asking the
//! kernel for any child with a pending state change.

use std::io::Write;
use std::process::ExitStatus;

use failure::{Fail, ResultExt};
use log::{debug, info};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::errors::{ErrorKind, Result};
use crate::util::SmallshExitStatusExt;

/// Blocks until `pid` exits or is terminated by a signal.
pub fn wait_for_job(pid: Pid) -> Result<ExitStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(wait_status) => {
                if let Some(status) = ExitStatus::from_wait_status(wait_status) {
                    debug!("foreground process {} finished: {}", pid, status.describe());
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}

/// Announces a freshly started background job without waiting on it.
///
/// A job that finished before the shell got here is reported as done
/// right away, since the poll has already reaped it.
pub fn put_job_in_background(pid: Pid, stdout: &mut dyn Write) -> Result<()> {
    let finished = match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(wait_status) => ExitStatus::from_wait_status(wait_status),
        Err(Errno::EINTR) => None,
        Err(e) => return Err(e.context(ErrorKind::Nix).into()),
    };

    writeln!(stdout, "Background process ID is {}", pid).context(ErrorKind::Io)?;
    if let Some(status) = finished {
        report_done(stdout, pid, status)?;
    }

    Ok(())
}

/// Reaps every child that has already finished, reporting each one.
///
/// Never blocks.
pub fn do_job_notification(stdout: &mut dyn Write) -> Result<()> {
    loop {
        match wait::waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(()),
            Ok(wait_status) => {
                if let (Some(pid), Some(status)) =
                    (wait_status.pid(), ExitStatus::from_wait_status(wait_status))
                {
                    report_done(stdout, pid, status)?;
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}

fn report_done(stdout: &mut dyn Write, pid: Pid, status: ExitStatus) -> Result<()> {
    info!("background process {} done: {}", pid, status.describe());
    writeln!(stdout, "{}", done_message(pid, status)).context(ErrorKind::Io)?;
    Ok(())
}

fn done_message(pid: Pid, status: ExitStatus) -> String {
    format!("Background process {} is done: {}", pid, status.describe())
}
