//! Foreground-only mode, toggled by SIGTSTP.
//!
//! The shell ignores SIGINT itself and catches SIGTSTP. Each SIGTSTP flips
//! the foreground-only flag and writes a fixed message straight to fd 1.
//! While the flag is set a trailing `&` is consumed but ignored.

use std::sync::atomic::{AtomicBool, Ordering};

use failure::ResultExt;
use log::debug;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::{ErrorKind, Result};

const ENTER_MESSAGE: &[u8] = b"Entering foreground-only mode ('&' ignored)\n";
const EXIT_MESSAGE: &[u8] = b"Exiting foreground-only mode\n";

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

/// Ignore SIGINT and route SIGTSTP to the mode toggle.
pub fn initialize_signal_handling() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
    // SA_RESTART keeps blocking reads and waits going across a toggle
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );

    unsafe {
        signal::sigaction(Signal::SIGINT, &ignore).context(ErrorKind::Nix)?;
        signal::sigaction(Signal::SIGTSTP, &toggle).context(ErrorKind::Nix)?;
    }

    debug!("installed SIGINT and SIGTSTP dispositions");
    Ok(())
}

/// Returns `true` if requests to run in the background are currently ignored.
pub fn is_foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Flips the mode and returns the message announcing the new one.
///
/// Only touches an atomic, so it may run inside the signal handler.
fn toggle_foreground_only() -> &'static [u8] {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    if was_foreground_only {
        EXIT_MESSAGE
    } else {
        ENTER_MESSAGE
    }
}

extern "C" fn handle_sigtstp(_: libc::c_int) {
    let message = toggle_foreground_only();
    // write(2) is async-signal-safe and unbuffered, unlike `print!`
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr() as *const libc::c_void,
            message.len(),
        );
    }
}
