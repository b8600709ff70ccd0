use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use nix::sys::wait::WaitStatus;

/// Smallsh Utility Extensions for `ExitStatus`
pub trait SmallshExitStatusExt: Sized {
    /// Create an ExitStatus to indicate *successful* program execution.
    fn from_success() -> Self;

    /// Create an ExitStatus from an exit code.
    fn from_status(code: i32) -> Self;

    /// Create an ExitStatus for a process terminated by `signal`.
    fn from_signal(signal: i32) -> Self;

    /// Converts a reaped `WaitStatus`; `None` if the process has not
    /// exited or been terminated.
    fn from_wait_status(status: WaitStatus) -> Option<Self>;

    /// The status line shown by `status` and in background job reports.
    fn describe(&self) -> String;
}

impl SmallshExitStatusExt for ExitStatus {
    /// # Examples
    /// ```rust
    /// use smallsh::SmallshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_success().success());
    /// ```
    fn from_success() -> Self {
        ExitStatus::from_status(0)
    }

    /// # Examples
    /// ```rust
    /// use smallsh::SmallshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert_eq!(ExitStatus::from_status(2).code(), Some(2));
    /// assert!(!ExitStatus::from_status(1).success());
    /// ```
    fn from_status(code: i32) -> Self {
        ExitStatus::from_raw((code & 0xff) << 8)
    }

    /// # Examples
    /// ```rust
    /// use smallsh::SmallshExitStatusExt;
    /// use std::os::unix::process::ExitStatusExt;
    /// use std::process::ExitStatus;
    /// let status = ExitStatus::from_signal(9);
    /// assert_eq!(status.code(), None);
    /// assert_eq!(status.signal(), Some(9));
    /// ```
    fn from_signal(signal: i32) -> Self {
        ExitStatus::from_raw(signal & 0x7f)
    }

    fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::from_status(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitStatus::from_signal(signal as i32)),
            _ => None,
        }
    }

    /// # Examples
    /// ```rust
    /// use smallsh::SmallshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert_eq!(ExitStatus::from_status(2).describe(), "Exited with value: 2");
    /// assert_eq!(ExitStatus::from_signal(15).describe(), "Terminated by signal: 15");
    /// ```
    fn describe(&self) -> String {
        match (self.code(), self.signal()) {
            (Some(code), _) => format!("Exited with value: {}", code),
            (None, Some(signal)) => format!("Terminated by signal: {}", signal),
            (None, None) => format!("Unknown status: {}", self.into_raw()),
        }
    }
}
