//! Smallsh - Shell Module
//!
//! The Shell owns the state that outlives a single line: its configuration,
//! the `$$` expander and the exit status of the last foreground command.
//! Foreground-only mode lives in `signal_mode`, since its only writer is
//! the SIGTSTP handler.

use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process::{self, ExitStatus};

use failure::ResultExt;
use log::{debug, error, info};

use crate::core::{
    parser::{CommandLine, MAX_LINE_LENGTH},
    variable_expansion::VariableExpander,
};
use crate::errors::{Error, ErrorKind, Result};
use crate::util::SmallshExitStatusExt;

mod builtins;
mod execute_command;
mod job_control;
mod redirection;
mod signal_mode;

const PROMPT: &str = ": ";
const FATAL_ERROR_EXIT_STATUS: i32 = 1;

/// Smallsh Shell
#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
    expander: VariableExpander,
    /// Exit status of the last foreground command.
    last_exit_status: ExitStatus,
}

impl Shell {
    /// Constructs a new Shell, taking over SIGINT and SIGTSTP for the process.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        signal_mode::initialize_signal_handling()?;

        let shell = Shell {
            config,
            expander: VariableExpander::for_current_process(),
            last_exit_status: ExitStatus::from_success(),
        };

        info!("smallsh started up as pid {}", shell.expander.pid());
        Ok(shell)
    }

    pub fn last_exit_status(&self) -> ExitStatus {
        self.last_exit_status
    }

    /// Prints the prompt, if configured, and reads one line.
    /// Returns `None` when end of file is reached.
    pub fn prompt<R: BufRead>(&mut self, reader: &mut R) -> Result<Option<String>> {
        if self.config.display_prompt {
            let mut stdout = io::stdout();
            write!(stdout, "{}", PROMPT).context(ErrorKind::Io)?;
            stdout.flush().context(ErrorKind::Io)?;
        }

        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).context(ErrorKind::Io)?;
        if bytes_read == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    /// Parses and runs one line, then reports finished background jobs.
    ///
    /// Blank lines and comments return without touching any process.
    /// Syntax errors are reported here and are not returned.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        if builtins::is_noop(input) {
            return Ok(());
        }

        let mut stdout = io::stdout();
        let result = CommandLine::parse_with_limit(input, &self.expander, self.config.max_line_length)
            .and_then(|mut command| self.dispatch(&mut command, &mut stdout));

        let result = match result {
            Err(ref e) if is_syntax_error(e) => {
                eprintln!("smallsh: {}", e);
                Ok(())
            }
            other => other,
        };
        if result.as_ref().err().map_or(false, Error::is_fatal) {
            return result;
        }

        // Check the status of background jobs, reaping finished ones.
        let notification = job_control::do_job_notification(&mut stdout);
        result.and(notification)
    }

    /// Runs every line of a file.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut f = File::open(path).context(ErrorKind::Io)?;
        let mut buffer = String::new();
        f.read_to_string(&mut buffer).context(ErrorKind::Io)?;
        self.execute_lines(&buffer)
    }

    /// Runs every line of a `-c` command string.
    pub fn execute_lines(&mut self, input: &str) -> Result<()> {
        for line in input.lines() {
            if let Err(e) = self.execute_command_string(line) {
                if e.is_fatal() {
                    return Err(e);
                }
                report_error(&e);
            }
        }

        Ok(())
    }

    /// Runs lines from stdin until EOF is received.
    ///
    /// A fatal error terminates the shell with a failure status.
    pub fn execute_from_stdin(&mut self) {
        let stdin = io::stdin();
        let mut reader = stdin.lock();

        loop {
            let input = match self.prompt(&mut reader) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    report_error(&e);
                    continue;
                }
            };

            if let Err(e) = self.execute_command_string(&input) {
                if e.is_fatal() {
                    self.abort(&e);
                }
                report_error(&e);
            }
        }

        debug!("reached end of input");
    }

    /// Exit the shell with status 0.
    ///
    /// Finished background jobs are reported first. Jobs still running are
    /// left to the operating system.
    pub fn exit(&mut self) -> ! {
        let temp_result = job_control::do_job_notification(&mut io::stdout());
        log_if_err!(temp_result, "final job notification");

        info!("smallsh has shut down");
        process::exit(0);
    }

    /// Exit the shell after an unrecoverable error.
    pub fn abort(&mut self, e: &Error) -> ! {
        error!("fatal: {}", e);
        eprintln!("smallsh: {}", e);
        process::exit(FATAL_ERROR_EXIT_STATUS);
    }

    fn dispatch(&mut self, command: &mut CommandLine, stdout: &mut dyn Write) -> Result<()> {
        let builtin = match command.program() {
            Some(program) => builtins::is_builtin(program),
            None => return Ok(()),
        };

        if builtin {
            // builtins always run in the shell process
            command.take_background();
            let (program, args) = command
                .words()
                .split_first()
                .ok_or_else(|| Error::syntax("missing command"))?;
            return builtins::run(self, program, args, stdout);
        }

        if let Some(status) = execute_command::run_external_command(command, stdout)? {
            self.last_exit_status = status;
        }
        Ok(())
    }
}

fn is_syntax_error(e: &Error) -> bool {
    match *e.kind() {
        ErrorKind::Syntax(_) => true,
        _ => false,
    }
}

fn report_error(e: &Error) {
    error!("{}", e);
    eprintln!("smallsh: {}", e);
}

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if the `: ` prompt is printed before each line is read.
    display_prompt: bool,

    /// Longest accepted input line, in bytes.
    max_line_length: usize,
}

impl ShellConfig {
    /// Creates an interactive shell, i.e. one that prompts for input.
    pub fn interactive() -> Self {
        Self {
            display_prompt: true,
            ..Default::default()
        }
    }

    /// Creates a noninteractive shell for `-c` strings and script files.
    pub fn noninteractive() -> Self {
        Default::default()
    }

    pub fn max_line_length(self, max_line_length: usize) -> Self {
        Self {
            max_line_length,
            ..self
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            display_prompt: false,
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}
