use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use docopt::Docopt;
use log::{debug, error, LevelFilter};
use nix::unistd::Pid;
use serde_derive::Deserialize;
use smallsh::errors::Error;
use smallsh::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".smallsh_log";

const USAGE: &str = "
smallsh.

Usage:
    smallsh [options]
    smallsh [options] -c <command>
    smallsh [options] <file>
    smallsh (-h | --help)
    smallsh --version

Options:
    -h --help            Show this screen.
    --version            Show version.
    -c                   If the -c option is present, then commands are read from the first
                             non-option argument command.
    --log=<path>         File to write log to, defaults to ~/.smallsh_log
    --log-level=<level>  One of off, error, warn, info, debug, trace [default: trace]
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
    flag_log_level: String,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log, &args.flag_log_level);
    debug!("{:?}", args);

    if args.flag_version {
        println!("smallsh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin();
    }
}

/// Logging is best effort: the shell runs without a log if the file can't be opened.
fn init_logger(path: &Option<String>, level: &str) {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => {
            eprintln!("smallsh: unable to determine log file path, logging disabled");
            return;
        }
    };

    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("smallsh: unknown log level '{}', using trace", level);
        LevelFilter::Trace
    });

    let log_file = match fern::log_file(&log_path) {
        Ok(log_file) => log_file,
        Err(e) => {
            eprintln!(
                "smallsh: cannot open log file {}: {}",
                log_path.display(),
                e
            );
            return;
        }
    };

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            // read per record: forked children log under their own pid
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Pid::this(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(log_file)
        .apply();
    if let Err(e) = result {
        eprintln!("smallsh: failed to initialize logging: {}", e);
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let mut shell = Shell::new(ShellConfig::noninteractive())
        .unwrap_or_else(|e| display_error_and_exit(&e));

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_lines(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };

    match result {
        Ok(()) => shell.exit(),
        Err(e) => shell.abort(&e),
    }
}

fn execute_from_stdin() -> ! {
    let mut shell =
        Shell::new(ShellConfig::interactive()).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit()
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("smallsh: {}", error);
    process::exit(1);
}
