use std::env;
use std::path::PathBuf;

use log::warn;

use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        let dir = match args.first() {
            Some(dir) => PathBuf::from(dir.as_ref()),
            None => home_dir()
                .ok_or_else(|| Error::builtin_command(format!("{}: HOME not set", Self::NAME), 1))?,
        };

        env::set_current_dir(&dir).map_err(|e| {
            warn!("cd to {} failed: {}", dir.display(), e);
            Error::builtin_command(format!("Directory {} not found.", dir.display()), 1)
        })
    }
}

/// `$HOME`, falling back to the platform's notion of the home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(::dirs::home_dir)
}
