use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Exit;

impl builtins::BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    /// Arguments are ignored; the shell always exits with status 0.
    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        shell.exit()
    }
}
