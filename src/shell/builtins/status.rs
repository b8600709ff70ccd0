use crate::shell::builtins::{self, prelude::*};

#[derive(Debug)]
pub struct Status;

impl builtins::BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_exit_status().describe()).context(ErrorKind::Io)?;
        Ok(())
    }
}
