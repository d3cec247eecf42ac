//! Interactive prompts for missing backend fields.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::validate::ValidationResult;

/// True when stdin is a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Ask for every missing required field, one line each.
///
/// A blank answer stops with [`BackendError::BackendIncomplete`]; end of
/// input stops with [`BackendError::PromptAborted`].
pub fn prompt_missing_fields<R, W>(
    config: &mut BackendConfig,
    validation: &ValidationResult,
    input: &mut R,
    output: &mut W,
) -> BackendResult<()>
where
    R: BufRead,
    W: Write,
{
    for field in validation.missing_fields.iter().filter(|f| f.required) {
        writeln!(output)?;
        writeln!(output, "! Missing required field: {}", field.name)?;
        writeln!(output, "   {}", field.description)?;
        writeln!(output, "   Example:  {}", field.example)?;
        writeln!(output, "   CLI flag: {}", field.flag_name)?;
        if let Some(env) = field.env_var_name {
            writeln!(output, "   Env var:  {}", env)?;
        }
        write!(output, "Enter {}: ", field.name)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(BackendError::PromptAborted(format!(
                "no input while reading {}",
                field.name
            )));
        }

        let value = line.trim();
        if value.is_empty() {
            return Err(BackendError::BackendIncomplete(validation.clone()));
        }
        config.set_field(field.name, value);
    }
    Ok(())
}

/// [`prompt_missing_fields`] on the process's stdin and stdout.
pub fn prompt_missing_fields_stdin(
    config: &mut BackendConfig,
    validation: &ValidationResult,
) -> BackendResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_missing_fields(config, validation, &mut input, &mut output)
}
