//! The `run`, `check`, and `dump` commands.

use thiserror::Error;

use weft_eval::{ConsoleClient, InterpreterBuilder, TraceSink};
use weft_ir::{Program, WeftError};

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Weft(#[from] WeftError),
}

/// Load, preprocess, and execute a script.
///
/// Holes are resolved interactively through the console client. With
/// `trace`, `debug` snapshots go to stdout instead of being discarded.
pub fn run_file(path: &str, trace: bool) -> Result<(), CliError> {
    let source = std::fs::read_to_string(path)?;
    let program = Program::load(&source).inspect_err(|err| report(err, &source))?;
    tracing::debug!(path, lines = program.len(), "loaded");
    let sink = if trace {
        TraceSink::Stdout
    } else {
        TraceSink::Silent
    };
    let mut interp = InterpreterBuilder::new(program)
        .completion(ConsoleClient)
        .trace_sink(sink)
        .build();
    interp.run().inspect_err(|err| report(err, &source))?;
    Ok(())
}

/// Load and classify only; report success or the first error.
pub fn check_file(path: &str) -> Result<(), CliError> {
    let source = std::fs::read_to_string(path)?;
    let program = Program::load(&source).inspect_err(|err| report(err, &source))?;
    println!(
        "{path}: {} lines, {} symbols",
        program.len(),
        program.symbols().count()
    );
    Ok(())
}

/// Print the classified program with line indices and the symbol table.
pub fn dump_file(path: &str) -> Result<(), CliError> {
    let source = std::fs::read_to_string(path)?;
    let program = Program::load(&source).inspect_err(|err| report(err, &source))?;
    for (index, instruction) in program.instructions().iter().enumerate() {
        println!("{index:>4}  {instruction}");
    }
    let mut symbols: Vec<(&str, usize)> = program.symbols().collect();
    symbols.sort_by_key(|&(_, index)| index);
    if !symbols.is_empty() {
        println!();
        for (name, index) in symbols {
            println!("{index:>4}  # {name}");
        }
    }
    Ok(())
}

/// Print an error with its source line when one is attributed.
fn report(err: &WeftError, source: &str) {
    eprintln!("error: {err}");
    if let Some(line) = err.line {
        if let Some(text) = source.lines().nth(line) {
            eprintln!("  {line:>4} | {}", text.trim_end());
        }
    }
}
