//! Weft CLI library: the commands behind the `weft` binary.

pub mod commands;

pub use commands::{check_file, dump_file, run_file, CliError};
