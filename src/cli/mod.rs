pub mod output;
pub mod render;
pub mod session;
mod shell;
pub mod table;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::errors::LedgerError;

pub use session::{ChatSession, LoopControl};
pub use shell::run_cli;

/// Environment variable that switches the shell to line-by-line stdin.
pub const SCRIPT_ENV: &str = "POCKET_LEDGER_CLI_SCRIPT";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
