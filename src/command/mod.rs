mod commands;
mod history;

use thiserror::Error;

pub use commands::StackCommand;
pub use history::{CommandHistory, HistoryEntry};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command cannot be executed in the current state
    #[error("command cannot be applied to the current stroke stack")]
    InvalidState,
}
