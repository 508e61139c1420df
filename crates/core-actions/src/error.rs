use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("output failed: {0}")]
    Output(#[from] io::Error),
    /// A registered command handler returned an error.
    #[error("command `{name}` failed: {error:#}")]
    Command { name: String, error: anyhow::Error },
    #[error("terminal mode change failed: {0:#}")]
    Terminal(anyhow::Error),
}

impl ConsoleError {
    pub fn is_command(&self) -> bool {
        matches!(self, ConsoleError::Command { .. })
    }
}
