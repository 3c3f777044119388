//! Core error types for forall-core

use forall_exec::ExecError;
use thiserror::Error;

/// Errors that stop a run
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// No remote command was given
    #[error("no command given")]
    NoCommand,

    /// Nothing left to run on after exclusions
    #[error("No hosts specified")]
    NoHosts,

    /// Configuration file could not be used
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Execution failed in a way that affects every host
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    /// Local output could not be written
    #[error("cannot write output: {0}")]
    Output(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Output(e.to_string())
    }
}

impl CoreError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::NoCommand | CoreError::ConfigError(_) => 1,
            CoreError::NoHosts => 3,
            CoreError::Exec(_) | CoreError::Output(_) => 5,
        }
    }
}
