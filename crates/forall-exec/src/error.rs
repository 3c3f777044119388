//! Error types for forall-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running the command on one host
///
/// The `Display` text of each variant is the reason shown in the failure
/// summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// No pseudo-terminal could be allocated
    #[error("cannot allocate pseudo-terminal: {0}")]
    PtyAllocation(String),

    /// The transport process could not be forked
    #[error("cannot fork: {0}")]
    CannotFork(String),

    /// The transport program could not be started
    #[error("cannot exec {program}")]
    CannotExec {
        /// Transport program name
        program: String,
    },

    /// The transport exited with a non-zero status
    #[error("exit code ({0})")]
    ExitCode(i32),

    /// The transport was killed by a signal
    #[error("killed by signal {0}")]
    Signalled(i32),

    /// The host did not finish in time
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Waiting for the transport process failed
    #[error("cannot wait for transport: {0}")]
    Wait(String),

    /// Relayed output could not be written locally
    #[error("cannot write output: {0}")]
    Output(String),
}

impl ExecError {
    /// Check if the error must stop the whole run
    ///
    /// Everything else only fails the current host.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Wait(_) | ExecError::Output(_))
    }
}
