//! Classification of transport exit statuses

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use crate::error::ExecError;

/// Exit status reserved for "the transport could not be started"
///
/// A child that fails to set up its terminal or exec the transport exits
/// with this code, so it is reported the same way as a spawn failure.
pub const EXEC_FAILURE_STATUS: i32 = 128;

/// Turn the transport's exit status into a host result
///
/// # Errors
/// Returns the failure reason for any status other than a clean exit 0
pub fn classify_exit(status: ExitStatus, program: &str) -> Result<(), ExecError> {
    match (status.code(), status.signal()) {
        (Some(0), _) => Ok(()),
        (Some(EXEC_FAILURE_STATUS), _) => Err(ExecError::CannotExec {
            program: program.to_string(),
        }),
        (Some(code), _) => Err(ExecError::ExitCode(code)),
        (None, Some(signal)) => Err(ExecError::Signalled(signal)),
        (None, None) => Err(ExecError::Wait(format!("unrecognised exit status {status}"))),
    }
}
