//! Remote executor trait

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;

/// Runs a command on one host, streaming its output to `out`
///
/// `Ok(())` means the host succeeded. Every `Err` is a failure for that
/// host; [`ExecError::is_fatal`] tells the caller whether to stop the run.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` on `host` and wait for it to finish
    async fn run(
        &self,
        host: &str,
        command: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<(), ExecError>;

    /// Run `command` on `host`, giving up after `timeout`
    async fn run_with_timeout(
        &self,
        host: &str,
        command: &[String],
        out: &mut (dyn Write + Send),
        timeout: Duration,
    ) -> Result<(), ExecError>;

    /// Short name for logs
    fn executor_type(&self) -> &'static str;
}
