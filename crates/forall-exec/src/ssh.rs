//! Remote command execution through an external `ssh` client

use std::io::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

use crate::error::ExecError;
use crate::pty::{Pty, PtyProcess, finish_line};
use crate::result::classify_exit;
use crate::traits::RemoteExecutor;

/// Default transport program
pub const DEFAULT_PROGRAM: &str = "ssh";

/// How the transport program is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Program to run, looked up in `PATH`
    pub program: String,
    /// Extra options, each passed as `-o <option>`
    pub options: Vec<String>,
    /// Remote user, passed as `-l <user>`
    pub user: Option<String>,
    /// Whether to ask for a remote terminal with `-t`
    pub allocate_tty: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            options: Vec::new(),
            user: None,
            allocate_tty: true,
        }
    }
}

impl TransportConfig {
    /// Create a configuration for `program` with default flags
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Add a `-o` option
    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Set the remote user
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Enable or disable remote terminal allocation
    #[must_use]
    pub fn with_tty(mut self, allocate_tty: bool) -> Self {
        self.allocate_tty = allocate_tty;
        self
    }

    /// Build the full argument vector, program name first
    ///
    /// `-n` keeps the transport off local stdin, `-q` silences its banners
    /// and `-t` requests a remote terminal. The remote command follows `--`
    /// word for word.
    #[must_use]
    pub fn build_args(&self, host: &str, command: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(8 + 2 * self.options.len() + command.len());

        args.push(self.program.clone());
        args.push("-n".to_string());
        args.push("-q".to_string());
        if self.allocate_tty {
            args.push("-t".to_string());
        }
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        if let Some(user) = &self.user {
            args.push("-l".to_string());
            args.push(user.clone());
        }
        args.push(host.to_string());
        args.push("--".to_string());
        args.extend(command.iter().cloned());

        args
    }
}

/// Executor that runs the transport program once per host
///
/// Each run gets its own pseudo-terminal, so commands on the remote side see
/// an interactive terminal and their output is relayed byte for byte.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    transport: TransportConfig,
}

impl SshExecutor {
    /// Create a new executor
    #[must_use]
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }

    /// Get the transport configuration
    #[must_use]
    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Start the transport for `host` on a new pseudo-terminal
    fn start(&self, host: &str, command: &[String]) -> Result<PtyProcess, ExecError> {
        let args = self.transport.build_args(host, command);
        info!(args = %quote_args(&args), "running transport");

        let pty = Pty::open()?;
        if let Some(path) = pty.slave_path() {
            debug!(pty = %path.display(), "allocated pseudo-terminal");
        }

        pty.spawn(&self.transport.program, &args[1..])
    }

    /// Relay output until the transport closes the terminal, then reap it
    async fn finish(
        &self,
        process: &mut PtyProcess,
        out: &mut (dyn Write + Send),
        last: &mut Option<u8>,
    ) -> Result<(), ExecError> {
        process.relay(out, last).await?;
        let status = process.wait().await?;
        debug!(status = %status, "transport exited");
        classify_exit(status, &self.transport.program)
    }

    /// Run the command on one host, optionally bounded by `limit`
    #[instrument(skip(self, command, out), fields(program = %self.transport.program))]
    async fn execute(
        &self,
        host: &str,
        command: &[String],
        out: &mut (dyn Write + Send),
        limit: Option<Duration>,
    ) -> Result<(), ExecError> {
        let start = Instant::now();
        let mut process = self.start(host, command)?;
        let mut last = None;

        let result = match limit {
            None => self.finish(&mut process, out, &mut last).await,
            Some(limit) => {
                let bounded = timeout(limit, self.finish(&mut process, out, &mut last)).await;
                match bounded {
                    Ok(result) => result,
                    Err(_) => {
                        error!(elapsed = ?start.elapsed(), timeout = ?limit, "host timed out");
                        process.kill().await;
                        Err(ExecError::Timeout { timeout: limit })
                    }
                }
            }
        };

        // Output errors leave nothing worth tidying up
        if !matches!(result, Err(ExecError::Output(_))) {
            finish_line(out, last)?;
        }

        debug!(duration = ?start.elapsed(), ok = result.is_ok(), "host finished");
        result
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(
        &self,
        host: &str,
        command: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<(), ExecError> {
        self.execute(host, command, out, None).await
    }

    async fn run_with_timeout(
        &self,
        host: &str,
        command: &[String],
        out: &mut (dyn Write + Send),
        timeout: Duration,
    ) -> Result<(), ExecError> {
        self.execute(host, command, out, Some(timeout)).await
    }

    fn executor_type(&self) -> &'static str {
        "ssh"
    }
}

/// Render arguments as `{arg} {arg} ...` so empty and spaced words show up
fn quote_args(args: &[String]) -> String {
    args.iter()
        .map(|a| format!("{{{a}}}"))
        .collect::<Vec<_>>()
        .join(" ")
}
