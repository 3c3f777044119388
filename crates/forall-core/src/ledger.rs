//! Per-run record of successes and failures

use std::io::{self, Write};

use forall_hosts::HostName;

/// Outcome of running the command on one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The command exited 0
    Success(HostName),
    /// The command could not be run, or exited non-zero
    Failure(HostName, String),
}

impl ExecutionResult {
    /// Host this result is for
    #[must_use]
    pub fn host(&self) -> &HostName {
        match self {
            ExecutionResult::Success(host) | ExecutionResult::Failure(host, _) => host,
        }
    }
}

/// Successes and failures, in the order hosts were run
///
/// Append-only. Each run starts with an empty ledger.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    successes: Vec<HostName>,
    failures: Vec<(HostName, String)>,
}

impl Ledger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a host that succeeded
    pub fn record_success(&mut self, host: HostName) {
        self.successes.push(host);
    }

    /// Record a host that failed, with a short reason
    pub fn record_failure(&mut self, host: HostName, reason: impl Into<String>) {
        self.failures.push((host, reason.into()));
    }

    /// Record either kind of result
    pub fn record(&mut self, result: ExecutionResult) {
        match result {
            ExecutionResult::Success(host) => self.record_success(host),
            ExecutionResult::Failure(host, reason) => self.record_failure(host, reason),
        }
    }

    /// Hosts that succeeded
    #[must_use]
    pub fn successes(&self) -> &[HostName] {
        &self.successes
    }

    /// Hosts that failed, with reasons
    #[must_use]
    pub fn failures(&self) -> &[(HostName, String)] {
        &self.failures
    }

    /// Print the `Success:` and `Failure:` blocks
    ///
    /// Empty blocks are left out. Failed host names are padded to `width` so
    /// the reasons line up.
    ///
    /// # Errors
    /// Returns any error from writing to `out`
    pub fn summary(&self, out: &mut dyn Write, width: usize) -> io::Result<()> {
        writeln!(out, "\n----")?;
        if !self.successes.is_empty() {
            writeln!(out, "Success:")?;
            for host in &self.successes {
                writeln!(out, "\t{host}")?;
            }
        }
        if !self.failures.is_empty() {
            writeln!(out, "Failure:")?;
            for (host, reason) in &self.failures {
                writeln!(out, "\t{host:<width$} # {reason}")?;
            }
        }
        Ok(())
    }
}
