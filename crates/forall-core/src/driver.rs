//! Sequential run across the host set

use std::io::Write;

use forall_exec::RemoteExecutor;
use forall_hosts::{HostName, HostSet};
use tracing::{info, instrument};

use crate::config::RunConfiguration;
use crate::error::CoreError;
use crate::ledger::{ExecutionResult, Ledger};
use crate::report;

/// How a run ended
#[derive(Debug)]
pub enum Outcome {
    /// Only listings were printed
    Listed,
    /// The command ran on every host
    Completed(Ledger),
}

/// Runs the command on each host in turn and keeps the ledger
///
/// A host's transport has exited before the next host is started.
pub struct RunDriver<'a> {
    config: &'a RunConfiguration,
    executor: &'a dyn RemoteExecutor,
    ledger: Ledger,
}

impl std::fmt::Debug for RunDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunDriver")
            .field("config", &self.config)
            .field("executor", &self.executor.executor_type())
            .field("ledger", &self.ledger)
            .finish()
    }
}

impl<'a> RunDriver<'a> {
    /// Create a driver with an empty ledger
    #[must_use]
    pub fn new(config: &'a RunConfiguration, executor: &'a dyn RemoteExecutor) -> Self {
        Self {
            config,
            executor,
            ledger: Ledger::new(),
        }
    }

    /// Run every host in `set`, forwards or in reverse
    ///
    /// # Errors
    /// Returns `CoreError::Exec` or `CoreError::Output` if the run cannot
    /// continue. Hosts that fail are recorded, not returned as errors.
    pub async fn run(
        mut self,
        set: &HostSet,
        out: &mut (dyn Write + Send),
    ) -> Result<Ledger, CoreError> {
        let width = set.name_width();
        let order: Vec<&HostName> = if self.config.reverse {
            set.hosts().iter().rev().collect()
        } else {
            set.hosts().iter().collect()
        };

        info!(
            hosts = order.len(),
            executor = self.executor.executor_type(),
            "starting run"
        );

        for host in order {
            self.do_host(host, width, out).await?;
        }

        info!(
            succeeded = self.ledger.successes().len(),
            failed = self.ledger.failures().len(),
            "run finished"
        );
        Ok(self.ledger)
    }

    #[instrument(skip_all, fields(host = %host))]
    async fn do_host(
        &mut self,
        host: &HostName,
        width: usize,
        out: &mut (dyn Write + Send),
    ) -> Result<(), CoreError> {
        self.announce(host, width, out)?;

        let command = &self.config.command;
        let result = match self.config.timeout {
            Some(limit) => {
                self.executor
                    .run_with_timeout(host.as_str(), command, out, limit)
                    .await
            }
            None => self.executor.run(host.as_str(), command, out).await,
        };

        let outcome = match result {
            Ok(()) => {
                info!("host succeeded");
                ExecutionResult::Success(host.clone())
            }
            Err(e) if e.is_fatal() => return Err(CoreError::Exec(e)),
            Err(e) => {
                info!(reason = %e, "host failed");
                ExecutionResult::Failure(host.clone(), e.to_string())
            }
        };
        self.ledger.record(outcome);

        if !self.config.quiet && !self.config.single {
            self.ledger.summary(out, width)?;
        }
        Ok(())
    }

    /// Print the host header before its output
    ///
    /// Single-line mode leaves the cursor after the padded name so the
    /// remote output follows on the same line.
    // TODO: detect hosts that print nothing in single-line mode and say so
    fn announce(
        &self,
        host: &HostName,
        width: usize,
        out: &mut (dyn Write + Send),
    ) -> Result<(), CoreError> {
        if self.config.quiet {
            return Ok(());
        }
        if self.config.single {
            write!(out, "{host:<width$}")?;
        } else {
            write!(out, "\n-- {host}\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Run the whole plan: debug dump, sort, listings or execution
///
/// # Errors
/// Returns `CoreError::NoCommand` if there is nothing to run,
/// `CoreError::NoHosts` if the set is empty, and the driver's errors
pub async fn run(
    config: &RunConfiguration,
    mut set: HostSet,
    executor: &dyn RemoteExecutor,
    out: &mut (dyn Write + Send),
) -> Result<Outcome, CoreError> {
    report::debug_dump(config, &set, out)?;

    if config.sort {
        set.sort();
    }

    if config.is_listing() {
        if config.list_only {
            report::list_hosts(&set, out)?;
        }
        if config.files_only {
            report::list_files(&set, out)?;
        }
        out.flush()?;
        return Ok(Outcome::Listed);
    }

    if config.command.is_empty() {
        return Err(CoreError::NoCommand);
    }
    if set.is_empty() {
        return Err(CoreError::NoHosts);
    }

    let ledger = RunDriver::new(config, executor).run(&set, out).await?;
    out.flush()?;
    Ok(Outcome::Completed(ledger))
}
