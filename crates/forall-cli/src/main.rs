//! for-all CLI
//!
//! Runs one command on many hosts over ssh, one host at a time

use std::io::{self, Write};
use std::process::ExitCode;

use clap::CommandFactory;
use color_eyre::Result;
use eyre::WrapErr;
use forall_core::{CoreError, FileConfig, Outcome, resolve_hosts};
use forall_exec::SshExecutor;
use tracing::{Subscriber, debug};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

use cli::Cli;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let (cli, matches) = match Cli::parse_with_matches(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => {
            // --help and --version are reported through clap's error path
            e.print()?;
            return Ok(if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    // The file may set the log level, so loading it logs through a
    // subscriber that only knows about RUST_LOG and -D
    let bootstrap = stderr_subscriber(log_filter(&cli, None));
    let file = tracing::subscriber::with_default(bootstrap, || load_config(&cli))
        .wrap_err("cannot load configuration")?;
    stderr_subscriber(log_filter(&cli, Some(&file))).init();

    let config = cli.run_configuration(&file);
    let sources = cli.host_sources(&matches);
    debug!(sources = sources.len(), "resolving hosts");
    let set = resolve_hosts(&sources, file.list_dirs());

    let executor = SshExecutor::new(config.transport.clone());
    let mut stdout = io::stdout();

    match forall_core::run(&config, set, &executor, &mut stdout).await {
        Ok(Outcome::Listed | Outcome::Completed(_)) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            let _ = stdout.flush();
            report_error(&e)?;
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

/// Use `--config` when given, otherwise search the default locations
fn load_config(cli: &Cli) -> Result<FileConfig, CoreError> {
    match &cli.config {
        Some(path) => FileConfig::load(path),
        None => FileConfig::load_default(),
    }
}

/// Log filter: `RUST_LOG` wins over `-D`, which wins over the config file
fn log_filter(cli: &Cli, file: Option<&FileConfig>) -> EnvFilter {
    let level = match cli.debug_level() {
        0 => file
            .and_then(|file| file.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL),
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn stderr_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish()
}

fn report_error(e: &CoreError) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "for-all: {e}")?;
    if matches!(e, CoreError::NoCommand) {
        writeln!(stderr, "{}", Cli::command().render_usage())?;
    }
    Ok(())
}
