//! Configuration types and loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use forall_exec::TransportConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::CoreError;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "FORALL_CONFIG";

/// Everything a run needs, fixed before the first host is contacted
#[derive(Debug, Clone, Default)]
pub struct RunConfiguration {
    /// How the transport is invoked
    pub transport: TransportConfig,
    /// Remote command and its arguments
    pub command: Vec<String>,
    /// Do not print host headers or summaries
    pub quiet: bool,
    /// One line per host, prefixed with the host name
    pub single: bool,
    /// Sort hosts by name before running
    pub sort: bool,
    /// Run hosts in reverse order
    pub reverse: bool,
    /// Print the host sets and exit
    pub list_only: bool,
    /// Print the list files read and exit
    pub files_only: bool,
    /// Diagnostic verbosity
    pub debug: u8,
    /// Upper bound on each host's run
    pub timeout: Option<Duration>,
}

impl RunConfiguration {
    /// Whether only listings were asked for
    #[must_use]
    pub fn is_listing(&self) -> bool {
        self.list_only || self.files_only
    }
}

/// Settings read from `for-all.toml`
///
/// Command-line flags take precedence over everything here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Transport program
    pub ssh_program: Option<String>,
    /// Transport options placed before any given on the command line
    pub ssh_options: Vec<String>,
    /// Directories searched for list files
    pub list_dirs: Option<Vec<PathBuf>>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Per-host timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
            .map_err(|e| CoreError::ConfigError(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns the TOML error if the text is malformed or has unknown keys
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `FORALL_CONFIG` or the default paths, or use defaults
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` if a file exists but is unusable
    pub fn load_default() -> Result<Self, CoreError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            debug!(path = %path, env = CONFIG_ENV, "loading configuration");
            return Self::load(Path::new(&path));
        }

        let mut paths = vec![
            PathBuf::from("for-all.toml"),
            PathBuf::from("/etc/for-all/for-all.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("for-all/for-all.toml"));
        }

        for path in paths {
            if path.exists() {
                debug!(path = %path.display(), "loading configuration");
                return Self::load(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Directories to search for list files
    #[must_use]
    pub fn list_dirs(&self) -> Vec<PathBuf> {
        self.list_dirs.clone().unwrap_or_else(default_list_dirs)
    }

    /// Transport settings from the file, before command-line overrides
    #[must_use]
    pub fn transport(&self) -> TransportConfig {
        let mut transport = TransportConfig::default();
        if let Some(program) = &self.ssh_program {
            transport.program.clone_from(program);
        }
        transport.options.clone_from(&self.ssh_options);
        transport
    }

    /// Per-host timeout, if configured
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `.`, `~/etc/for-all` and `/usr/local/etc/for-all`
#[must_use]
pub fn default_list_dirs() -> Vec<PathBuf> {
    let mut dirs_list = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join("etc/for-all"));
    }
    dirs_list.push(PathBuf::from("/usr/local/etc/for-all"));
    dirs_list
}
