//! Command-line arguments

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use forall_core::{FileConfig, HostSource, RunConfiguration};

const USAGE: &str = "for-all [OPTIONS] [HOSTS]... -- <COMMAND>...
       for-all [OPTIONS] [HOSTS]... --list-only
       for-all [OPTIONS] [HOSTS]... --files";

const AFTER_HELP: &str = "\
Hosts are given as arguments before the -- separator, or in list files
named with -H. With neither, the list file \"all\" is read. List files are
looked for as named, then in ., ~/etc/for-all and /usr/local/etc/for-all.
They hold one host per line; blank lines and # comments are ignored.";

#[derive(Parser, Debug)]
#[command(name = "for-all", version)]
#[command(about = "Run a command on many hosts over ssh, one at a time", long_about = None)]
#[command(override_usage = USAGE, after_help = AFTER_HELP)]
pub struct Cli {
    /// Hosts to run on
    #[arg(value_name = "HOSTS")]
    pub hosts: Vec<String>,

    /// File with a list of hosts, one per line
    #[arg(short = 'H', long = "host-list", value_name = "FILE")]
    pub host_lists: Vec<PathBuf>,

    /// Exclude a host
    #[arg(short = 'n', long = "not", value_name = "HOST")]
    pub nots: Vec<String>,

    /// Exclude the hosts in a list file
    #[arg(short = 'N', long = "not-list", value_name = "FILE")]
    pub not_lists: Vec<PathBuf>,

    /// Add "-o OPTION" to the ssh command line
    #[arg(
        short = 'o',
        long = "ssh-option",
        value_name = "OPTION",
        allow_hyphen_values = true
    )]
    pub ssh_options: Vec<String>,

    /// Use PROG as the ssh command
    #[arg(short = 's', long = "ssh-program", value_name = "PROG")]
    pub ssh_program: Option<String>,

    /// Sort the host list
    #[arg(short = 'S', long)]
    pub sort: bool,

    /// Run the hosts in reverse order
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Do not print host names or summaries
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Output on a single line per host, after the host name
    #[arg(short = '1', long)]
    pub single: bool,

    /// List the hosts and exit; no command is needed
    #[arg(short = 'L', long = "list-only")]
    pub list_only: bool,

    /// Show which list files were read and exit
    #[arg(short = 'F', long)]
    pub files: bool,

    /// Debug output; repeat or give a level for more
    #[arg(
        short = 'D',
        long = "debug",
        value_name = "LEVEL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1",
        action = ArgAction::Append
    )]
    pub debug: Vec<u8>,

    /// Do not ask ssh for a remote terminal
    #[arg(short = 'T', long = "no-tty")]
    pub no_tty: bool,

    /// Log in to the hosts as USER
    #[arg(short = 'u', long, value_name = "USER")]
    pub user: Option<String>,

    /// Give up on a host after SECS seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command to run on each host
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Parse arguments, keeping the matches for source ordering
    ///
    /// # Errors
    /// Returns the clap error for invalid usage, `--help` and `--version`
    pub fn parse_with_matches<I, T>(args: I) -> Result<(Self, ArgMatches), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let cli = Self::from_arg_matches(&matches)?;
        Ok((cli, matches))
    }

    /// Total debug level from every `-D` and `--debug=LEVEL`
    #[must_use]
    pub fn debug_level(&self) -> u8 {
        self.debug.iter().fold(0u8, |acc, level| acc.saturating_add(*level))
    }

    /// Host sources in the order they appeared on the command line
    #[must_use]
    pub fn host_sources(&self, matches: &ArgMatches) -> Vec<HostSource> {
        let mut sources: Vec<(usize, HostSource)> = Vec::new();

        let mut collect = |id: &str, items: Vec<HostSource>| {
            if let Some(indices) = matches.indices_of(id) {
                sources.extend(indices.zip(items));
            }
        };
        collect("hosts", self.hosts.iter().cloned().map(HostSource::Host).collect());
        collect(
            "host_lists",
            self.host_lists.iter().cloned().map(HostSource::List).collect(),
        );
        collect("nots", self.nots.iter().cloned().map(HostSource::NotHost).collect());
        collect(
            "not_lists",
            self.not_lists.iter().cloned().map(HostSource::NotList).collect(),
        );

        sources.sort_by_key(|(index, _)| *index);
        sources.into_iter().map(|(_, source)| source).collect()
    }

    /// Combine these arguments with the configuration file
    ///
    /// Arguments win. Transport options from the file come first.
    #[must_use]
    pub fn run_configuration(&self, file: &FileConfig) -> RunConfiguration {
        let mut transport = file.transport();
        if let Some(program) = &self.ssh_program {
            transport.program.clone_from(program);
        }
        transport.options.extend(self.ssh_options.iter().cloned());
        transport.user.clone_from(&self.user);
        transport.allocate_tty = !self.no_tty;

        RunConfiguration {
            transport,
            command: self.command.clone(),
            quiet: self.quiet,
            single: self.single,
            sort: self.sort,
            reverse: self.reverse,
            list_only: self.list_only,
            files_only: self.files,
            debug: self.debug_level(),
            timeout: self.timeout.map(Duration::from_secs).or_else(|| file.timeout()),
        }
    }
}
