//! Host and exclusion sets

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HostsError;
use crate::name::HostName;
use crate::parse::parse_host_line;

/// Name of the list read when no hosts or lists are given
pub const DEFAULT_LIST: &str = "all";

/// Ordered, duplicate-free set of hosts to run on, plus the hosts to skip
///
/// Hosts keep the order in which they were first seen. Adding a name that
/// is already present does nothing.
#[derive(Debug, Clone, Default)]
pub struct HostSet {
    /// Hosts to run on
    hosts: Vec<HostName>,
    /// Hosts to exclude
    nots: Vec<HostName>,
    /// Host list files that contributed at least one host
    host_lists: Vec<PathBuf>,
    /// Exclusion list files that contributed at least one host
    not_host_lists: Vec<PathBuf>,
    /// Directories searched for relative list names
    list_dirs: Vec<PathBuf>,
}

impl HostSet {
    /// Create an empty set that opens list files exactly as named
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set that also looks for list files in `list_dirs`
    #[must_use]
    pub fn with_list_dirs(list_dirs: Vec<PathBuf>) -> Self {
        Self {
            list_dirs,
            ..Self::default()
        }
    }

    /// Add a host unless it is already present
    ///
    /// Returns `true` if the host was inserted.
    pub fn add_host(&mut self, host: impl Into<HostName>) -> bool {
        insert_unique(&mut self.hosts, host.into())
    }

    /// Add a host to the exclusion set unless it is already present
    pub fn add_not_host(&mut self, host: impl Into<HostName>) -> bool {
        insert_unique(&mut self.nots, host.into())
    }

    /// Add every host named in a list file
    ///
    /// A file that cannot be read is logged and contributes nothing. The
    /// file is remembered only if at least one host name was found in it.
    /// Returns the number of host names read, duplicates included.
    pub fn add_list(&mut self, name: impl AsRef<Path>) -> usize {
        let path = self.resolve_list(name.as_ref());
        let count = read_list_or_warn(&mut self.hosts, &path);
        if count > 0 {
            self.host_lists.push(path);
        }
        count
    }

    /// Add every host named in a list file to the exclusion set
    ///
    /// See [`HostSet::add_list`].
    pub fn add_not_list(&mut self, name: impl AsRef<Path>) -> usize {
        let path = self.resolve_list(name.as_ref());
        let count = read_list_or_warn(&mut self.nots, &path);
        if count > 0 {
            self.not_host_lists.push(path);
        }
        count
    }

    /// Remove every excluded host from the host set
    pub fn filter(&mut self) {
        let before = self.hosts.len();
        let nots = &self.nots;
        self.hosts = std::mem::take(&mut self.hosts)
            .into_iter()
            .filter(|host| !nots.contains(host))
            .collect();
        debug!(
            removed = before - self.hosts.len(),
            remaining = self.hosts.len(),
            "applied exclusions"
        );
    }

    /// Sort hosts and excluded hosts by name
    pub fn sort(&mut self) {
        self.hosts.sort();
        self.nots.sort();
    }

    /// Column width for host names
    ///
    /// The smallest multiple of eight that is longer than every host name.
    #[must_use]
    pub fn name_width(&self) -> usize {
        let longest = self.hosts.iter().map(HostName::len).max().unwrap_or(0);
        (longest + 8) - ((longest + 8) % 8)
    }

    /// Hosts to run on
    #[must_use]
    pub fn hosts(&self) -> &[HostName] {
        &self.hosts
    }

    /// Excluded hosts
    #[must_use]
    pub fn not_hosts(&self) -> &[HostName] {
        &self.nots
    }

    /// Host list files that contributed hosts
    #[must_use]
    pub fn host_lists(&self) -> &[PathBuf] {
        &self.host_lists
    }

    /// Exclusion list files that contributed hosts
    #[must_use]
    pub fn not_host_lists(&self) -> &[PathBuf] {
        &self.not_host_lists
    }

    /// Number of hosts to run on
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether there are no hosts to run on
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Find the file a list name refers to
    ///
    /// Absolute names, and names of files that exist as given, are used
    /// unchanged.
    /// Otherwise the search directories are tried in order, and the name is
    /// returned as given if none of them has it.
    fn resolve_list(&self, name: &Path) -> PathBuf {
        if name.is_absolute() || name.is_file() {
            return name.to_path_buf();
        }
        self.list_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| name.to_path_buf())
    }
}

fn insert_unique(list: &mut Vec<HostName>, host: HostName) -> bool {
    if list.contains(&host) {
        return false;
    }
    list.push(host);
    true
}

fn read_list_or_warn(list: &mut Vec<HostName>, path: &Path) -> usize {
    match read_list(list, path) {
        Ok(count) => {
            debug!(path = %path.display(), count, "read host list");
            count
        }
        Err(e) => {
            warn!("{e}");
            0
        }
    }
}

/// Read one list file, adding each host name not already in `list`
fn read_list(list: &mut Vec<HostName>, path: &Path) -> Result<usize, HostsError> {
    let file = File::open(path).map_err(|source| HostsError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut names_read = 0;

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| HostsError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        if let Some(host) = parse_host_line(&String::from_utf8_lossy(&line)) {
            insert_unique(list, host);
            names_read += 1;
        }
    }

    Ok(names_read)
}
