//! Building the host set from command-line sources

use std::path::PathBuf;

use forall_hosts::HostSet;
use forall_hosts::set::DEFAULT_LIST;
use tracing::debug;

/// One place hosts come from, in command-line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    /// A host named directly
    Host(String),
    /// A host list file
    List(PathBuf),
    /// A host to exclude
    NotHost(String),
    /// A list file of hosts to exclude
    NotList(PathBuf),
}

/// Merge every source into a filtered host set
///
/// When no host or host list is named at all, the `all` list is read.
/// Exclusions are applied last, so their position among the sources does
/// not matter.
#[must_use]
pub fn resolve_hosts(sources: &[HostSource], list_dirs: Vec<PathBuf>) -> HostSet {
    let mut set = HostSet::with_list_dirs(list_dirs);
    let mut named = false;

    for source in sources {
        match source {
            HostSource::Host(host) => {
                set.add_host(host.as_str());
                named = true;
            }
            HostSource::List(path) => {
                set.add_list(path);
                named = true;
            }
            HostSource::NotHost(host) => {
                set.add_not_host(host.as_str());
            }
            HostSource::NotList(path) => {
                set.add_not_list(path);
            }
        }
    }

    if !named {
        debug!(list = DEFAULT_LIST, "no hosts named, using default list");
        set.add_list(DEFAULT_LIST);
    }

    set.filter();
    set
}
