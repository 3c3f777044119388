//! forall-hosts: host set resolution
//!
//! Gathers host names from command-line arguments and list files, removes
//! duplicates, applies exclusions and sorts.

pub mod error;
pub mod name;
pub mod parse;
pub mod set;

pub use error::HostsError;
pub use name::HostName;
pub use parse::parse_host_line;
pub use set::HostSet;
