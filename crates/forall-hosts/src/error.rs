//! Error types for forall-hosts

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading host list files
#[derive(Error, Debug)]
pub enum HostsError {
    /// List file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path that was tried
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// List file could not be read to the end
    #[error("error reading {}: {source}", path.display())]
    Read {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
