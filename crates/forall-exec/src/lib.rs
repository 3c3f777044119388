//! forall-exec: Remote execution through a local pseudo-terminal
//!
//! Runs the remote-login transport (normally `ssh`) for one host at a time,
//! relays its terminal output and classifies how it exited.

pub mod error;
pub mod pty;
pub mod result;
pub mod ssh;
pub mod traits;

pub use error::ExecError;
pub use ssh::{SshExecutor, TransportConfig};
pub use traits::RemoteExecutor;
