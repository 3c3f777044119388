//! forall-core: run orchestration
//!
//! Resolves the host set, then drives the remote command across it one
//! host at a time, keeping a ledger of successes and failures.

pub mod config;
pub mod driver;
pub mod error;
pub mod ledger;
pub mod report;
pub mod sources;

pub use config::{FileConfig, RunConfiguration};
pub use driver::{Outcome, RunDriver, run};
pub use error::CoreError;
pub use ledger::{ExecutionResult, Ledger};
pub use sources::{HostSource, resolve_hosts};
