//! Pseudo-terminal handling for the transport process
//!
//! The transport is started with a local pseudo-terminal as its standard
//! input, output and error, and as its controlling terminal. The parent keeps
//! only the controlling (master) side and reads everything the transport
//! writes from it.

use std::io::{self, Write};
use std::os::fd::{AsFd, OwnedFd};
use std::path::PathBuf;
use std::process::Stdio;

use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::pty::{OpenptyResult, openpty};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::ExecError;

/// Size of each read from the master side
const RELAY_BUFFER_SIZE: usize = 4096;

/// A freshly allocated pseudo-terminal pair
///
/// Both descriptors are closed on drop, so the pair is released on every
/// exit path.
#[derive(Debug)]
pub struct Pty {
    master: OwnedFd,
    slave: OwnedFd,
}

impl Pty {
    /// Allocate a new pseudo-terminal pair
    ///
    /// # Errors
    /// Returns `ExecError::PtyAllocation` if no pseudo-terminal is available
    pub fn open() -> Result<Self, ExecError> {
        let OpenptyResult { master, slave } =
            openpty(None, None).map_err(|e| ExecError::PtyAllocation(e.to_string()))?;

        // Neither side may leak into the transport or any other child
        for fd in [&master, &slave] {
            fcntl(fd.as_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
                .map_err(|e| ExecError::PtyAllocation(e.to_string()))?;
        }

        Ok(Self { master, slave })
    }

    /// Device path of the subordinate side, if the system can name it
    #[must_use]
    pub fn slave_path(&self) -> Option<PathBuf> {
        nix::unistd::ttyname(self.slave.as_fd()).ok()
    }

    /// Start `program` attached to the subordinate side
    ///
    /// The child gets the terminal as stdin, stdout and stderr, starts a new
    /// session and takes the terminal as its controlling terminal before the
    /// program image is replaced. The parent's copies of the subordinate side
    /// are closed before this returns, so reading the master reaches end of
    /// stream once the child and its descendants are gone.
    ///
    /// # Errors
    /// Returns `ExecError::CannotFork` if no process could be created and
    /// `ExecError::CannotExec` if terminal setup or the exec failed
    pub fn spawn(self, program: &str, args: &[String]) -> Result<PtyProcess, ExecError> {
        let Pty { master, slave } = self;

        let stdio = |fd: &OwnedFd| {
            fd.try_clone()
                .map(Stdio::from)
                .map_err(|e| ExecError::PtyAllocation(e.to_string()))
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(stdio(&slave)?)
            .stdout(stdio(&slave)?)
            .stderr(Stdio::from(slave))
            .kill_on_drop(true);

        // SAFETY: setsid() and ioctl() are async-signal-safe and the closure
        // does not allocate.
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid()?;

                // stdin is already the subordinate side here
                if nix::libc::ioctl(0, nix::libc::TIOCSCTTY as _, 0) < 0 {
                    return Err(io::Error::last_os_error());
                }

                Ok(())
            });
        }

        let spawned = cmd.spawn();
        // Drops the parent's subordinate descriptors held by the command
        drop(cmd);

        let child = spawned.map_err(|e| spawn_error(program, &e))?;
        debug!(pid = ?child.id(), program, "transport started");

        Ok(PtyProcess {
            master: File::from_std(std::fs::File::from(master)),
            child,
        })
    }
}

/// A running transport and the master side of its terminal
#[derive(Debug)]
pub struct PtyProcess {
    master: File,
    child: Child,
}

impl PtyProcess {
    /// Copy everything the transport writes to `out`
    ///
    /// Returns at end of stream, or on a read error, which is how Linux
    /// reports that the subordinate side has been closed. `last` is updated
    /// with the final byte written so far, even if this future is dropped
    /// part way through.
    ///
    /// # Errors
    /// Returns `ExecError::Output` if writing to `out` fails
    pub async fn relay(
        &mut self,
        out: &mut (dyn Write + Send),
        last: &mut Option<u8>,
    ) -> Result<(), ExecError> {
        let mut buf = vec![0u8; RELAY_BUFFER_SIZE];

        loop {
            let n = match self.master.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(error = %e, "pseudo-terminal closed");
                    break;
                }
            };

            out.write_all(&buf[..n])
                .and_then(|()| out.flush())
                .map_err(|e| ExecError::Output(e.to_string()))?;
            *last = Some(buf[n - 1]);
        }

        Ok(())
    }

    /// Wait for the transport to exit
    ///
    /// # Errors
    /// Returns `ExecError::Wait` if the exit status cannot be collected
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus, ExecError> {
        self.child
            .wait()
            .await
            .map_err(|e| ExecError::Wait(e.to_string()))
    }

    /// Kill the transport and reap it
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill transport");
        }
    }
}

/// Map a spawn error onto a host failure
fn spawn_error(program: &str, e: &io::Error) -> ExecError {
    match e.raw_os_error() {
        Some(nix::libc::EAGAIN | nix::libc::ENOMEM) => ExecError::CannotFork(e.to_string()),
        _ => {
            warn!(program, error = %e, "cannot exec transport");
            ExecError::CannotExec {
                program: program.to_string(),
            }
        }
    }
}

/// Write a newline unless the output already ended with one
///
/// `last` is `None` when nothing was written at all, which also gets a
/// newline so the next line of output starts in column zero.
///
/// # Errors
/// Returns `ExecError::Output` if the write fails
pub fn finish_line(out: &mut (dyn Write + Send), last: Option<u8>) -> Result<(), ExecError> {
    if last == Some(b'\n') {
        return Ok(());
    }
    out.write_all(b"\n")
        .and_then(|()| out.flush())
        .map_err(|e| ExecError::Output(e.to_string()))
}
