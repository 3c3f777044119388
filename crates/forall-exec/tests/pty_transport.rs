use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::Mutex;

use forall_exec::{ExecError, RemoteExecutor, SshExecutor, TransportConfig};

// Scripts are written and then executed; running tests one at a time keeps
// another test's fork from holding a script open for writing (ETXTBSY).
static SPAWN_LOCK: Mutex<()> = Mutex::const_new(());

/// Write an executable shell script standing in for `ssh`
fn fake_transport(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("fake-ssh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

async fn run(
    program: &str,
    transport: TransportConfig,
    command: &[&str],
) -> (Result<(), ExecError>, String) {
    let executor = SshExecutor::new(TransportConfig {
        program: program.to_string(),
        ..transport
    });
    let mut out = Vec::new();
    let result = executor.run("h1", &words(command), &mut out).await;
    (result, String::from_utf8_lossy(&out).into_owned())
}

#[tokio::test]
async fn test_transport_receives_argument_vector() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, r#"printf '%s|' "$@""#);

    let transport = TransportConfig::default()
        .with_option("-o1")
        .with_option("-o2");
    let (result, output) = run(&program, transport, &["echo", "hi"]).await;

    assert_eq!(result, Ok(()));
    // No trailing newline from the remote side, so one is added
    assert_eq!(output, "-n|-q|-t|-o|-o1|-o|-o2|h1|--|echo|hi|\n");
}

#[tokio::test]
async fn test_transport_runs_on_a_terminal() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "[ -t 0 ] && [ -t 1 ] && [ -t 2 ] && echo on-a-tty");

    let (result, output) = run(&program, TransportConfig::default(), &["true"]).await;

    assert_eq!(result, Ok(()));
    assert!(output.contains("on-a-tty"), "output was {output:?}");
    assert!(output.ends_with('\n'));
    assert!(!output.ends_with("\n\n"));
}

#[tokio::test]
async fn test_stderr_is_relayed() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "echo oops >&2; exit 0");

    let (result, output) = run(&program, TransportConfig::default(), &["true"]).await;

    assert_eq!(result, Ok(()));
    assert!(output.contains("oops"));
}

#[tokio::test]
async fn test_no_output_still_ends_line() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "exit 0");

    let (result, output) = run(&program, TransportConfig::default(), &["true"]).await;

    assert_eq!(result, Ok(()));
    assert_eq!(output, "\n");
}

#[tokio::test]
async fn test_nonzero_exit_is_failure() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "exit 7");

    let (result, _) = run(&program, TransportConfig::default(), &["false"]).await;

    assert_eq!(result, Err(ExecError::ExitCode(7)));
}

#[tokio::test]
async fn test_exit_128_is_exec_failure() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "exit 128");

    let (result, _) = run(&program, TransportConfig::default(), &["true"]).await;

    assert_eq!(
        result,
        Err(ExecError::CannotExec {
            program: program.clone()
        })
    );
}

#[tokio::test]
async fn test_missing_program_is_exec_failure() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = dir.path().join("no-such-ssh").to_string_lossy().into_owned();

    let (result, _) = run(&program, TransportConfig::default(), &["true"]).await;

    assert_eq!(result, Err(ExecError::CannotExec { program }));
}

#[tokio::test]
async fn test_timeout_kills_transport() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let program = fake_transport(&dir, "exec sleep 30");

    let executor = SshExecutor::new(TransportConfig::new(program));
    let mut out = Vec::new();
    let result = executor
        .run_with_timeout("h1", &words(&["true"]), &mut out, Duration::from_millis(200))
        .await;

    assert!(matches!(result, Err(ExecError::Timeout { .. })));
    assert_eq!(out, b"\n");
}
