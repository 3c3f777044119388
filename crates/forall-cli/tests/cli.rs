use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, run inside `dir` with an empty configuration
fn for_all(dir: &TempDir) -> Command {
    let config = dir.path().join("empty.toml");
    fs::write(&config, "").unwrap();

    let mut cmd = Command::cargo_bin("for-all").unwrap();
    cmd.current_dir(dir.path())
        .env("FORALL_CONFIG", &config)
        .env_remove("RUST_LOG");
    cmd
}

fn write_list(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// Shell script standing in for `ssh` that echoes its arguments
fn fake_ssh(dir: &Path) -> String {
    let path = dir.join("fake-ssh");
    fs::write(&path, "#!/bin/sh\necho \"args: $*\"\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    for_all(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host-list"))
        .stdout(predicate::str::contains("--list-only"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    for_all(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("for-all"));
}

#[test]
fn test_unknown_option_is_usage_error() {
    let dir = TempDir::new().unwrap();
    for_all(&dir)
        .arg("--no-such-flag")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--no-such-flag"));
}

#[test]
fn test_list_only_reads_default_list() {
    let dir = TempDir::new().unwrap();
    write_list(&dir, "all", "web1\n  web2 # spare\n\n# comment\ndb1\n");

    for_all(&dir)
        .args(["-L", "-n", "db1"])
        .assert()
        .success()
        .stdout("Hosts:\n        web1\n        web2\nNot hosts:\n        db1\n");
}

#[test]
fn test_list_only_sorted_from_host_list() {
    let dir = TempDir::new().unwrap();
    let list = write_list(&dir, "web", "c\na\nb\n");

    for_all(&dir)
        .args(["-S", "-L", "-H", &list])
        .assert()
        .success()
        .stdout("Hosts:\n        a\n        b\n        c\nNot hosts:\n");
}

#[test]
fn test_files_shows_contributing_lists() {
    let dir = TempDir::new().unwrap();
    let web = write_list(&dir, "web", "web1\n");
    let nobody = write_list(&dir, "nobody", "# empty\n");

    for_all(&dir)
        .args(["--files", "-H", &web, "-N", &nobody])
        .assert()
        .success()
        .stdout(format!("Lists:\n        {web}\nNot lists:\n"));
}

#[test]
fn test_missing_list_warns_and_continues() {
    let dir = TempDir::new().unwrap();

    for_all(&dir)
        .args(["-L", "-H", "no-such-list", "h1"])
        .assert()
        .success()
        .stdout("Hosts:\n        h1\nNot hosts:\n")
        .stderr(predicate::str::contains("no-such-list"));
}

#[test]
fn test_directory_named_like_list_uses_search_dirs() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("web")).unwrap();
    fs::create_dir(dir.path().join("lists")).unwrap();
    write_list(&dir, "lists/web", "web1\nweb2\n");
    let config = write_list(
        &dir,
        "dirs.toml",
        &format!("list_dirs = [\"{}\"]\n", dir.path().join("lists").display()),
    );

    for_all(&dir)
        .args(["-c", &config, "-L", "-H", "web"])
        .assert()
        .success()
        .stdout("Hosts:\n        web1\n        web2\nNot hosts:\n")
        .stderr(predicate::str::contains("Is a directory").not());
}

#[test]
fn test_debug_logs_config_loading() {
    let dir = TempDir::new().unwrap();

    for_all(&dir)
        .args(["-D", "-D", "-L", "h1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loading configuration"));
}

#[test]
fn test_missing_command_is_usage_error() {
    let dir = TempDir::new().unwrap();

    for_all(&dir)
        .arg("h1")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("no command given"))
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_everything_excluded_exits_3() {
    let dir = TempDir::new().unwrap();

    for_all(&dir)
        .args(["h1", "-n", "h1", "--", "uptime"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No hosts specified"));
}

#[test]
fn test_runs_command_through_transport() {
    let dir = TempDir::new().unwrap();
    let ssh = fake_ssh(dir.path());

    for_all(&dir)
        .args(["-s", &ssh, "-T", "h1", "h2", "--", "uname", "-a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n-- h1\n"))
        .stdout(predicate::str::contains("args: -n -q h1 -- uname -a"))
        .stdout(predicate::str::contains("args: -n -q h2 -- uname -a"))
        .stdout(predicate::str::ends_with("Success:\n\th1\n\th2\n"));
}

#[test]
fn test_failed_host_keeps_exit_zero() {
    let dir = TempDir::new().unwrap();
    let ssh = dir.path().join("fail-ssh");
    fs::write(&ssh, "#!/bin/sh\nexit 7\n").unwrap();
    fs::set_permissions(&ssh, fs::Permissions::from_mode(0o755)).unwrap();

    for_all(&dir)
        .args(["-s", ssh.to_str().unwrap(), "h1", "--", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failure:\n\th1"))
        .stdout(predicate::str::contains("# exit code (7)"));
}

#[test]
fn test_config_file_sets_program() {
    let dir = TempDir::new().unwrap();
    let ssh = fake_ssh(dir.path());
    let config = write_list(
        &dir,
        "for-all.toml",
        &format!("ssh_program = \"{ssh}\"\nssh_options = [\"BatchMode=yes\"]\n"),
    );

    for_all(&dir)
        .args(["-c", &config, "-q", "-u", "admin", "h1", "--", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "args: -n -q -t -o BatchMode=yes -l admin h1 -- id",
        ));
}

#[test]
fn test_bad_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_list(&dir, "bad.toml", "no_such_key = 1\n");

    for_all(&dir)
        .args(["-c", &config, "-L", "h1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load configuration"));
}
