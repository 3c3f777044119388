//! Listings and debug output

use std::io::{self, Write};
use std::path::PathBuf;

use forall_hosts::{HostName, HostSet};

use crate::config::RunConfiguration;

/// Print the `Hosts:` and `Not hosts:` blocks
///
/// # Errors
/// Returns any error from writing to `out`
pub fn list_hosts(set: &HostSet, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Hosts:")?;
    write_names(out, set.hosts())?;
    writeln!(out, "Not hosts:")?;
    write_names(out, set.not_hosts())
}

/// Print the `Lists:` and `Not lists:` blocks
///
/// Only files that contributed at least one host are shown.
///
/// # Errors
/// Returns any error from writing to `out`
pub fn list_files(set: &HostSet, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Lists:")?;
    write_paths(out, set.host_lists())?;
    writeln!(out, "Not lists:")?;
    write_paths(out, set.not_host_lists())
}

fn write_names(out: &mut dyn Write, names: &[HostName]) -> io::Result<()> {
    for name in names {
        writeln!(out, "        {name}")?;
    }
    Ok(())
}

fn write_paths(out: &mut dyn Write, paths: &[PathBuf]) -> io::Result<()> {
    for path in paths {
        writeln!(out, "        {}", path.display())?;
    }
    Ok(())
}

/// Dump flags and the resolved sets
///
/// Level 1 shows flags, hosts, transport settings and the command. Level 2
/// adds list files and exclusions.
///
/// # Errors
/// Returns any error from writing to `out`
pub fn debug_dump(
    config: &RunConfiguration,
    set: &HostSet,
    out: &mut dyn Write,
) -> io::Result<()> {
    let level = config.debug;
    if level == 0 {
        return Ok(());
    }

    let flags = [
        ("single", config.single),
        ("files", config.files_only),
        ("quiet", config.quiet),
        ("reverse", config.reverse),
        ("sort", config.sort),
    ];
    for (name, on) in flags {
        if on {
            writeln!(out, "flag: {name}")?;
        }
    }
    for host in set.hosts() {
        writeln!(out, "host: {host}")?;
    }

    if level >= 2 {
        for list in set.host_lists() {
            writeln!(out, "host list: {}", list.display())?;
        }
        if config.list_only {
            writeln!(out, "flag: list-only")?;
        }
        for host in set.not_hosts() {
            writeln!(out, "not: {host}")?;
        }
        for list in set.not_host_lists() {
            writeln!(out, "not list: {}", list.display())?;
        }
    }

    let transport = &config.transport;
    for option in &transport.options {
        writeln!(out, "ssh option: {option}")?;
    }
    writeln!(out, "ssh program: {}", transport.program)?;
    if !transport.allocate_tty {
        writeln!(out, "flag: no-tty")?;
    }
    if let Some(user) = &transport.user {
        writeln!(out, "user: {user}")?;
    }
    if let Some(timeout) = config.timeout {
        writeln!(out, "timeout: {timeout:?}")?;
    }
    if !config.command.is_empty() {
        let quoted: Vec<String> = config.command.iter().map(|w| format!("\"{w}\"")).collect();
        writeln!(out, "{}", quoted.join(" "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        let writer: &mut dyn Write = &mut out;
        f(writer).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_set() -> HostSet {
        let mut set = HostSet::new();
        set.add_host("web1");
        set.add_host("web2");
        set.add_not_host("web3");
        set
    }

    #[test]
    fn test_list_hosts() {
        let set = sample_set();
        let text = render(|out| list_hosts(&set, out));
        assert_eq!(
            text,
            "Hosts:\n        web1\n        web2\nNot hosts:\n        web3\n"
        );
    }

    #[test]
    fn test_list_files_empty() {
        let text = render(|out| list_files(&HostSet::new(), out));
        assert_eq!(text, "Lists:\nNot lists:\n");
    }

    #[test]
    fn test_debug_dump_levels() {
        let set = sample_set();
        let mut config = RunConfiguration {
            command: vec!["echo".to_string(), "hi there".to_string()],
            sort: true,
            ..RunConfiguration::default()
        };

        assert_eq!(render(|out| debug_dump(&config, &set, out)), "");

        config.debug = 1;
        let basic = render(|out| debug_dump(&config, &set, out));
        assert!(basic.contains("flag: sort\n"));
        assert!(basic.contains("host: web1\nhost: web2\n"));
        assert!(basic.contains("ssh program: ssh\n"));
        assert!(basic.ends_with("\"echo\" \"hi there\"\n"));
        assert!(!basic.contains("not: web3"));

        config.debug = 2;
        let detailed = render(|out| debug_dump(&config, &set, out));
        assert!(detailed.contains("not: web3\n"));
    }
}
