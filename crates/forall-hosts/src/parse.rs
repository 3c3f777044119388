//! Host list line parsing
//!
//! A list line is: optional white space, an optional host name, optional
//! white space, then an optional `#` comment running to the end of the line.

use crate::name::HostName;

/// Extract the host name from one line of a list file
///
/// The host name is the leading run of `[alnum][alnum.-]*` after any white
/// space. Whatever follows it is ignored. Blank lines and lines holding only
/// a comment yield `None`.
#[must_use]
pub fn parse_host_line(line: &str) -> Option<HostName> {
    let rest = line.trim_start();

    if !rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }

    let end = rest
        .find(|c: char| !is_host_char(c))
        .unwrap_or(rest.len());

    Some(HostName::from(&rest[..end]))
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}
