//! Discovering nameservers from the system configuration.
//!
//! This is a thin, separate collaborator: it has no access to the
//! multiplexer's internals, and a caller that already knows which
//! nameservers to use can skip it entirely.

#[cfg(unix)]
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;

use log::*;

use crate::error::ConfigError;


/// Reads `/etc/resolv.conf` and returns every `nameserver <ip>` line found,
/// in file order. Lines starting with `#` or `;` (after leading whitespace)
/// are comments; anything after a `#` or `;` on a `nameserver` line is
/// stripped before parsing the address.
#[cfg(unix)]
pub fn system_nameservers() -> Result<Vec<IpAddr>, ConfigError> {
    let f = File::open("/etc/resolv.conf")?;
    parse_resolv_conf(BufReader::new(f))
}

fn parse_resolv_conf<R: std::io::Read>(reader: BufReader<R>) -> Result<Vec<IpAddr>, ConfigError> {
    let mut nameservers = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("nameserver ") {
            let rest = rest.split(['#', ';']).next().unwrap_or("").trim();

            match rest.parse() {
                Ok(ip) => nameservers.push(ip),
                Err(e) => warn!("Failed to parse nameserver line {:?}: {}", line, e),
            }
        }
    }

    if nameservers.is_empty() {
        return Err(ConfigError::NoNameserver);
    }

    Ok(nameservers)
}

/// Looks up the system default nameservers on Windows, by iterating through
/// the list of network adapters and collecting every DNS server found on an
/// adapter that is up and has a gateway.
#[cfg(windows)]
pub fn system_nameservers() -> Result<Vec<IpAddr>, ConfigError> {
    let adapters = ipconfig::get_adapters()?;

    let nameservers: Vec<IpAddr> = adapters.iter()
        .filter(|a| a.oper_status() == ipconfig::OperStatus::IfOperStatusUp && !a.gateways().is_empty())
        .flat_map(|a| a.dns_servers())
        .copied()
        .collect();

    if nameservers.is_empty() {
        return Err(ConfigError::NoNameserver);
    }

    Ok(nameservers)
}

/// The fall-back system default nameserver determinator for platforms this
/// library knows nothing about: the caller must supply a nameserver list
/// explicitly.
#[cfg(all(not(unix), not(windows)))]
pub fn system_nameservers() -> Result<Vec<IpAddr>, ConfigError> {
    warn!("Unable to fetch default nameservers on this platform.");
    Err(ConfigError::UnsupportedPlatform)
}


#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_file() {
        let input = b"nameserver 8.8.8.8\nnameserver 1.1.1.1\n".as_slice();
        let result = parse_resolv_conf(BufReader::new(input)).unwrap();
        assert_eq!(result, vec![
            "8.8.8.8".parse::<IpAddr>().unwrap(),
            "1.1.1.1".parse::<IpAddr>().unwrap(),
        ]);
    }

    #[test]
    fn skips_comments() {
        let input = b"# a comment\n; another comment\nnameserver 8.8.8.8\n".as_slice();
        let result = parse_resolv_conf(BufReader::new(input)).unwrap();
        assert_eq!(result, vec!["8.8.8.8".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn trailing_comment_on_nameserver_line() {
        let input = b"nameserver 8.8.8.8 # primary\n".as_slice();
        let result = parse_resolv_conf(BufReader::new(input)).unwrap();
        assert_eq!(result, vec!["8.8.8.8".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn empty_file_has_no_nameservers() {
        let input = b"search example.com\n".as_slice();
        let err = parse_resolv_conf(BufReader::new(input)).unwrap_err();
        assert!(matches!(err, ConfigError::NoNameserver));
    }

    #[test]
    fn unparseable_address_is_skipped_not_fatal() {
        let input = b"nameserver not-an-ip\nnameserver 9.9.9.9\n".as_slice();
        let result = parse_resolv_conf(BufReader::new(input)).unwrap();
        assert_eq!(result, vec!["9.9.9.9".parse::<IpAddr>().unwrap()]);
    }
}
