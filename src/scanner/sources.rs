//! Insecure gem source detection.
//!
//! Rubygems remotes are insecure when fetched over plain `http`, unless the
//! host is internal (loopback, private, or link-local). Git sources are
//! insecure over `git://` and `http://`, with the same internal-host
//! exemption. Schemes compare case-insensitively. Hosts are never resolved;
//! only literal addresses and `localhost` count as internal.

use std::net::{IpAddr, Ipv6Addr};

use crate::model::{InsecureSource, Source};

/// Returns the insecure URIs declared by `source`, in lockfile order.
pub fn insecure_sources(source: &Source) -> Vec<InsecureSource> {
    match source {
        Source::Rubygems { remotes } => remotes
            .iter()
            .filter(|remote| is_insecure(&remote.uri, &["http"]))
            .map(|remote| InsecureSource {
                uri: remote.uri.clone(),
                line: remote.line,
            })
            .collect(),
        Source::Git { uri, line, .. } => {
            if is_insecure(uri, &["git", "http"]) {
                vec![InsecureSource {
                    uri: uri.clone(),
                    line: *line,
                }]
            } else {
                Vec::new()
            }
        }
        Source::Path { .. } => Vec::new(),
    }
}

/// True when `uri` uses one of `schemes` and its host is not internal.
fn is_insecure(uri: &str, schemes: &[&str]) -> bool {
    let uses_scheme = scheme(uri).is_some_and(|scheme| schemes.contains(&scheme.as_str()));
    uses_scheme && !host(uri).is_some_and(is_internal_host)
}

fn scheme(uri: &str) -> Option<String> {
    uri.split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
}

/// Extracts the host of `scheme://[user@]host[:port]/path`.
fn host(uri: &str) -> Option<&str> {
    let (_, rest) = uri.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split(']').next()?
    } else {
        host_port.split(':').next()?
    };

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Returns true for hosts that never leave the local network.
pub fn is_internal_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
        }
        Ok(IpAddr::V6(ip)) => {
            ip.is_loopback() || ip.is_unspecified() || is_unique_local(&ip) || is_v6_link_local(&ip)
        }
        Err(_) => false,
    }
}

fn is_unique_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

fn is_v6_link_local(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}
