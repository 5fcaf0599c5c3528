use crate::ping_error::{PingError, PingResult};
use std::net::{IpAddr, Ipv4Addr};

/// The destination of a probe run, as resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// The destination as given on the command line.
    pub destination: String,
    pub ip: Ipv4Addr,
    /// Reverse DNS name, only looked up for host names.
    pub name: Option<String>,
}

impl Target {
    pub fn new(destination: impl Into<String>, ip: Ipv4Addr, name: Option<String>) -> Self {
        Target { destination: destination.into(), ip, name }
    }

    pub fn resolve(destination: &str, numeric: bool) -> PingResult<Target> {
        if let Ok(ip) = destination.parse::<Ipv4Addr>() {
            return Ok(Target::new(destination, ip, None));
        }
        let ip = lookup_host_v4(destination)?;
        let name = if numeric { None } else { lookup_addr(ip) };
        tracing::debug!(destination, %ip, ?name, "resolved destination");
        Ok(Target::new(destination, ip, name))
    }
}

pub fn lookup_host_v4(hostname: &str) -> PingResult<Ipv4Addr> {
    let ips = dns_lookup::lookup_host(hostname).map_err(|e| PingError::Resolve {
        host: hostname.to_owned(),
        reason: e.to_string(),
    })?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| PingError::Resolve {
            host: hostname.to_owned(),
            reason: "no IPv4 address".to_owned(),
        })
}

/// Reverse lookup. A missing name is not an error, it only means there is
/// nothing to show.
pub fn lookup_addr(ip: Ipv4Addr) -> Option<String> {
    match dns_lookup::lookup_addr(&IpAddr::V4(ip)) {
        Ok(name) if name != ip.to_string() => Some(name),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(%ip, error = %e, "reverse lookup failed");
            None
        }
    }
}
