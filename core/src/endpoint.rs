//! GraphQL endpoint and best-effort gateway discovery.
//!
//! # Design
//! Discovery runs once, before the client is built. Whatever it finds (or
//! the fallback host when it finds nothing) is baked into the `Endpoint`;
//! there is no re-resolution afterwards.

use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use tracing::{debug, warn};

pub const FALLBACK_HOST: &str = "192.168.77.151";
pub const DEFAULT_PORT: u16 = 8443;
pub const DEFAULT_PATH: &str = "/graphql";
pub const DEFAULT_SCHEME: &str = "https";

/// Where GraphQL requests are posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    pub fn new(scheme: &str, host: &str, port: u16, path: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port,
            path: path.to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same endpoint, different host.
    pub fn with_host(&self, host: &str) -> Self {
        Self::new(&self.scheme, host, self.port, &self.path)
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME, FALLBACK_HOST, DEFAULT_PORT, DEFAULT_PATH)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}{}", self.scheme, self.host, self.port, self.path)
        } else {
            write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
        }
    }
}

/// A source for the local network's gateway address.
pub trait GatewayDiscovery {
    /// Best effort; `None` when nothing could be found.
    fn discover(&self) -> Option<IpAddr>;
}

/// Returns a fixed answer. Hosts that discover the gateway natively pass
/// their result through this.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDiscovery(pub Option<IpAddr>);

impl GatewayDiscovery for StaticDiscovery {
    fn discover(&self) -> Option<IpAddr> {
        self.0
    }
}

/// Reads the default-route gateway from a Linux `/proc/net/route` table.
#[derive(Debug, Clone)]
pub struct RouteTableDiscovery {
    path: PathBuf,
}

impl RouteTableDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for RouteTableDiscovery {
    fn default() -> Self {
        Self::new("/proc/net/route")
    }
}

impl GatewayDiscovery for RouteTableDiscovery {
    fn discover(&self) -> Option<IpAddr> {
        match fs::read_to_string(&self.path) {
            Ok(table) => parse_route_table(&table).map(IpAddr::V4),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "route table unavailable");
                None
            }
        }
    }
}

const RTF_UP: u32 = 0x0001;
const RTF_GATEWAY: u32 = 0x0002;

/// Find the gateway of the first usable default route.
///
/// Columns are whitespace separated; `Destination`, `Gateway` and `Flags`
/// are hex, with addresses in the kernel's little-endian byte order.
pub fn parse_route_table(table: &str) -> Option<Ipv4Addr> {
    table.lines().skip(1).find_map(|line| {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 4 {
            return None;
        }
        let destination = u32::from_str_radix(cols[1], 16).ok()?;
        let gateway = u32::from_str_radix(cols[2], 16).ok()?;
        let flags = u32::from_str_radix(cols[3], 16).ok()?;
        let usable = flags & RTF_UP != 0 && flags & RTF_GATEWAY != 0;
        if destination != 0 || gateway == 0 || !usable {
            return None;
        }
        Some(Ipv4Addr::from(gateway.to_le_bytes()))
    })
}

/// Swap in the discovered gateway host, or keep `fallback` unchanged.
pub fn resolve_endpoint(discovery: &dyn GatewayDiscovery, fallback: &Endpoint) -> Endpoint {
    match discovery.discover() {
        Some(ip) => {
            debug!(gateway = %ip, "using discovered gateway");
            fallback.with_host(&ip.to_string())
        }
        None => {
            warn!(fallback = %fallback.host(), "gateway discovery found nothing, using fallback");
            fallback.clone()
        }
    }
}
