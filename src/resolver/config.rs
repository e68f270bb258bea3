use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// a.root-servers.net, operated by Verisign.
pub const DEFAULT_ROOT_SERVER: Ipv4Addr = Ipv4Addr::new(198, 41, 0, 4);
pub const DNS_PORT: u16 = 53;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Where every walk starts, including nameserver lookups.
    pub root_server: Ipv4Addr,
    pub port: u16,
    /// How long to wait for each response.
    pub timeout: Duration,
    /// Extra attempts against the same server after a transport or format error.
    pub max_retries: usize,
    /// Round-trips allowed for one resolution, nested nameserver lookups included.
    pub max_referrals: usize,
    /// How deeply nameserver lookups may nest.
    pub max_depth: usize,
    pub recv_buffer_size: usize,
}

impl ResolverConfig {
    pub fn server_addr(&self, ip: Ipv4Addr) -> SocketAddr {
        SocketAddr::from((ip, self.port))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_server: DEFAULT_ROOT_SERVER,
            port: DNS_PORT,
            timeout: Duration::from_secs(5),
            max_retries: 2,
            max_referrals: 32,
            max_depth: 8,
            recv_buffer_size: 1024,
        }
    }
}
