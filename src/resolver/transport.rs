use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use tracing::{instrument, trace};

use super::ResolverConfig;
use crate::DnsError;

/// Sends one query and hands back one response, nothing more.
pub trait Transport {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes, DnsError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes, DnsError> {
        (**self).exchange(server, query)
    }
}

/// Blocking UDP, one fresh socket per round-trip.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    timeout: Duration,
    recv_buffer_size: usize,
}

impl UdpTransport {
    pub fn new(timeout: Duration, recv_buffer_size: usize) -> Self {
        Self {
            // a zero read timeout is rejected by the socket
            timeout: timeout.max(Duration::from_millis(1)),
            recv_buffer_size,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.timeout, config.recv_buffer_size)
    }
}

impl Transport for UdpTransport {
    #[instrument(level = "debug", skip(self, query))]
    fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Bytes, DnsError> {
        let transport_error = |source: std::io::Error| DnsError::TransportError { server, source };

        let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(transport_error)?;
        sock.set_read_timeout(Some(self.timeout))
            .map_err(transport_error)?;
        sock.connect(server).map_err(transport_error)?;
        sock.send(query).map_err(transport_error)?;

        let mut buf = vec![0; self.recv_buffer_size];
        let len = match sock.recv(&mut buf) {
            Ok(len) => len,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(DnsError::Timeout(server));
            }
            Err(e) => return Err(transport_error(e)),
        };

        trace!(len, "received response");
        buf.truncate(len);

        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use std::net::UdpSocket;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn exchanges_one_datagram() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0; 512];
            let (len, peer) = server.recv_from(&mut buf).unwrap();
            buf[..len].reverse();
            server.send_to(&buf[..len], peer).unwrap();
        });

        let transport = UdpTransport::new(Duration::from_secs(5), 1024);
        let response = transport.exchange(addr, b"\x01\x02\x03").unwrap();
        handle.join().unwrap();

        assert_eq!(response.as_ref(), b"\x03\x02\x01".as_slice());
    }

    #[test]
    fn times_out_on_silence() {
        // bound but never read from
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();

        let transport = UdpTransport::new(Duration::from_millis(50), 1024);
        let result = transport.exchange(addr, b"\x00");

        assert!(matches!(result, Err(DnsError::Timeout(a)) if a == addr));
    }
}
