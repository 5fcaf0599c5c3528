use super::Socket;
use crate::icmp::v4::Ttl;
use crate::ping_error::{PingError, PingResult};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::MutableIpv4Packet;
use socket2::{Domain, Protocol, SockAddr, Type};
use std::mem::MaybeUninit;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::{io, time::Duration};

/// IPv4 header put in front of every received message, in 32-bit words.
const SYNTHETIC_IHL: u8 = 5;
const SYNTHETIC_HEADER_LEN: usize = SYNTHETIC_IHL as usize * 4;

/// `AF_INET`/`SOCK_DGRAM`/`IPPROTO_ICMP` socket, usable without privileges
/// when the group is listed in `net.ipv4.ping_group_range`.
///
/// The kernel owns the echo identifier of such a socket and strips the IP
/// header from what it delivers. Receives put a minimal IPv4 header back in
/// front so callers see the same datagrams as from a raw socket.
pub struct DgramSocket {
    socket: socket2::Socket,
}

impl DgramSocket {
    /// Opens the socket, applies the outgoing TTL and the receive timeout and
    /// binds it so the kernel assigns an echo identifier.
    pub fn create(ttl: Ttl, timeout: Duration) -> PingResult<DgramSocket> {
        tracing::trace!(%ttl, ?timeout, "creating dgram icmpv4 socket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))
            .map_err(PingError::from_socket_creation)?;
        socket.set_ttl(u32::from(u8::from(ttl))).map_err(PingError::Socket)?;
        socket.set_read_timeout(Some(timeout)).map_err(PingError::Socket)?;
        socket
            .bind(&SockAddr::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)))
            .map_err(PingError::Socket)?;
        Ok(DgramSocket { socket })
    }

    /// The echo identifier the kernel writes into every request and filters
    /// replies by. It is the local port of the socket.
    pub fn identifier(&self) -> PingResult<u16> {
        let local = self.socket.local_addr().map_err(PingError::Socket)?;
        local
            .as_socket_ipv4()
            .map(|addr| addr.port())
            .ok_or_else(|| PingError::Socket(io::Error::new(io::ErrorKind::InvalidData, "socket is not IPv4")))
    }
}

impl Socket for DgramSocket {
    fn send_to(&self, buf: &[u8], addr: &SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)> {
        if buf.len() <= SYNTHETIC_HEADER_LEN {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "receive buffer too small"));
        }
        let payload = &mut buf[SYNTHETIC_HEADER_LEN..];
        // Same cast as for the raw socket: socket2 never writes uninitialised bytes.
        let uninit = unsafe { &mut *(payload as *mut [u8] as *mut [MaybeUninit<u8>]) };
        let (n, socket_addr) = self.socket.recv_from(uninit)?;
        let source = *socket_addr
            .as_socket_ipv4()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "received from a non-IPv4 address"))?
            .ip();
        if n == 0 {
            return Ok((0, source));
        }
        Ok((prepend_ip_header(buf, n, source), source))
    }
}

/// Writes an IPv4 header for an ICMP message of `icmp_len` bytes that already
/// sits behind the header space of `buf`. Returns the datagram length.
fn prepend_ip_header(buf: &mut [u8], icmp_len: usize, source: Ipv4Addr) -> usize {
    let total = SYNTHETIC_HEADER_LEN + icmp_len;
    if let Some(mut ip) = MutableIpv4Packet::new(&mut buf[..SYNTHETIC_HEADER_LEN]) {
        ip.set_version(4);
        ip.set_header_length(SYNTHETIC_IHL);
        ip.set_total_length(u16::try_from(total).unwrap_or(u16::MAX));
        ip.set_next_level_protocol(IpNextHeaderProtocols::Icmp);
        ip.set_source(source);
    }
    total
}
