use super::Socket;
use crate::icmp::v4::Ttl;
use crate::ping_error::{PingError, PingResult};
use socket2::{Domain, Protocol, Type};
use std::mem::MaybeUninit;
use std::net::Ipv4Addr;
use std::{io, time::Duration};

/// `AF_INET`/`SOCK_RAW`/`IPPROTO_ICMP` socket. Needs root or `CAP_NET_RAW`.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    /// Opens the socket and applies the outgoing TTL and the receive timeout.
    pub fn create(ttl: Ttl, timeout: Duration) -> PingResult<RawSocket> {
        tracing::trace!(%ttl, ?timeout, "creating raw icmpv4 socket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(PingError::from_socket_creation)?;
        socket.set_ttl(u32::from(u8::from(ttl))).map_err(PingError::Socket)?;
        socket.set_read_timeout(Some(timeout)).map_err(PingError::Socket)?;
        Ok(RawSocket { socket })
    }
}

impl Socket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)> {
        // Socket2 gives a safety guaranty which allows us to do an unsafe cast from `&mut [u8]`
        // to `&mut [std::mem::MaybeUninit<u8>]`: it never writes uninitialised bytes.
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        let (n, socket_addr) = self.socket.recv_from(uninit)?;
        let source = socket_addr
            .as_socket_ipv4()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "received from a non-IPv4 address"))?;
        Ok((n, *source.ip()))
    }
}
