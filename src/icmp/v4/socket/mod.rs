use std::io;
use std::net::Ipv4Addr;

pub(crate) mod dgram_socket;
pub(crate) mod raw_socket;

/// An open ICMP socket. Receives return the whole IPv4 datagram, IP header
/// included.
pub trait Socket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, Ipv4Addr)>;
}
