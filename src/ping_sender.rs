use crate::icmp::v4::{build_echo_request, SequenceNumber, Socket, PACKET_SIZE};
use crate::ping_error::{PingError, PingResult};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Instant;

pub(crate) struct PingSender<'a, S> {
    socket: &'a S,
    identifier: u16,
    addr: socket2::SockAddr,
}

impl<'a, S> PingSender<'a, S>
where
    S: Socket,
{
    pub(crate) fn new(socket: &'a S, identifier: u16, ip: Ipv4Addr) -> Self {
        let addr = SocketAddr::V4(SocketAddrV4::new(ip, 0)).into();
        PingSender { socket, identifier, addr }
    }

    /// Builds and transmits one echo request. Returns the send time.
    pub(crate) fn send(&self, sequence_number: SequenceNumber) -> PingResult<Instant> {
        let packet = build_echo_request(self.identifier, sequence_number).to_bytes();
        let send_time = Instant::now();
        match self.socket.send_to(&packet, &self.addr) {
            Ok(0) => Err(PingError::SocketClosed),
            Ok(n) => {
                if n < PACKET_SIZE {
                    tracing::warn!(sent = n, expected = PACKET_SIZE, "short write on icmp socket");
                }
                tracing::trace!(%sequence_number, "icmpv4 sent");
                Ok(send_time)
            }
            Err(e) => Err(PingError::Send(e)),
        }
    }
}
