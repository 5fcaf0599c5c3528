use crate::icmp::v4::{decode_reply, DecodedReply, Socket};
use crate::ping_error::{PingError, PingResult};
use std::io;
use std::net::Ipv4Addr;
use std::time::Instant;

const RECV_BUFFER_LEN: usize = 1500;

pub(crate) struct ReceivedDatagram {
    /// Length of the whole IP datagram.
    pub size: usize,
    /// Length of the ICMP message inside it.
    pub icmp_size: usize,
    pub source: Ipv4Addr,
    pub reply: DecodedReply,
    pub receive_time: Instant,
}

pub(crate) enum PingReceive {
    Timeout,
    /// A signal cut the wait short.
    Interrupted,
    Datagram(ReceivedDatagram),
}

pub(crate) struct PingReceiver<'a, S> {
    socket: &'a S,
}

impl<'a, S> PingReceiver<'a, S>
where
    S: Socket,
{
    pub(crate) fn new(socket: &'a S) -> Self {
        PingReceiver { socket }
    }

    /// Blocks for at most the socket's receive timeout.
    pub(crate) fn receive(&self) -> PingResult<PingReceive> {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        match self.socket.recv_from(&mut buf) {
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(PingReceive::Timeout)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(PingReceive::Interrupted),
            Err(e) => Err(PingError::Receive(e)),
            Ok((0, _)) => Err(PingError::SocketClosed),
            Ok((size, source)) => {
                let receive_time = Instant::now();
                let raw = &buf[..size];
                let ip_header_length = usize::from(raw[0] & 0x0F) * 4;
                let reply = decode_reply(raw);
                tracing::trace!(size, %source, ?reply, "icmpv4 received");
                Ok(PingReceive::Datagram(ReceivedDatagram {
                    size,
                    icmp_size: size.saturating_sub(ip_header_length),
                    source,
                    reply,
                    receive_time,
                }))
            }
        }
    }
}
