mod checksum;
pub use checksum::{checksum, verify, ChecksumMismatch};

mod icmpv4;
pub use icmpv4::{
    build_echo_request, decode_reply, payload_mismatch, payload_pattern, DecodedReply, EchoMessage, IcmpType,
    Malformed, HEADER_SIZE, PACKET_SIZE, PAYLOAD_SIZE,
};

mod sequence_number;
pub use sequence_number::SequenceNumber;

mod socket;
pub use socket::dgram_socket::DgramSocket;
pub use socket::raw_socket::RawSocket;
pub use socket::Socket;
#[cfg(test)]
pub(crate) use socket::tests;

mod ttl;
pub use ttl::Ttl;
