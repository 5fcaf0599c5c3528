use super::checksum::{self, ChecksumMismatch};
use super::SequenceNumber;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpPacket, IcmpType as PnetIcmpType, IcmpTypes};
use pnet_packet::Packet;
use std::fmt;

/// Size of the ICMP echo header.
pub const HEADER_SIZE: usize = 8;
/// Size of every echo request this probe sends, header included.
pub const PACKET_SIZE: usize = 64;
pub const PAYLOAD_SIZE: usize = PACKET_SIZE - HEADER_SIZE;

const CHECKSUM_OFFSET: usize = 2;
const MIN_IP_HEADER_SIZE: usize = 20;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IcmpType {
    EchoReply,
    EchoRequest,
    TimeExceeded,
    Other(u8),
}

impl From<u8> for IcmpType {
    fn from(value: u8) -> Self {
        match value {
            v if v == IcmpTypes::EchoReply.0 => IcmpType::EchoReply,
            v if v == IcmpTypes::EchoRequest.0 => IcmpType::EchoRequest,
            v if v == IcmpTypes::TimeExceeded.0 => IcmpType::TimeExceeded,
            _ => IcmpType::Other(value),
        }
    }
}

impl From<IcmpType> for u8 {
    fn from(value: IcmpType) -> Self {
        match value {
            IcmpType::EchoReply => IcmpTypes::EchoReply.0,
            IcmpType::EchoRequest => IcmpTypes::EchoRequest.0,
            IcmpType::TimeExceeded => IcmpTypes::TimeExceeded.0,
            IcmpType::Other(other) => other,
        }
    }
}

/// An ICMP echo header followed by the fixed-size payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EchoMessage {
    pub icmp_type: IcmpType,
    pub code: u8,
    /// Wire-order checksum over header and payload.
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: SequenceNumber,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl EchoMessage {
    /// Parses the first `PACKET_SIZE` bytes of an ICMP message. Returns `None`
    /// when fewer bytes are available.
    #[must_use]
    pub fn parse(icmp: &[u8]) -> Option<EchoMessage> {
        let packet = EchoRequestPacket::new(icmp.get(..PACKET_SIZE)?)?;
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(packet.payload());
        Some(EchoMessage {
            icmp_type: packet.get_icmp_type().0.into(),
            code: packet.get_icmp_code().0,
            checksum: packet.get_checksum(),
            identifier: packet.get_identifier(),
            sequence: packet.get_sequence_number().into(),
            payload,
        })
    }

    /// Serializes the message as it goes on the wire.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut buf = [0u8; PACKET_SIZE];
        if let Some(mut packet) = MutableEchoRequestPacket::new(&mut buf) {
            packet.set_icmp_type(PnetIcmpType::new(self.icmp_type.into()));
            packet.set_icmp_code(IcmpCode::new(self.code));
            packet.set_checksum(self.checksum);
            packet.set_identifier(self.identifier);
            packet.set_sequence_number(self.sequence.into());
            packet.set_payload(&self.payload);
        }
        buf
    }
}

/// The payload every request carries: `'0' + index` for each payload byte.
#[must_use]
pub fn payload_pattern() -> [u8; PAYLOAD_SIZE] {
    let mut payload = [0u8; PAYLOAD_SIZE];
    for (index, byte) in (0u8..).zip(payload.iter_mut()) {
        *byte = b'0'.wrapping_add(index);
    }
    payload
}

/// First payload byte that differs from [`payload_pattern`], as
/// `(index, expected, received)`.
#[must_use]
pub fn payload_mismatch(payload: &[u8; PAYLOAD_SIZE]) -> Option<(usize, u8, u8)> {
    payload_pattern()
        .iter()
        .zip(payload.iter())
        .enumerate()
        .find(|(_, (expected, received))| expected != received)
        .map(|(index, (expected, received))| (index, *expected, *received))
}

/// Builds a stamped echo request.
#[must_use]
pub fn build_echo_request(identifier: u16, sequence: SequenceNumber) -> EchoMessage {
    let mut message = EchoMessage {
        icmp_type: IcmpType::EchoRequest,
        code: 0,
        checksum: 0,
        identifier,
        sequence,
        payload: payload_pattern(),
    };
    let mut bytes = message.to_bytes();
    checksum::stamp(&mut bytes, CHECKSUM_OFFSET);
    message.checksum = u16::from_be_bytes([bytes[CHECKSUM_OFFSET], bytes[CHECKSUM_OFFSET + 1]]);
    message
}

/// Why a received datagram could not be read as an ICMP message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Malformed {
    /// The IHL field announces less than the 20 byte minimum.
    IpHeaderLength(usize),
    /// The datagram ends before the ICMP header does.
    ShortDatagram { expected: usize, received: usize },
    /// An echo reply shorter than the request that was sent.
    TruncatedReply { expected: usize, received: usize },
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::IpHeaderLength(length) => write!(f, "ip header length {length}"),
            Malformed::ShortDatagram { expected, received } => {
                write!(f, "datagram of {received} bytes, need {expected}")
            }
            Malformed::TruncatedReply { expected, received } => {
                write!(f, "echo reply of {received} bytes, need {expected}")
            }
        }
    }
}

/// Classification of one received IP datagram.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodedReply {
    /// A checksum-valid echo reply.
    EchoReply { message: EchoMessage, ip_header_length: usize },
    /// An echo request, typically this probe's own request seen on loopback.
    Reflected { identifier: u16, sequence: SequenceNumber },
    /// A router dropped the request because its TTL ran out.
    TimeExceeded { code: u8 },
    /// Any other ICMP message.
    Unexpected { icmp_type: u8, code: u8 },
    /// An echo reply whose checksum does not match its content.
    Corrupted { sequence: SequenceNumber, mismatch: ChecksumMismatch },
    Malformed(Malformed),
}

/// Splits a raw IPv4 datagram into header and ICMP message and classifies it.
///
/// Never panics on short or inconsistent input; every length is checked
/// before the bytes behind it are read.
#[must_use]
pub fn decode_reply(raw: &[u8]) -> DecodedReply {
    let Some(&first) = raw.first() else {
        return DecodedReply::Malformed(Malformed::ShortDatagram {
            expected: MIN_IP_HEADER_SIZE + HEADER_SIZE,
            received: 0,
        });
    };
    let ip_header_length = usize::from(first & 0x0F) * 4;
    if ip_header_length < MIN_IP_HEADER_SIZE {
        return DecodedReply::Malformed(Malformed::IpHeaderLength(ip_header_length));
    }
    if raw.len() < ip_header_length + HEADER_SIZE {
        return DecodedReply::Malformed(Malformed::ShortDatagram {
            expected: ip_header_length + HEADER_SIZE,
            received: raw.len(),
        });
    }

    let icmp = &raw[ip_header_length..];
    let Some(icmp_packet) = IcmpPacket::new(icmp) else {
        return DecodedReply::Malformed(Malformed::ShortDatagram {
            expected: ip_header_length + HEADER_SIZE,
            received: raw.len(),
        });
    };
    let code = icmp_packet.get_icmp_code().0;

    match IcmpType::from(icmp_packet.get_icmp_type().0) {
        IcmpType::EchoReply => decode_echo_reply(raw, ip_header_length),
        IcmpType::EchoRequest => match EchoRequestPacket::new(icmp) {
            Some(request) => DecodedReply::Reflected {
                identifier: request.get_identifier(),
                sequence: request.get_sequence_number().into(),
            },
            None => DecodedReply::Malformed(Malformed::ShortDatagram {
                expected: ip_header_length + HEADER_SIZE,
                received: raw.len(),
            }),
        },
        IcmpType::TimeExceeded => DecodedReply::TimeExceeded { code },
        IcmpType::Other(icmp_type) => DecodedReply::Unexpected { icmp_type, code },
    }
}

fn decode_echo_reply(raw: &[u8], ip_header_length: usize) -> DecodedReply {
    let icmp = &raw[ip_header_length..];
    let Some(message) = EchoMessage::parse(icmp) else {
        return DecodedReply::Malformed(Malformed::TruncatedReply {
            expected: ip_header_length + PACKET_SIZE,
            received: raw.len(),
        });
    };
    if let Err(mismatch) = checksum::verify(icmp, CHECKSUM_OFFSET) {
        return DecodedReply::Corrupted { sequence: message.sequence, mismatch };
    }
    DecodedReply::EchoReply { message, ip_header_length }
}
