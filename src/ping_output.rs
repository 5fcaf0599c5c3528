use crate::icmp::v4::{ChecksumMismatch, Malformed, SequenceNumber, Ttl};
use crate::statistics::Summary;
use std::fmt;
use std::net::Ipv4Addr;

/// One line of user-facing output.
#[derive(Clone, Debug, PartialEq)]
pub enum PingOutput {
    Start {
        destination: String,
        ip: Ipv4Addr,
        payload_size: usize,
    },
    Reply {
        bytes: usize,
        source: Ipv4Addr,
        name: Option<String>,
        sequence: SequenceNumber,
        ttl: Ttl,
        rtt_ms: f64,
    },
    WrongData {
        index: usize,
        expected: u8,
        received: u8,
    },
    TimeExceeded {
        bytes: usize,
        source: Ipv4Addr,
    },
    Unexpected {
        bytes: usize,
        source: Ipv4Addr,
        icmp_type: u8,
        code: u8,
    },
    Corrupted {
        bytes: usize,
        source: Ipv4Addr,
        sequence: SequenceNumber,
        mismatch: ChecksumMismatch,
    },
    Malformed {
        bytes: usize,
        source: Ipv4Addr,
        reason: Malformed,
    },
    Timeout {
        sequence: SequenceNumber,
    },
    Reflected {
        source: Ipv4Addr,
        identifier: u16,
        sequence: SequenceNumber,
    },
    Ignored {
        bytes: usize,
        source: Ipv4Addr,
        identifier: u16,
        sequence: SequenceNumber,
    },
    Statistics {
        destination: String,
        summary: Summary,
    },
}

impl fmt::Display for PingOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PingOutput::Start { destination, ip, payload_size } => {
                write!(f, "PING {destination} ({ip}) {payload_size} data bytes")
            }
            PingOutput::Reply { bytes, source, name, sequence, ttl, rtt_ms } => {
                write!(f, "{bytes} bytes from ")?;
                match name {
                    Some(name) => write!(f, "{name} ({source})")?,
                    None => write!(f, "{source}")?,
                }
                write!(f, ": icmp_seq={sequence} ttl={ttl} time={rtt_ms:.3} ms")
            }
            PingOutput::WrongData { index, expected, received } => {
                write!(f, "wrong data byte #{index} should be {expected:#04x} but was {received:#04x}")
            }
            PingOutput::TimeExceeded { bytes, source } => {
                write!(f, "{bytes} bytes from {source}: Time to live exceeded")
            }
            PingOutput::Unexpected { bytes, source, icmp_type, code } => {
                write!(f, "{bytes} bytes from {source}: unexpected ICMP type {icmp_type} code {code}")
            }
            PingOutput::Corrupted { bytes, source, sequence, mismatch } => write!(
                f,
                "{bytes} bytes from {source}: icmp_seq={sequence} bad checksum (expected {:#06x}, computed {:#06x})",
                mismatch.expected, mismatch.computed
            ),
            PingOutput::Malformed { bytes, source, reason } => {
                write!(f, "{bytes} bytes from {source}: malformed packet ({reason})")
            }
            PingOutput::Timeout { sequence } => write!(f, "Request timed out for icmp_seq={sequence}"),
            PingOutput::Reflected { source, identifier, sequence } => {
                write!(f, "echo request from {source} id={identifier} icmp_seq={sequence} ignored")
            }
            PingOutput::Ignored { bytes, source, identifier, sequence } => write!(
                f,
                "{bytes} bytes from {source}: echo reply id={identifier} icmp_seq={sequence} not for this probe"
            ),
            PingOutput::Statistics { destination, summary } => {
                writeln!(f, "--- {destination} ping statistics ---")?;
                write!(
                    f,
                    "{} packets transmitted, {} received, {}% packet loss",
                    summary.transmitted, summary.received, summary.loss_percent
                )?;
                if let Some(rtt) = summary.rtt {
                    write!(
                        f,
                        "\nrtt min/avg/max/mdev = {:.3}/{:.3}/{:.3}/{:.3} ms",
                        rtt.min, rtt.avg, rtt.max, rtt.mdev
                    )?;
                }
                Ok(())
            }
        }
    }
}
