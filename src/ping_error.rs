use std::io;
use thiserror::Error;

pub type PingResult<T> = std::result::Result<T, PingError>;

#[derive(Error, Debug)]
pub enum PingError {
    #[error("sendto: {0}")]
    Send(#[source] io::Error),
    #[error("recvmsg: {0}")]
    Receive(#[source] io::Error),
    #[error("socket closed")]
    SocketClosed,
    #[error("socket: {0}")]
    Socket(#[source] io::Error),
    #[error("lacking privilege for icmp socket")]
    Privilege,
    #[error("{host}: {reason}")]
    Resolve { host: String, reason: String },
    #[error("invalid argument: {0}")]
    InvalidConfig(String),
    #[error("write: {0}")]
    Output(#[source] io::Error),
}

impl PingError {
    /// Maps a socket creation error, singling out missing privileges.
    pub(crate) fn from_socket_creation(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => PingError::Privilege,
            _ => PingError::Socket(error),
        }
    }
}
