use crate::icmp::v4::Ttl;
use crate::ping_error::{PingError, PingResult};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct PingConfig {
    /// TTL applied to outgoing requests.
    pub ttl: Ttl,
    /// Receive timeout of the socket.
    pub timeout: Duration,
    /// Pause between two probe cycles.
    pub interval: Duration,
    /// Stop after this many transmissions. `None` runs until cancelled.
    pub count: Option<u16>,
    /// Never show host names.
    pub numeric: bool,
    pub verbose: bool,
}

impl Default for PingConfig {
    fn default() -> Self {
        PingConfig {
            ttl: Ttl::default(),
            timeout: Duration::from_secs(2),
            interval: Duration::from_secs(1),
            count: None,
            numeric: false,
            verbose: false,
        }
    }
}

impl PingConfig {
    pub fn validate(&self) -> PingResult<()> {
        if self.ttl.0 == 0 {
            return Err(PingError::InvalidConfig("ttl must be in 1..=255".to_owned()));
        }
        if self.timeout.is_zero() {
            return Err(PingError::InvalidConfig("timeout must be greater than zero".to_owned()));
        }
        if self.count == Some(0) {
            return Err(PingError::InvalidConfig("count must be greater than zero".to_owned()));
        }
        Ok(())
    }
}
