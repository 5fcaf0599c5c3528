/// Running delivery counters for one probe run.
#[derive(Debug, Default)]
pub struct ProbeStatistics {
    transmitted: u32,
    received: u32,
    rtt_min: f64,
    rtt_max: f64,
    rtt_sum: f64,
    rtt_sum_sq: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RttSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub mdev: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub transmitted: u32,
    pub received: u32,
    pub loss_percent: u32,
    /// `None` until at least one reply was received.
    pub rtt: Option<RttSummary>,
}

impl ProbeStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_transmitted(&mut self) {
        self.transmitted += 1;
    }

    /// Takes back the last transmission, for a cycle that is retried.
    pub fn undo_transmitted(&mut self) {
        self.transmitted = self.transmitted.saturating_sub(1);
    }

    /// Counts a matched reply and its round-trip time in milliseconds.
    pub fn record_received(&mut self, rtt_ms: f64) {
        if self.received == 0 {
            self.rtt_min = rtt_ms;
            self.rtt_max = rtt_ms;
        } else {
            self.rtt_min = self.rtt_min.min(rtt_ms);
            self.rtt_max = self.rtt_max.max(rtt_ms);
        }
        self.received += 1;
        self.rtt_sum += rtt_ms;
        self.rtt_sum_sq += rtt_ms * rtt_ms;
    }

    pub fn transmitted(&self) -> u32 {
        self.transmitted
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    pub fn summarize(&self) -> Summary {
        Summary {
            transmitted: self.transmitted,
            received: self.received,
            loss_percent: loss_percent(self.transmitted, self.received),
            rtt: self.rtt_summary(),
        }
    }

    fn rtt_summary(&self) -> Option<RttSummary> {
        if self.received == 0 {
            return None;
        }
        let n = f64::from(self.received);
        let avg = self.rtt_sum / n;
        let variance = (self.rtt_sum_sq / n - avg * avg).max(0.0);
        Some(RttSummary {
            min: self.rtt_min,
            avg,
            max: self.rtt_max,
            mdev: variance.sqrt(),
        })
    }
}

/// Percentage of transmissions without a reply, rounded to the nearest
/// integer. Zero when nothing was sent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn loss_percent(transmitted: u32, received: u32) -> u32 {
    if transmitted == 0 {
        return 0;
    }
    let lost = f64::from(transmitted.saturating_sub(received));
    (lost / f64::from(transmitted) * 100.0).round() as u32
}
