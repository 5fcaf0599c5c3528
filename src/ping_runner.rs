use crate::config::PingConfig;
use crate::dns::Target;
use crate::icmp::v4::{payload_mismatch, DecodedReply, SequenceNumber, Socket, PAYLOAD_SIZE};
use crate::ping_error::{PingError, PingResult};
use crate::ping_output::PingOutput;
use crate::ping_receiver::{PingReceive, PingReceiver, ReceivedDatagram};
use crate::ping_sender::PingSender;
use crate::statistics::{ProbeStatistics, Summary};
use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const PACING_SLICE: Duration = Duration::from_millis(100);

/// How a probe cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cycle {
    /// The transmission stands; move on to the next sequence number.
    Done { pace: bool },
    /// The own request came back; send the same sequence number again.
    Retry,
}

/// Drives one echo request per cycle until cancelled or `count` is reached.
///
/// The socket is borrowed: it must already carry its TTL and receive timeout,
/// and it stays open when the runner is done.
pub struct PingRunner<'a, S> {
    config: &'a PingConfig,
    target: &'a Target,
    identifier: u16,
    ping_sender: PingSender<'a, S>,
    ping_receiver: PingReceiver<'a, S>,
    statistics: ProbeStatistics,
}

impl<'a, S> PingRunner<'a, S>
where
    S: Socket,
{
    pub fn new(socket: &'a S, target: &'a Target, config: &'a PingConfig, identifier: u16) -> Self {
        PingRunner {
            config,
            target,
            identifier,
            ping_sender: PingSender::new(socket, identifier, target.ip),
            ping_receiver: PingReceiver::new(socket),
            statistics: ProbeStatistics::new(),
        }
    }

    pub fn statistics(&self) -> &ProbeStatistics {
        &self.statistics
    }

    /// Runs the probe loop and writes every result line to `out`.
    ///
    /// `cancel` is polled once at the top of each cycle. Send and receive
    /// failures end the run with an error; anything odd that arrives on the
    /// socket is reported and the loop carries on.
    pub fn run<W: Write>(&mut self, cancel: &AtomicBool, out: &mut W) -> PingResult<Summary> {
        emit(
            out,
            &PingOutput::Start {
                destination: self.target.destination.clone(),
                ip: self.target.ip,
                payload_size: PAYLOAD_SIZE,
            },
        )?;

        let mut sequence_number = SequenceNumber::start_value();
        let mut retried = false;
        while !cancel.load(Ordering::SeqCst) && !self.count_reached() {
            match self.cycle(sequence_number, retried, cancel, out)? {
                Cycle::Retry => {
                    tracing::debug!(%sequence_number, "own request reflected, retrying");
                    retried = true;
                }
                Cycle::Done { pace } => {
                    sequence_number = sequence_number.next();
                    retried = false;
                    if pace && !self.count_reached() {
                        self.pace(cancel);
                    }
                }
            }
        }

        let summary = self.statistics.summarize();
        tracing::debug!(?summary, "probe loop finished");
        emit(
            out,
            &PingOutput::Statistics {
                destination: self.target.destination.clone(),
                summary,
            },
        )?;
        Ok(summary)
    }

    fn count_reached(&self) -> bool {
        self.config
            .count
            .map_or(false, |count| self.statistics.transmitted() >= u32::from(count))
    }

    /// Sends one request and waits for its outcome. Packets that belong to
    /// someone else do not end the wait; once one arrives after `timeout` has
    /// passed since sending, the cycle times out. Each receive blocks for up
    /// to the socket timeout, so a cycle ends at most one socket timeout past
    /// the last ignored packet.
    fn cycle<W: Write>(
        &mut self,
        sequence_number: SequenceNumber,
        retried: bool,
        cancel: &AtomicBool,
        out: &mut W,
    ) -> PingResult<Cycle> {
        let send_time = self.ping_sender.send(sequence_number)?;
        self.statistics.record_transmitted();

        loop {
            let datagram = match self.ping_receiver.receive()? {
                PingReceive::Timeout => {
                    emit(out, &PingOutput::Timeout { sequence: sequence_number })?;
                    return Ok(Cycle::Done { pace: true });
                }
                PingReceive::Interrupted => {
                    tracing::debug!(%sequence_number, "receive interrupted");
                    return Ok(Cycle::Done { pace: false });
                }
                PingReceive::Datagram(datagram) => datagram,
            };

            if let Some(cycle) = self.classify(datagram, sequence_number, send_time, retried, out)? {
                return Ok(cycle);
            }

            // Someone else's traffic; keep waiting for this cycle's reply.
            if cancel.load(Ordering::SeqCst) {
                return Ok(Cycle::Done { pace: false });
            }
            if send_time.elapsed() >= self.config.timeout {
                emit(out, &PingOutput::Timeout { sequence: sequence_number })?;
                return Ok(Cycle::Done { pace: true });
            }
        }
    }

    /// Returns `None` when the datagram does not belong to this cycle and the
    /// wait should go on.
    fn classify<W: Write>(
        &mut self,
        datagram: ReceivedDatagram,
        sequence_number: SequenceNumber,
        send_time: Instant,
        retried: bool,
        out: &mut W,
    ) -> PingResult<Option<Cycle>> {
        let ReceivedDatagram { size, icmp_size, source, reply, receive_time } = datagram;
        let output = match reply {
            DecodedReply::EchoReply { message, .. }
                if message.identifier != self.identifier || message.sequence != sequence_number =>
            {
                tracing::debug!(
                    %source,
                    identifier = message.identifier,
                    sequence_number = %message.sequence,
                    "echo reply not for this cycle"
                );
                if self.config.verbose {
                    emit(
                        out,
                        &PingOutput::Ignored {
                            bytes: icmp_size,
                            source,
                            identifier: message.identifier,
                            sequence: message.sequence,
                        },
                    )?;
                }
                return Ok(None);
            }
            DecodedReply::EchoReply { message, ip_header_length } => {
                let rtt_ms = receive_time.saturating_duration_since(send_time).as_secs_f64() * 1000.0;
                self.statistics.record_received(rtt_ms);
                emit(
                    out,
                    &PingOutput::Reply {
                        bytes: size - ip_header_length,
                        source,
                        name: self.display_name(source),
                        sequence: sequence_number,
                        ttl: self.config.ttl,
                        rtt_ms,
                    },
                )?;
                payload_mismatch(&message.payload)
                    .map(|(index, expected, received)| PingOutput::WrongData { index, expected, received })
            }
            DecodedReply::Reflected { identifier, sequence } => {
                if self.config.verbose {
                    emit(out, &PingOutput::Reflected { source, identifier, sequence })?;
                }
                if identifier == self.identifier && sequence == sequence_number && !retried {
                    self.statistics.undo_transmitted();
                    return Ok(Some(Cycle::Retry));
                }
                tracing::debug!(%source, identifier, sequence_number = %sequence, "echo request ignored");
                return Ok(None);
            }
            DecodedReply::TimeExceeded { code } => {
                tracing::debug!(%source, code, "time to live exceeded");
                Some(PingOutput::TimeExceeded { bytes: icmp_size, source })
            }
            DecodedReply::Unexpected { icmp_type, code } => {
                tracing::debug!(%source, icmp_type, code, "unexpected icmp message");
                Some(PingOutput::Unexpected { bytes: icmp_size, source, icmp_type, code })
            }
            DecodedReply::Corrupted { sequence, mismatch } => {
                tracing::warn!(%source, sequence_number = %sequence, ?mismatch, "echo reply with bad checksum");
                Some(PingOutput::Corrupted { bytes: icmp_size, source, sequence, mismatch })
            }
            DecodedReply::Malformed(reason) => {
                tracing::warn!(%source, size, %reason, "malformed datagram");
                Some(PingOutput::Malformed { bytes: size, source, reason })
            }
        };
        if let Some(output) = output {
            emit(out, &output)?;
        }
        Ok(Some(Cycle::Done { pace: true }))
    }

    fn display_name(&self, source: Ipv4Addr) -> Option<String> {
        if self.config.numeric || source != self.target.ip {
            return None;
        }
        self.target.name.clone()
    }

    fn pace(&self, cancel: &AtomicBool) {
        let deadline = Instant::now() + self.config.interval;
        loop {
            let now = Instant::now();
            if now >= deadline || cancel.load(Ordering::SeqCst) {
                return;
            }
            std::thread::sleep((deadline - now).min(PACING_SLICE));
        }
    }
}

fn emit<W: Write>(out: &mut W, output: &PingOutput) -> PingResult<()> {
    writeln!(out, "{output}").map_err(PingError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::v4::tests::{OnReceive, OnSend, SocketMock, REMOTE};
    use crate::icmp::v4::Ttl;
    use more_asserts as ma;

    const IDENTIFIER: u16 = 0x4D2;

    fn config(count: u16) -> PingConfig {
        PingConfig {
            count: Some(count),
            interval: Duration::ZERO,
            timeout: Duration::from_secs(1),
            ..PingConfig::default()
        }
    }

    fn target() -> Target {
        Target::new("93.184.216.34", REMOTE, None)
    }

    fn run(
        socket: &SocketMock,
        target: &Target,
        config: &PingConfig,
    ) -> (PingResult<Summary>, Vec<String>) {
        let cancel = AtomicBool::new(false);
        let mut out = Vec::new();
        let result = PingRunner::new(socket, target, config, IDENTIFIER).run(&cancel, &mut out);
        let lines = String::from_utf8(out).unwrap().lines().map(str::to_owned).collect();
        (result, lines)
    }

    #[test]
    fn three_replies() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply; 3]);

        let (result, lines) = run(&socket, &target(), &config(3));

        let summary = result.unwrap();
        assert_eq!((3, 3, 0), (summary.transmitted, summary.received, summary.loss_percent));
        socket.should_send_number_of_messages(3).should_send_to_address(&REMOTE);
        assert_eq!(vec![0, 1, 2], socket.sent_sequence_numbers());

        assert_eq!("PING 93.184.216.34 (93.184.216.34) 56 data bytes", lines[0]);
        for (index, line) in lines[1..4].iter().enumerate() {
            let prefix = format!("64 bytes from 93.184.216.34: icmp_seq={index} ttl=64 time=");
            assert!(line.starts_with(&prefix), "{line}");
            assert!(line.ends_with(" ms"), "{line}");
        }
        assert_eq!("--- 93.184.216.34 ping statistics ---", lines[4]);
        assert_eq!("3 packets transmitted, 3 received, 0% packet loss", lines[5]);
        assert!(lines[6].starts_with("rtt min/avg/max/mdev = "));
        ma::assert_ge!(summary.rtt.unwrap().min, 0.0);
    }

    #[test]
    fn time_exceeded_is_reported_and_not_counted() {
        let script = [OnReceive::EchoReply, OnReceive::TimeExceeded, OnReceive::EchoReply];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);

        let (result, lines) = run(&socket, &target(), &config(3));

        let summary = result.unwrap();
        assert_eq!((3, 2, 33), (summary.transmitted, summary.received, summary.loss_percent));
        assert_eq!("36 bytes from 10.0.0.1: Time to live exceeded", lines[2]);
        assert!(lines[3].contains("icmp_seq=2"));
        assert_eq!("3 packets transmitted, 2 received, 33% packet loss", lines[5]);
    }

    #[test]
    fn reflected_request_is_retried_once() {
        let script = [OnReceive::EchoReply, OnReceive::Reflect, OnReceive::EchoReply, OnReceive::EchoReply];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);

        let (result, lines) = run(&socket, &target(), &config(3));

        let summary = result.unwrap();
        assert_eq!((3, 3, 0), (summary.transmitted, summary.received, summary.loss_percent));
        assert_eq!(vec![0, 1, 1, 2], socket.sent_sequence_numbers());
        assert_eq!(3, lines.iter().filter(|line| line.starts_with("64 bytes from")).count());
    }

    #[test]
    fn second_reflection_in_a_cycle_does_not_resend() {
        let script = [OnReceive::Reflect, OnReceive::Reflect, OnReceive::EchoReply];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);

        let (result, _) = run(&socket, &target(), &config(1));

        let summary = result.unwrap();
        assert_eq!((1, 1), (summary.transmitted, summary.received));
        assert_eq!(vec![0, 0], socket.sent_sequence_numbers());
    }

    #[test]
    fn reflections_are_shown_when_verbose() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Reflect, OnReceive::EchoReply]);
        let config = PingConfig { verbose: true, ..config(1) };

        let (_, lines) = run(&socket, &target(), &config);

        assert_eq!(
            format!("echo request from 127.0.0.1 id={IDENTIFIER} icmp_seq=0 ignored"),
            lines[1]
        );
    }

    #[test]
    fn timeout_is_reported_and_not_counted() {
        let script = [OnReceive::EchoReply, OnReceive::Timeout, OnReceive::EchoReply];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);

        let (result, lines) = run(&socket, &target(), &config(3));

        let summary = result.unwrap();
        assert_eq!((3, 2, 33), (summary.transmitted, summary.received, summary.loss_percent));
        assert_eq!("Request timed out for icmp_seq=1", lines[2]);
    }

    #[test]
    fn all_timeouts_mean_full_loss() {
        let socket = SocketMock::new(OnSend::ReturnDefault, []);

        let (result, lines) = run(&socket, &target(), &config(2));

        let summary = result.unwrap();
        assert_eq!((2, 0, 100), (summary.transmitted, summary.received, summary.loss_percent));
        assert_eq!(None, summary.rtt);
        assert_eq!("2 packets transmitted, 0 received, 100% packet loss", lines.last().unwrap().as_str());
    }

    #[test]
    fn corrupted_reply_is_reported_and_not_counted() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::CorruptReply, OnReceive::EchoReply]);

        let (result, lines) = run(&socket, &target(), &config(2));

        let summary = result.unwrap();
        assert_eq!((2, 1), (summary.transmitted, summary.received));
        assert!(lines[1].starts_with("64 bytes from 93.184.216.34: icmp_seq=0 bad checksum"), "{}", lines[1]);
    }

    #[test]
    fn unexpected_type_is_reported() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Unexpected(3)]);

        let (result, lines) = run(&socket, &target(), &config(1));

        assert_eq!(0, result.unwrap().received);
        assert_eq!("8 bytes from 10.0.0.1: unexpected ICMP type 3 code 0", lines[1]);
    }

    #[test]
    fn truncated_reply_is_reported() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::TruncatedReply]);

        let (result, lines) = run(&socket, &target(), &config(1));

        assert_eq!(0, result.unwrap().received);
        assert_eq!(
            "40 bytes from 93.184.216.34: malformed packet (echo reply of 40 bytes, need 84)",
            lines[1]
        );
    }

    #[test]
    fn wrong_payload_is_counted_and_reported() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::WrongPayload]);

        let (result, lines) = run(&socket, &target(), &config(1));

        assert_eq!(1, result.unwrap().received);
        assert!(lines[1].starts_with("64 bytes from"));
        assert_eq!("wrong data byte #3 should be 0x33 but was 0xee", lines[2]);
    }

    #[test]
    fn foreign_and_stale_replies_are_skipped() {
        let script = [
            OnReceive::EchoReply,
            OnReceive::ForeignReply,
            OnReceive::StaleReply,
            OnReceive::EchoReply,
        ];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);

        let (result, lines) = run(&socket, &target(), &config(2));

        let summary = result.unwrap();
        assert_eq!((2, 2), (summary.transmitted, summary.received));
        socket.should_send_number_of_messages(2).should_receive_number_of_messages(4);
        assert!(lines[2].contains("icmp_seq=1"));
    }

    #[test]
    fn foreign_replies_are_shown_when_verbose() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::ForeignReply, OnReceive::EchoReply]);
        let config = PingConfig { verbose: true, ..config(1) };

        let (_, lines) = run(&socket, &target(), &config);

        let foreign_identifier = IDENTIFIER ^ 0xFF00;
        assert_eq!(
            format!("64 bytes from 93.184.216.34: echo reply id={foreign_identifier} icmp_seq=0 not for this probe"),
            lines[1]
        );
    }

    #[test]
    fn name_is_shown_for_the_target() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply]);
        let target = Target::new("example.com", REMOTE, Some("example.com".to_owned()));

        let (_, lines) = run(&socket, &target, &config(1));

        assert_eq!("PING example.com (93.184.216.34) 56 data bytes", lines[0]);
        assert!(lines[1].starts_with("64 bytes from example.com (93.184.216.34): icmp_seq=0 ttl=64"));
    }

    #[test]
    fn numeric_hides_the_name() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply]);
        let target = Target::new("example.com", REMOTE, Some("example.com".to_owned()));
        let config = PingConfig { numeric: true, ttl: Ttl(5), ..config(1) };

        let (_, lines) = run(&socket, &target, &config);

        assert!(lines[1].starts_with("64 bytes from 93.184.216.34: icmp_seq=0 ttl=5"));
    }

    #[test]
    fn send_failure_is_fatal() {
        let socket = SocketMock::new(OnSend::ReturnErr, [OnReceive::EchoReply]);

        let (result, lines) = run(&socket, &target(), &config(3));

        assert!(matches!(result, Err(PingError::Send(_))));
        assert_eq!(1, lines.len());
    }

    #[test]
    fn zero_length_send_is_fatal() {
        let socket = SocketMock::new(OnSend::ReturnZero, []);

        let (result, _) = run(&socket, &target(), &config(3));

        assert!(matches!(result, Err(PingError::SocketClosed)));
    }

    #[test]
    fn receive_failure_is_fatal() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply, OnReceive::ReturnErr]);

        let (result, _) = run(&socket, &target(), &config(3));

        assert!(matches!(result, Err(PingError::Receive(_))));
    }

    #[test]
    fn zero_length_receive_is_fatal() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Closed]);

        let (result, _) = run(&socket, &target(), &config(3));

        assert!(matches!(result, Err(PingError::SocketClosed)));
    }

    #[test]
    fn interrupted_receive_ends_the_cycle_quietly() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Interrupted, OnReceive::EchoReply]);

        let (result, lines) = run(&socket, &target(), &config(2));

        let summary = result.unwrap();
        assert_eq!((2, 1), (summary.transmitted, summary.received));
        assert!(lines[1].contains("icmp_seq=1"));
    }

    #[test]
    fn cancelled_before_start_sends_nothing() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply]);
        let target = target();
        let config = PingConfig { interval: Duration::ZERO, ..PingConfig::default() };
        let cancel = AtomicBool::new(true);
        let mut out = Vec::new();

        let summary = PingRunner::new(&socket, &target, &config, IDENTIFIER).run(&cancel, &mut out).unwrap();

        assert_eq!((0, 0, 0), (summary.transmitted, summary.received, summary.loss_percent));
        socket.should_send_number_of_messages(0);
        let output = String::from_utf8(out).unwrap();
        assert!(output.ends_with("0 packets transmitted, 0 received, 0% packet loss\n"));
    }

    #[test]
    fn statistics_outlive_the_run() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply, OnReceive::Timeout]);
        let target = target();
        let config = config(2);
        let cancel = AtomicBool::new(false);
        let mut runner = PingRunner::new(&socket, &target, &config, IDENTIFIER);

        let summary = runner.run(&cancel, &mut std::io::sink()).unwrap();

        assert_eq!(2, runner.statistics().transmitted());
        assert_eq!(1, runner.statistics().received());
        assert_eq!(summary, runner.statistics().summarize());
    }

    #[test]
    fn ignored_traffic_past_the_timeout_ends_the_cycle() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::ForeignReply, OnReceive::EchoReply]);
        let config = PingConfig { timeout: Duration::from_nanos(1), ..config(2) };

        let (result, lines) = run(&socket, &target(), &config);

        let summary = result.unwrap();
        assert_eq!((2, 1), (summary.transmitted, summary.received));
        assert_eq!("Request timed out for icmp_seq=0", lines[1]);
        assert!(lines[2].contains("icmp_seq=1"));
        socket.should_send_number_of_messages(2).should_receive_number_of_messages(2);
    }

    const SHORT_INTERVAL: Duration = Duration::from_millis(50);
    const LONG_INTERVAL: Duration = Duration::from_secs(5);

    fn timed_run(socket: &SocketMock, config: &PingConfig) -> (Summary, Duration) {
        let target = target();
        let cancel = AtomicBool::new(false);
        let start = Instant::now();
        let summary = PingRunner::new(socket, &target, config, IDENTIFIER)
            .run(&cancel, &mut std::io::sink())
            .unwrap();
        (summary, start.elapsed())
    }

    #[test]
    fn interval_follows_every_settled_cycle() {
        let outcomes = [
            OnReceive::EchoReply,
            OnReceive::Timeout,
            OnReceive::TimeExceeded,
            OnReceive::Unexpected(3),
            OnReceive::CorruptReply,
            OnReceive::TruncatedReply,
        ];
        for first in outcomes {
            let socket = SocketMock::new(OnSend::ReturnDefault, [first, OnReceive::EchoReply, OnReceive::EchoReply]);
            let config = PingConfig { interval: SHORT_INTERVAL, ..config(3) };

            let (summary, elapsed) = timed_run(&socket, &config);

            assert_eq!(3, summary.transmitted, "{first:?}");
            ma::assert_ge!(elapsed, 2 * SHORT_INTERVAL, "{first:?}");
        }
    }

    #[test]
    fn no_interval_after_the_last_cycle() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReply]);
        let config = PingConfig { interval: LONG_INTERVAL, ..config(1) };

        let (summary, elapsed) = timed_run(&socket, &config);

        assert_eq!(1, summary.received);
        ma::assert_lt!(elapsed, Duration::from_secs(1));
    }

    #[test]
    fn no_interval_before_a_retry() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Reflect, OnReceive::EchoReply]);
        let config = PingConfig { interval: LONG_INTERVAL, ..config(1) };

        let (summary, elapsed) = timed_run(&socket, &config);

        assert_eq!((1, 1), (summary.transmitted, summary.received));
        assert_eq!(vec![0, 0], socket.sent_sequence_numbers());
        ma::assert_lt!(elapsed, Duration::from_secs(1));
    }

    #[test]
    fn no_interval_after_an_interrupted_receive() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::Interrupted, OnReceive::EchoReply]);
        let config = PingConfig { interval: LONG_INTERVAL, ..config(2) };

        let (summary, elapsed) = timed_run(&socket, &config);

        assert_eq!((2, 1), (summary.transmitted, summary.received));
        ma::assert_lt!(elapsed, Duration::from_secs(1));
    }

    #[test]
    fn cancel_during_a_cycle_stops_at_the_next_boundary() {
        let script = [OnReceive::EchoReply, OnReceive::EchoReplyAndCancel, OnReceive::EchoReply];
        let socket = SocketMock::new(OnSend::ReturnDefault, script);
        let cancel = socket.cancel_flag();
        let target = target();
        let config = PingConfig { interval: SHORT_INTERVAL, count: None, ..PingConfig::default() };
        let mut out = Vec::new();

        let summary = PingRunner::new(&socket, &target, &config, IDENTIFIER).run(&cancel, &mut out).unwrap();

        assert_eq!((2, 2, 0), (summary.transmitted, summary.received, summary.loss_percent));
        assert_eq!(vec![0, 1], socket.sent_sequence_numbers());
        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!("--- 93.184.216.34 ping statistics ---", lines[3]);
        assert_eq!("2 packets transmitted, 2 received, 0% packet loss", lines[4]);
    }

    #[test]
    fn cancel_cuts_the_interval_short() {
        let socket = SocketMock::new(OnSend::ReturnDefault, [OnReceive::EchoReplyAndCancel]);
        let cancel = socket.cancel_flag();
        let target = target();
        let config = PingConfig { interval: LONG_INTERVAL, count: None, ..PingConfig::default() };
        let start = Instant::now();

        let summary = PingRunner::new(&socket, &target, &config, IDENTIFIER)
            .run(&cancel, &mut std::io::sink())
            .unwrap();

        assert_eq!((1, 1), (summary.transmitted, summary.received));
        ma::assert_lt!(start.elapsed(), Duration::from_secs(1));
    }
}
