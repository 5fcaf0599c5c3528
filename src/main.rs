use ft_ping::icmp::v4::{DgramSocket, RawSocket, Socket, Ttl};
use ft_ping::{PingConfig, PingError, PingResult, PingRunner, Target};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static CANCELLED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigint(_: nix::libc::c_int) {
    CANCELLED.store(true, Ordering::SeqCst);
}

#[derive(argh::FromArgs)]
/// ft_ping - send ICMP ECHO_REQUEST to a network host
struct Args {
    #[argh(option, short = 'c')]
    /// stop after <count> sent echo requests
    count: Option<u16>,

    #[argh(option, short = 'i', default = "1.0")]
    /// wait <interval> seconds between sending each request
    interval: f64,

    #[argh(option, short = 't', default = "64")]
    /// set the IP time to live
    ttl: u8,

    #[argh(option, short = 'W', default = "2.0")]
    /// time to wait for a response, in seconds
    timeout: f64,

    #[argh(switch, short = 'n')]
    /// numeric output only, no host name lookups
    numeric: bool,

    #[argh(switch, short = 'v')]
    /// verbose output
    verbose: bool,

    #[argh(positional)]
    /// host name or IPv4 address
    destination: String,
}

fn seconds(name: &str, value: f64) -> PingResult<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| PingError::InvalidConfig(format!("bad {name}: {value}")))
}

fn install_sigint_handler() -> PingResult<()> {
    let action = SigAction::new(SigHandler::Handler(handle_sigint), SaFlags::SA_RESTART, SigSet::empty());
    // The handler only touches an atomic.
    unsafe { signal::sigaction(Signal::SIGINT, &action) }
        .map(|_| ())
        .map_err(|errno| PingError::Socket(errno.into()))
}

fn run(args: Args) -> PingResult<()> {
    let config = PingConfig {
        ttl: Ttl(args.ttl),
        timeout: seconds("timeout", args.timeout)?,
        interval: seconds("interval", args.interval)?,
        count: args.count,
        numeric: args.numeric,
        verbose: args.verbose,
    };
    config.validate()?;
    tracing::debug!(?config, "starting");

    let target = Target::resolve(&args.destination, config.numeric)?;
    match RawSocket::create(config.ttl, config.timeout) {
        Ok(socket) => {
            // The identifier field is 16 bits wide; the low half of the pid is enough.
            #[allow(clippy::cast_possible_truncation)]
            let identifier = std::process::id() as u16;
            probe(&socket, &target, &config, identifier)
        }
        Err(PingError::Privilege) => {
            tracing::debug!("no raw socket privilege, falling back to a dgram icmp socket");
            let socket = DgramSocket::create(config.ttl, config.timeout)?;
            let identifier = socket.identifier()?;
            probe(&socket, &target, &config, identifier)
        }
        Err(e) => Err(e),
    }
}

fn probe<S: Socket>(socket: &S, target: &Target, config: &PingConfig, identifier: u16) -> PingResult<()> {
    install_sigint_handler()?;
    let mut runner = PingRunner::new(socket, target, config, identifier);
    let stdout = std::io::stdout();
    runner.run(&CANCELLED, &mut stdout.lock())?;
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("ft_ping: {e}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ft_ping: {e}");
            ExitCode::FAILURE
        }
    }
}
