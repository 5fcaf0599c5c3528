#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use config::PingConfig;
pub use dns::Target;
pub use ping_error::{PingError, PingResult};
pub use ping_output::PingOutput;
pub use ping_runner::PingRunner;
pub use statistics::{ProbeStatistics, RttSummary, Summary};

pub mod config;
pub mod dns;
pub mod icmp;
mod ping_error;
mod ping_output;
mod ping_receiver;
mod ping_runner;
mod ping_sender;
pub mod statistics;
