//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::rooms::{RoomId, DEFAULT_ROOM};

/// Longest accepted fallback countdown (one day)
pub const MAX_FALLBACK_SECONDS: i64 = 24 * 60 * 60;

/// CLI argument parsing structure
#[derive(Debug, Clone, Parser)]
#[command(name = "madakoko")]
#[command(about = "Meeting room kiosk server counting down to the next reservation change")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "8333")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Base URL of the reservation service
    #[arg(long, default_value = "https://office.zukoshait.org")]
    pub api_base_url: String,

    /// Room shown at startup
    #[arg(short, long, default_value_t = DEFAULT_ROOM)]
    pub room: RoomId,

    /// Countdown length in seconds when there is no reservation to count towards
    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(i64).range(0..=MAX_FALLBACK_SECONDS)
    )]
    pub fallback_seconds: i64,

    /// Re-resolve the selected room every N seconds (0 disables)
    #[arg(long, default_value = "60")]
    pub refresh_seconds: u64,

    /// Timeout for reservation service requests in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_seconds: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn fallback_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.fallback_seconds)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_seconds > 0).then(|| Duration::from_secs(self.refresh_seconds))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
