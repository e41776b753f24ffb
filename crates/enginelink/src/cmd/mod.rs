use std::time::Duration;

use clap::{Args, Subcommand};
use enginelink_frame::DEFAULT_MAX_PAYLOAD;
use enginelink_transport::{Endpoint, TcpConfig, DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

/// Bound on each connection attempt unless `--connect-timeout` is given.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub mod probe;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the server continuously, reconnecting on failure.
    Watch(WatchArgs),
    /// Request a single sample and exit.
    Probe(ProbeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Probe(args) => probe::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Telemetry server host.
    #[arg(long, env = "ENGINELINK_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Telemetry server port.
    #[arg(long, short = 'p', env = "ENGINELINK_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Bound on each connection attempt (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub connect_timeout: Option<String>,
    /// Drop the connection if a reply stalls this long (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub read_timeout: Option<String>,
    /// Largest accepted reply payload in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

impl ConnectArgs {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Socket options. Unset flags fall back to the given defaults.
    pub fn tcp_config(
        &self,
        default_connect: Option<Duration>,
        default_read: Option<Duration>,
    ) -> CliResult<TcpConfig> {
        let connect_timeout = parse_optional(self.connect_timeout.as_deref())?.or(default_connect);
        let read_timeout = parse_optional(self.read_timeout.as_deref())?.or(default_read);
        Ok(TcpConfig {
            connect_timeout,
            read_timeout,
            write_timeout: read_timeout,
            nodelay: true,
        })
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Pause between samples (e.g. 1s, 250ms).
    #[arg(long, value_name = "DURATION", default_value = "1s")]
    pub interval: String,
    /// Wait after a failed connection attempt (e.g. 2s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "2s")]
    pub backoff: String,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<u64>,
}

impl WatchArgs {
    /// Connect attempts are bounded; reads block unless `--read-timeout` is set.
    pub fn tcp_config(&self) -> CliResult<TcpConfig> {
        self.connect.tcp_config(Some(DEFAULT_CONNECT_TIMEOUT), None)
    }
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl ProbeArgs {
    pub fn tcp_config(&self) -> CliResult<TcpConfig> {
        self.connect
            .tcp_config(Some(DEFAULT_CONNECT_TIMEOUT), Some(DEFAULT_CONNECT_TIMEOUT))
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_optional(input: Option<&str>) -> CliResult<Option<Duration>> {
    input.map(parse_duration).transpose()
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
