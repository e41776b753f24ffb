use enginelink_client::{
    CancelToken, ProtobufDecoder, SessionConfig, Supervisor, SupervisorConfig,
};
use enginelink_transport::TcpConnector;
use tracing::info;

use crate::cmd::{parse_duration, WatchArgs};
use crate::exit::{CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{ConsoleSink, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint = args.connect.endpoint();
    let tcp = args.tcp_config()?;
    let config = SupervisorConfig {
        backoff: parse_duration(&args.backoff)?,
        session: SessionConfig {
            poll_interval: parse_duration(&args.interval)?,
            max_payload_size: args.connect.max_payload,
            ..SessionConfig::default()
        },
    };

    let cancel = CancelToken::new();
    install_ctrlc_handler(cancel.clone())?;

    let sink = ConsoleSink::new(endpoint.clone(), format, cancel.clone()).with_limit(args.count);
    let mut supervisor = Supervisor::new(
        endpoint,
        TcpConnector::with_config(tcp),
        ProtobufDecoder::new(),
        sink,
    )
    .with_config(config);

    let stats = supervisor.run(&cancel);
    info!(
        attempts = stats.attempts,
        failed_attempts = stats.failed_attempts,
        sessions = stats.sessions,
        records = stats.records,
        "watch finished"
    );

    match args.count {
        Some(count) if supervisor.sink().printed() < count => Ok(FAILURE),
        _ => Ok(SUCCESS),
    }
}

fn install_ctrlc_handler(cancel: CancelToken) -> CliResult<()> {
    ctrlc::set_handler(move || cancel.cancel())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
