use enginelink_client::{probe, ProtobufDecoder, SessionConfig};
use enginelink_transport::TcpConnector;

use crate::cmd::ProbeArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let endpoint = args.connect.endpoint();
    let mut connector = TcpConnector::with_config(args.tcp_config()?);
    let config = SessionConfig {
        max_payload_size: args.connect.max_payload,
        ..SessionConfig::default()
    };

    let record = probe(
        &mut connector,
        &endpoint,
        &config,
        &mut ProtobufDecoder::new(),
    )
    .map_err(|err| client_error("probe failed", err))?;

    print_record(&record, &endpoint, format);
    Ok(SUCCESS)
}
