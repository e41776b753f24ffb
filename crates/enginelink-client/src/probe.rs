use enginelink_frame::{write_request, FrameRead, FrameReader};
use enginelink_transport::{Connector, Endpoint};
use tracing::debug;

use crate::decoder::Decoder;
use crate::error::{ClientError, Result};
use crate::record::TelemetryRecord;
use crate::session::SessionConfig;

/// Connect once, send one request and decode one reply.
///
/// Unlike the supervisor this performs no retries; every failure is returned.
pub fn probe<C, D>(
    connector: &mut C,
    endpoint: &Endpoint,
    config: &SessionConfig,
    decoder: &mut D,
) -> Result<TelemetryRecord>
where
    C: Connector,
    D: Decoder + ?Sized,
{
    let mut conn = connector.connect(endpoint)?;
    let mut reader = FrameReader::with_config(&mut conn, config.frame_config());

    write_request(reader.get_mut(), &config.request_token)?;
    let payload = match reader.read_frame()? {
        FrameRead::Frame(payload) => payload,
        FrameRead::Closed {
            stage,
            expected,
            received,
        } => {
            return Err(ClientError::Disconnected {
                stage,
                expected,
                received,
            })
        }
    };
    debug!(%endpoint, len = payload.len(), "probe reply");

    Ok(decoder.decode(&payload)?)
}

#[cfg(test)]
mod tests {
    use enginelink_frame::FrameStage;

    use super::*;
    use crate::cancel::CancelToken;
    use crate::clock::VirtualClock;
    use crate::decoder::from_fn;
    use crate::error::DecodeError;
    use crate::testing::{frame, Attempt, ScriptedConnector};

    fn connector(script: Vec<Attempt>) -> ScriptedConnector {
        ScriptedConnector::new(script, VirtualClock::new(), CancelToken::new())
    }

    fn len_decoder() -> impl Decoder {
        from_fn(|payload: &[u8]| Ok(TelemetryRecord::new(payload.len() as i32, 0.0, 0)))
    }

    #[test]
    fn returns_single_record() {
        let mut connector = connector(vec![Attempt::Accept(frame(b"abcd"))]);
        let record = probe(
            &mut connector,
            &Endpoint::default(),
            &SessionConfig::default(),
            &mut len_decoder(),
        )
        .unwrap();
        assert_eq!(record.rpm(), 4);
    }

    #[test]
    fn connect_failure_is_returned() {
        let mut connector = connector(vec![Attempt::Refuse]);
        let err = probe(
            &mut connector,
            &Endpoint::default(),
            &SessionConfig::default(),
            &mut len_decoder(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn close_before_reply_is_disconnected() {
        let mut connector = connector(vec![Attempt::Accept(Vec::new())]);
        let err = probe(
            &mut connector,
            &Endpoint::default(),
            &SessionConfig::default(),
            &mut len_decoder(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Disconnected {
                stage: FrameStage::LengthPrefix,
                received: 0,
                ..
            }
        ));
    }

    #[test]
    fn decode_failure_is_returned() {
        let mut connector = connector(vec![Attempt::Accept(frame(b"x"))]);
        let mut decoder = from_fn(|_: &[u8]| Err(DecodeError::Malformed("bad".into())));
        let err = probe(
            &mut connector,
            &Endpoint::default(),
            &SessionConfig::default(),
            &mut decoder,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Decode(DecodeError::Malformed(_))));
    }
}
