use std::time::Duration;

use phishguard_core::{Effect, Msg, RawServiceResponse, RequestError};
use phishguard_engine::{
    ClientError, ClientSettings, EngineError, EngineEvent, EngineHandle, FailureKind,
};
use phishguard_logging::{guard_info, guard_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    endpoint: String,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let endpoint = settings.endpoint.clone();
        let engine = EngineHandle::new(settings)?;
        Ok(Self { engine, endpoint })
    }

    /// Starts every effect. Effects that cannot even be handed to the engine
    /// come back as completion messages so the lifecycle still terminates.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::SendPrediction { request_id, query } => {
                    guard_info!(
                        "SendPrediction request_id={} model={} url_len={}",
                        request_id,
                        query.model,
                        query.url.len()
                    );
                    if let Err(err) =
                        self.engine
                            .submit(request_id, query.url, query.model.as_str())
                    {
                        guard_warn!("Request {} could not be dispatched: {}", request_id, err);
                        immediate.push(Msg::PredictionCompleted {
                            request_id,
                            outcome: Err(RequestError::unexpected()),
                        });
                    }
                }
            }
        }
        immediate
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine
            .recv_timeout(timeout)
            .map(|event| event_to_msg(event, &self.endpoint))
    }
}

fn event_to_msg(event: EngineEvent, endpoint: &str) -> Msg {
    match event {
        EngineEvent::PredictionCompleted { request_id, result } => Msg::PredictionCompleted {
            request_id,
            outcome: result
                .map(|reply| RawServiceResponse::from(reply.body))
                .map_err(|err| request_error(&err, endpoint)),
        },
    }
}

pub(crate) fn request_error(err: &ClientError, endpoint: &str) -> RequestError {
    match &err.kind {
        FailureKind::Timeout => RequestError::timeout(),
        FailureKind::Unreachable => RequestError::network_unreachable(endpoint),
        FailureKind::HttpStatus { server_message, .. } => {
            RequestError::service(server_message.clone())
        }
        FailureKind::BodyTooLarge { .. } | FailureKind::InvalidEndpoint | FailureKind::Other => {
            guard_warn!("Unexpected request failure: {}", err);
            RequestError::unexpected()
        }
    }
}

#[cfg(test)]
mod tests {
    use phishguard_core::RequestErrorKind;

    use super::*;

    fn client_error(kind: FailureKind) -> ClientError {
        ClientError {
            kind,
            message: "detail".to_string(),
        }
    }

    #[test]
    fn failure_kinds_map_onto_request_errors() {
        let endpoint = "http://127.0.0.1:5001";
        let cases = [
            (FailureKind::Timeout, RequestErrorKind::Timeout),
            (FailureKind::Unreachable, RequestErrorKind::NetworkUnreachable),
            (
                FailureKind::HttpStatus {
                    status: 400,
                    server_message: Some("bad model".to_string()),
                },
                RequestErrorKind::ServiceError("bad model".to_string()),
            ),
            (
                FailureKind::HttpStatus {
                    status: 500,
                    server_message: None,
                },
                RequestErrorKind::ServiceError(phishguard_core::SERVICE_ERROR_FALLBACK.to_string()),
            ),
            (
                FailureKind::BodyTooLarge { max_bytes: 1 },
                RequestErrorKind::Unexpected,
            ),
            (FailureKind::InvalidEndpoint, RequestErrorKind::Unexpected),
            (FailureKind::Other, RequestErrorKind::Unexpected),
        ];

        for (kind, expected) in cases {
            assert_eq!(request_error(&client_error(kind), endpoint).kind, expected);
        }
    }

    #[test]
    fn unreachable_message_names_the_endpoint() {
        let err = request_error(
            &client_error(FailureKind::Unreachable),
            "http://classifier:9000",
        );
        assert!(err.message.ends_with("http://classifier:9000"));
    }
}
