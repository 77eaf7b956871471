use std::sync::Arc;
use std::time::Duration;

use phishguard_engine::{
    ClientError, ClientSettings, EngineEvent, EngineHandle, PredictionClient, ServiceReply,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct EchoClient;

#[async_trait::async_trait]
impl PredictionClient for EchoClient {
    async fn send(&self, url: &str, model: &str) -> Result<ServiceReply, ClientError> {
        Ok(ServiceReply {
            status: 200,
            body: json!({"url": url, "model": model}),
        })
    }
}

#[test]
fn handle_reports_completion_with_request_id() {
    let engine = EngineHandle::with_client(Arc::new(EchoClient)).expect("engine starts");
    engine.submit(42, "https://example.com", "dt").expect("submit");

    let event = engine
        .recv_timeout(Duration::from_secs(5))
        .expect("completion event");

    assert_eq!(
        event,
        EngineEvent::PredictionCompleted {
            request_id: 42,
            result: Ok(ServiceReply {
                status: 200,
                body: json!({"url": "https://example.com", "model": "dt"}),
            }),
        }
    );
    assert!(engine.try_recv().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_drives_real_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(query_param("model", "lr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prediction": "legitimate"})))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        endpoint: server.uri(),
        ..ClientSettings::default()
    };

    let event = tokio::task::spawn_blocking(move || {
        let engine = EngineHandle::new(settings).expect("engine starts");
        engine.submit(1, "https://example.com", "lr").expect("submit");
        engine.recv_timeout(Duration::from_secs(10))
    })
    .await
    .expect("join");

    match event {
        Some(EngineEvent::PredictionCompleted { request_id, result }) => {
            assert_eq!(request_id, 1);
            assert_eq!(result.expect("reply").body, json!({"prediction": "legitimate"}));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
