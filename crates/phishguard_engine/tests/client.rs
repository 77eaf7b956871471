use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};

use phishguard_engine::{
    ClientSettings, FailureKind, PredictionClient, ReqwestPredictionClient,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestPredictionClient {
    client_with(ClientSettings {
        endpoint: server.uri(),
        ..ClientSettings::default()
    })
}

fn client_with(settings: ClientSettings) -> ReqwestPredictionClient {
    ReqwestPredictionClient::new(settings).expect("client builds")
}

#[test]
fn default_timeout_is_thirty_seconds() {
    let settings = ClientSettings::default();
    assert_eq!(settings.request_timeout, Duration::from_millis(30_000));
    assert_eq!(settings.endpoint, "http://127.0.0.1:5001");
}

#[tokio::test]
async fn posts_url_as_json_with_model_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(query_param("model", "rf"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://example.com",
            "model": "random_forest",
            "prediction": "Phishing",
            "confidence": 0.85
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send("https://example.com", "rf")
        .await
        .expect("prediction ok");

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["prediction"], "Phishing");
    assert_eq!(reply.body["confidence"], 0.85);
}

#[tokio::test]
async fn endpoint_trailing_slash_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "legitimate"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(ClientSettings {
        endpoint: format!("{}/", server.uri()),
        ..ClientSettings::default()
    });
    let reply = client.send("https://example.com", "lr").await.expect("ok");
    assert_eq!(reply.body, json!({"result": "legitimate"}));
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad model"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send("https://example.com", "xx")
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 400,
            server_message: Some("bad model".to_string()),
        }
    );
}

#[tokio::test]
async fn error_status_without_json_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send("https://example.com", "lr")
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 502,
            server_message: None,
        }
    );
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"prediction": "phishing"})),
        )
        .mount(&server)
        .await;

    let client = client_with(ClientSettings {
        endpoint: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    });

    let err = client.send("https://example.com", "lr").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let client = client_with(ClientSettings {
        endpoint: format!("http://127.0.0.1:{port}"),
        ..ClientSettings::default()
    });

    let err = client.send("https://example.com", "lr").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Unreachable);
}

#[tokio::test]
async fn stalled_connect_waits_for_the_full_request_timeout() {
    // Never accepts; once the backlog is full further handshakes hang.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let mut backlog = Vec::new();
    for _ in 0..1024 {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(20)) {
            Ok(stream) => backlog.push(stream),
            Err(_) => break,
        }
    }

    let request_timeout = Duration::from_millis(300);
    let client = client_with(ClientSettings {
        endpoint: format!("http://{addr}"),
        request_timeout,
        ..ClientSettings::default()
    });

    let started = Instant::now();
    let err = client.send("https://example.com", "lr").await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(
        elapsed >= request_timeout - Duration::from_millis(10),
        "timed out after {elapsed:?}"
    );
    drop(listener);
}

#[tokio::test]
async fn non_json_success_body_becomes_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("phishing"))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .send("https://example.com", "dt")
        .await
        .expect("reply");
    assert_eq!(reply.body, Value::Null);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let client = client_with(ClientSettings {
        endpoint: server.uri(),
        max_body_bytes: 16,
        ..ClientSettings::default()
    });

    let err = client.send("https://example.com", "lr").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::BodyTooLarge { max_bytes: 16 });
}

#[tokio::test]
async fn bad_endpoint_is_reported() {
    let client = client_with(ClientSettings {
        endpoint: "not an endpoint".to_string(),
        ..ClientSettings::default()
    });

    let err = client.send("https://example.com", "lr").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
