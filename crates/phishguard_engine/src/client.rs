use std::time::Duration;

use futures_util::StreamExt;
use phishguard_logging::{guard_debug, guard_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use serde_json::{json, Value};

use crate::{ClientError, FailureKind, ServiceReply};

/// Address the prediction service listens on out of the box.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL; `/predict` is appended.
    pub endpoint: String,
    /// Single limit measured from dispatch until the whole body has been read.
    /// Connection setup counts against it; there is no separate connect limit.
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_millis(30_000),
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait PredictionClient: Send + Sync {
    /// Asks the service to classify `url` with the classifier named `model`.
    ///
    /// Never retries.
    async fn send(&self, url: &str, model: &str) -> Result<ServiceReply, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPredictionClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestPredictionClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Other, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn predict_url(&self, model: &str) -> Result<Url, ClientError> {
        let base = self.settings.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/predict"))
            .map_err(|err| ClientError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        url.query_pairs_mut().append_pair("model", model);
        Ok(url)
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, ClientError> {
        let max_bytes = self.settings.max_body_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(ClientError::new(
                FailureKind::BodyTooLarge { max_bytes },
                "response too large",
            ));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(ClientError::new(
                    FailureKind::BodyTooLarge { max_bytes },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PredictionClient for ReqwestPredictionClient {
    async fn send(&self, url: &str, model: &str) -> Result<ServiceReply, ClientError> {
        let endpoint = self.predict_url(model)?;
        let payload = serde_json::to_vec(&json!({ "url": url }))
            .map_err(|err| ClientError::new(FailureKind::Other, err.to_string()))?;
        guard_debug!("POST {} url_len={}", endpoint, url.len());

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let server_message = match self.read_body(response).await {
                Ok(bytes) => error_field(&bytes),
                Err(err) if err.kind == FailureKind::Timeout => return Err(err),
                Err(_) => None,
            };
            guard_warn!("Prediction service answered {}: {:?}", status, server_message);
            return Err(ClientError::new(
                FailureKind::HttpStatus {
                    status: status.as_u16(),
                    server_message,
                },
                status.to_string(),
            ));
        }

        let bytes = self.read_body(response).await?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            guard_warn!("Prediction service sent a non-JSON body: {}", err);
            Value::Null
        });

        Ok(ServiceReply {
            status: status.as_u16(),
            body,
        })
    }
}

/// The `error` string of a JSON error body, if there is one.
fn error_field(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;
    body.get("error")?.as_str().map(str::to_owned)
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_connect() {
        return ClientError::new(FailureKind::Unreachable, err.to_string());
    }
    ClientError::new(FailureKind::Other, err.to_string())
}
