use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use phishguard_logging::{guard_debug, guard_info};

use crate::client::{ClientSettings, PredictionClient, ReqwestPredictionClient};
use crate::{ClientError, EngineEvent, RequestId};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build prediction client: {0}")]
    Client(#[from] ClientError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("engine thread has stopped")]
    Stopped,
}

enum EngineCommand {
    Predict {
        request_id: RequestId,
        url: String,
        model: String,
    },
}

/// Runs prediction requests on a background tokio runtime.
///
/// Commands go in through [`EngineHandle::submit`]; completions come back as
/// [`EngineEvent`]s. Dropping the handle stops the worker thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = ReqwestPredictionClient::new(settings)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn PredictionClient>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new().map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("phishguard-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(client.as_ref(), command, event_tx).await;
                    });
                }
                guard_debug!("Engine command channel closed; shutting down");
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(
        &self,
        request_id: RequestId,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Predict {
                request_id,
                url: url.into(),
                model: model.into(),
            })
            .map_err(|_| EngineError::Stopped)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    client: &dyn PredictionClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Predict {
            request_id,
            url,
            model,
        } => {
            let result = client.send(&url, &model).await;
            match &result {
                Ok(reply) => guard_info!(
                    "Request {} completed with status {}",
                    request_id,
                    reply.status
                ),
                Err(err) => guard_info!("Request {} failed: {}", request_id, err),
            }
            let _ = event_tx.send(EngineEvent::PredictionCompleted { request_id, result });
        }
    }
}
