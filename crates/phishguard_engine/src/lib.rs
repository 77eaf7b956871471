//! PhishGuard engine: prediction service client and background request execution.
mod client;
mod engine;
mod persist;
mod types;

pub use client::{ClientSettings, PredictionClient, ReqwestPredictionClient, DEFAULT_ENDPOINT};
pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use types::{ClientError, EngineEvent, FailureKind, RequestId, ServiceReply};
