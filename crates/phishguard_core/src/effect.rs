use crate::{Query, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `query` to the prediction service and report back with `request_id`.
    SendPrediction { request_id: RequestId, query: Query },
}
