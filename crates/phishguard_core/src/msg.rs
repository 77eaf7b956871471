use crate::{RawServiceResponse, RequestError, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for `url` to be checked with the classifier named `model`.
    Submitted { url: String, model: String },
    /// The prediction service answered, or the request failed before it could.
    PredictionCompleted {
        request_id: RequestId,
        outcome: Result<RawServiceResponse, RequestError>,
    },
    /// User dismissed the current result or error.
    Cleared,
}
