use crate::view_model::{AppViewModel, PendingView, Phase, VerdictView};
use crate::{ConfidenceDisplay, Normalizer, PredictionResult, Query, RequestError};

pub type RequestId = u64;

/// Where the current submission stands. Exactly one variant is live.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading(Query),
    Success(PredictionResult),
    Failed(RequestError),
}

impl LifecycleState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LifecycleState::Loading(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    lifecycle: LifecycleState,
    in_flight: Option<RequestId>,
    last_request_id: RequestId,
    normalizer: Normalizer,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_display(display: ConfidenceDisplay) -> Self {
        Self {
            normalizer: Normalizer::new(display),
            ..Self::default()
        }
    }

    pub fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    /// Id of the request currently awaited, if any.
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn view(&self) -> AppViewModel {
        let (phase, pending, verdict, error) = match &self.lifecycle {
            LifecycleState::Idle => (Phase::Idle, None, None, None),
            LifecycleState::Loading(query) => (
                Phase::Loading,
                Some(PendingView {
                    url: query.url.clone(),
                    model_label: query.model.label(),
                }),
                None,
                None,
            ),
            LifecycleState::Success(result) => (
                Phase::Success,
                None,
                Some(VerdictView::for_result(result)),
                None,
            ),
            LifecycleState::Failed(err) => (Phase::Failed, None, None, Some(err.message.clone())),
        };

        AppViewModel {
            phase,
            input_enabled: phase != Phase::Loading,
            pending,
            verdict,
            error,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn normalizer(&self) -> Normalizer {
        self.normalizer
    }

    /// Url of the in-flight query when `request_id` is the one being awaited.
    pub(crate) fn pending_url(&self, request_id: RequestId) -> Option<&str> {
        match &self.lifecycle {
            LifecycleState::Loading(query) if self.in_flight == Some(request_id) => {
                Some(query.url.as_str())
            }
            _ => None,
        }
    }

    /// Discards any previous outcome and waits on a fresh request.
    pub(crate) fn begin_request(&mut self, query: Query) -> RequestId {
        self.last_request_id += 1;
        self.in_flight = Some(self.last_request_id);
        self.lifecycle = LifecycleState::Loading(query);
        self.dirty = true;
        self.last_request_id
    }

    pub(crate) fn finish(&mut self, outcome: Result<PredictionResult, RequestError>) {
        self.in_flight = None;
        self.lifecycle = match outcome {
            Ok(result) => LifecycleState::Success(result),
            Err(err) => LifecycleState::Failed(err),
        };
        self.dirty = true;
    }

    pub(crate) fn clear(&mut self) {
        if !matches!(self.lifecycle, LifecycleState::Idle) {
            self.lifecycle = LifecycleState::Idle;
            self.dirty = true;
        }
    }
}
