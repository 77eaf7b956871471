use std::time::{Duration, Instant};

use phishguard_core::{update, AppState, AppViewModel, Msg, RequestError};
use phishguard_logging::guard_warn;

use super::effects::EffectRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the lifecycle state and drives it with the effect runner.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    /// Upper bound on how long a request may stay in flight.
    deadline: Duration,
}

impl Session {
    pub fn new(state: AppState, runner: EffectRunner, deadline: Duration) -> Self {
        Self {
            state,
            runner,
            deadline,
        }
    }

    /// Applies `msg`, starts any resulting effects and returns the view when it changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let mut pending = vec![msg];
        let mut changed = None;
        while let Some(msg) = pending.pop() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() {
                changed = Some(state.view());
            }
            self.state = state;
            pending.extend(self.runner.run(effects));
        }
        changed
    }

    /// Submits `url` and blocks until the lifecycle leaves `Loading`.
    ///
    /// `on_change` sees every intermediate view, the final one included.
    pub fn submit(
        &mut self,
        url: &str,
        model: &str,
        mut on_change: impl FnMut(&AppViewModel),
    ) -> AppViewModel {
        let submitted = Msg::Submitted {
            url: url.to_string(),
            model: model.to_string(),
        };
        if let Some(view) = self.dispatch(submitted) {
            on_change(&view);
        }

        let started = Instant::now();
        while self.state.is_loading() {
            let msg = match self.runner.next_msg(POLL_INTERVAL) {
                Some(msg) => msg,
                None if started.elapsed() < self.deadline => continue,
                None => match self.state.in_flight() {
                    Some(request_id) => {
                        guard_warn!("Request {} exceeded {:?}", request_id, self.deadline);
                        Msg::PredictionCompleted {
                            request_id,
                            outcome: Err(RequestError::timeout()),
                        }
                    }
                    None => break,
                },
            };
            if let Some(view) = self.dispatch(msg) {
                on_change(&view);
            }
        }

        self.state.view()
    }
}
