use crate::{validate_url, AppState, Effect, ModelId, Msg, Query, RequestError, ValidationError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submitted { url, model } => {
            // Single-flight: the renderer disables input while loading, this is the backstop.
            if state.is_loading() {
                return (state, Vec::new());
            }
            match parse_query(&url, &model) {
                Ok(query) => {
                    let request_id = state.begin_request(query.clone());
                    vec![Effect::SendPrediction { request_id, query }]
                }
                Err(err) => {
                    state.finish(Err(RequestError::from(err)));
                    Vec::new()
                }
            }
        }
        Msg::PredictionCompleted {
            request_id,
            outcome,
        } => {
            let Some(url) = state.pending_url(request_id).map(str::to_owned) else {
                return (state, Vec::new());
            };
            let normalizer = state.normalizer();
            let result = outcome.and_then(|raw| {
                normalizer
                    .normalize(&raw, &url)
                    .map_err(RequestError::from)
            });
            state.finish(result);
            Vec::new()
        }
        Msg::Cleared => {
            if !state.is_loading() {
                state.clear();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn parse_query(url: &str, model: &str) -> Result<Query, ValidationError> {
    let url = validate_url(url)?;
    let model = model.parse::<ModelId>()?;
    Ok(Query {
        url: url.to_string(),
        model,
    })
}
