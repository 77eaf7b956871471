//! PhishGuard core: pure prediction lifecycle, response normalization and view-model helpers.
mod effect;
mod error;
mod model;
mod msg;
mod normalize;
mod state;
mod theme;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use error::{RequestError, RequestErrorKind, SERVICE_ERROR_FALLBACK};
pub use model::{ModelId, Query};
pub use msg::Msg;
pub use normalize::{
    boost_legitimate_confidence, normalize, ConfidenceDisplay, NormalizationError, Normalizer,
    PredictionResult, RawServiceResponse, Verdict, LEGITIMATE_BOOST_POINTS,
    MAX_DISPLAY_CONFIDENCE,
};
pub use state::{AppState, LifecycleState, RequestId};
pub use theme::{SubscriptionId, Theme, ThemeStore, UnknownTheme};
pub use update::update;
pub use validate::{validate_url, ValidationError};
pub use view_model::{format_confidence, AppViewModel, PendingView, Phase, VerdictView};
