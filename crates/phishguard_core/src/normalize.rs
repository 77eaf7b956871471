//! Maps the prediction service's response bodies onto [`PredictionResult`].
//!
//! The service has answered in three shapes over its lifetime. They are tried
//! in a fixed order by [`SHAPE_MATCHERS`]; the first one that recognises the
//! body wins.

use serde_json::{Map, Value};

/// Percentage points added to a legitimate verdict's confidence for display.
pub const LEGITIMATE_BOOST_POINTS: f64 = 80.0;

/// Highest confidence percentage ever shown to the user.
pub const MAX_DISPLAY_CONFIDENCE: f64 = 99.0;

/// JSON body exactly as the prediction service returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawServiceResponse(pub Value);

impl From<Value> for RawServiceResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Phishing => "phishing",
            Verdict::Legitimate => "legitimate",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "phishing" => Some(Verdict::Phishing),
            "legitimate" => Some(Verdict::Legitimate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub verdict: Verdict,
    /// Percentage shown to the user, within `0..=99`, two decimals.
    pub display_confidence: Option<f64>,
    /// Service-reported percentage before any display transform.
    pub reported_confidence: Option<f64>,
    pub url: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("The prediction service returned a response in an unrecognized format.")]
    UnrecognizedShape,
    #[error("The prediction service returned an unrecognized verdict: {0}")]
    UnrecognizedVerdict(String),
    #[error("The prediction service returned a result without a verdict.")]
    MissingVerdict,
}

/// How the reported percentage is turned into the displayed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceDisplay {
    /// Adds [`LEGITIMATE_BOOST_POINTS`] to legitimate verdicts.
    ///
    /// Cosmetic only, not a calibration. It hides how unsure the model was
    /// about a legitimate verdict and should be treated as a defect.
    #[default]
    LegitimateBoost,
    /// Shows the reported percentage as is.
    Reported,
}

/// Label and confidence fraction pulled out of one response shape.
#[derive(Debug, Clone, PartialEq)]
struct RawPrediction {
    label: Option<String>,
    confidence: Option<f64>,
}

type ShapeMatcher = fn(&Map<String, Value>) -> Option<RawPrediction>;

/// Response shapes in priority order.
const SHAPE_MATCHERS: &[ShapeMatcher] = &[
    match_single_result,
    match_multi_result,
    match_legacy_result,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalizer {
    display: ConfidenceDisplay,
}

impl Normalizer {
    pub fn new(display: ConfidenceDisplay) -> Self {
        Self { display }
    }

    pub fn normalize(
        &self,
        raw: &RawServiceResponse,
        url: &str,
    ) -> Result<PredictionResult, NormalizationError> {
        let body = raw.0.as_object().ok_or(NormalizationError::UnrecognizedShape)?;
        let prediction = SHAPE_MATCHERS
            .iter()
            .find_map(|matcher| matcher(body))
            .ok_or(NormalizationError::UnrecognizedShape)?;

        let label = prediction.label.ok_or(NormalizationError::MissingVerdict)?;
        let verdict = Verdict::from_label(&label)
            .ok_or(NormalizationError::UnrecognizedVerdict(label))?;

        let reported_confidence = prediction.confidence.map(|fraction| fraction * 100.0);
        let display_confidence =
            reported_confidence.map(|percent| self.display_percent(verdict, percent));

        Ok(PredictionResult {
            verdict,
            display_confidence,
            reported_confidence,
            url: url.to_string(),
        })
    }

    fn display_percent(&self, verdict: Verdict, percent: f64) -> f64 {
        let shown = match (self.display, verdict) {
            (ConfidenceDisplay::LegitimateBoost, Verdict::Legitimate) => {
                boost_legitimate_confidence(percent)
            }
            _ => percent,
        };
        round_to_hundredths(shown).clamp(0.0, MAX_DISPLAY_CONFIDENCE)
    }
}

/// Normalizes with the default display transform.
pub fn normalize(
    raw: &RawServiceResponse,
    url: &str,
) -> Result<PredictionResult, NormalizationError> {
    Normalizer::default().normalize(raw, url)
}

/// `min(99, round((percent + 80) * 10) / 10)`.
pub fn boost_legitimate_confidence(percent: f64) -> f64 {
    let boosted = ((percent + LEGITIMATE_BOOST_POINTS) * 10.0).round() / 10.0;
    boosted.min(MAX_DISPLAY_CONFIDENCE)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn match_single_result(body: &Map<String, Value>) -> Option<RawPrediction> {
    let label = truthy(body.get("prediction"))?;
    let confidence = first_number(&[body.get("confidence"), body.get("probability_phishing")]);
    Some(RawPrediction {
        label: label_text(label),
        confidence,
    })
}

fn match_multi_result(body: &Map<String, Value>) -> Option<RawPrediction> {
    let first = body.get("results")?.as_array()?.first()?;
    Some(RawPrediction {
        label: first.get("prediction").and_then(label_text),
        confidence: first_number(&[first.get("probability_phishing")]),
    })
}

fn match_legacy_result(body: &Map<String, Value>) -> Option<RawPrediction> {
    let label = truthy(body.get("result"))?;
    Some(RawPrediction {
        label: label_text(label),
        confidence: first_number(&[body.get("confidence")]),
    })
}

/// Treats `null`, `false`, `0` and `""` as missing.
fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// First candidate that is not `null`, converted to a finite number.
fn first_number(candidates: &[Option<&Value>]) -> Option<f64> {
    let value = candidates
        .iter()
        .flatten()
        .find(|value| !value.is_null())?;
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
