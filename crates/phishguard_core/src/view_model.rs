use crate::{PredictionResult, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    /// False while a request is in flight; the URL input and submit control are disabled.
    pub input_enabled: bool,
    pub pending: Option<PendingView>,
    pub verdict: Option<VerdictView>,
    pub error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingView {
    pub url: String,
    pub model_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictView {
    pub verdict: Verdict,
    pub headline: &'static str,
    pub summary: &'static str,
    pub url: String,
    /// Formatted as `NN.NN%`.
    pub confidence: Option<String>,
    pub guidance_title: &'static str,
    pub guidance: &'static [&'static str],
}

const PHISHING_GUIDANCE: &[&str] = &[
    "Do not enter passwords or personal information",
    "Close this website immediately",
    "Report the website to authorities",
];

const LEGITIMATE_GUIDANCE: &[&str] = &[
    "Always verify the URL before entering sensitive data",
    "Look for HTTPS and security indicators",
    "Keep your browser and antivirus updated",
];

impl VerdictView {
    pub fn for_result(result: &PredictionResult) -> Self {
        let confidence = result.display_confidence.map(format_confidence);
        match result.verdict {
            Verdict::Phishing => Self {
                verdict: Verdict::Phishing,
                headline: "Phishing Detected!",
                summary: "This website appears to be malicious. Avoid entering sensitive information.",
                url: result.url.clone(),
                confidence,
                guidance_title: "Safety Recommendations:",
                guidance: PHISHING_GUIDANCE,
            },
            Verdict::Legitimate => Self {
                verdict: Verdict::Legitimate,
                headline: "Website is Legitimate",
                summary: "This website appears to be safe. However, always exercise caution online.",
                url: result.url.clone(),
                confidence,
                guidance_title: "Best Practices:",
                guidance: LEGITIMATE_GUIDANCE,
            },
        }
    }
}

pub fn format_confidence(percent: f64) -> String {
    format!("{percent:.2}%")
}
