use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use phishguard_core::{ModelId, Theme};
use phishguard_logging::LogDestination;

/// Check whether websites look like phishing using a remote classifier.
#[derive(Debug, Parser)]
#[command(name = "phishguard", version)]
pub struct Cli {
    /// URLs to check in order. Without any, an interactive prompt starts.
    pub urls: Vec<String>,

    /// Classifier to use: lr, rf or dt.
    #[arg(short, long)]
    pub model: Option<ModelId>,

    /// Base URL of the prediction service.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Colour theme for this run: light or dark.
    #[arg(long)]
    pub theme: Option<Theme>,

    /// Show the service-reported confidence without the display boost.
    #[arg(long)]
    pub reported_confidence: bool,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Preferences file (theme, default model, endpoint).
    #[arg(long, default_value = ".phishguard.ron")]
    pub prefs: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
    Off,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_urls() {
        let cli = Cli::try_parse_from([
            "phishguard",
            "--model",
            "RF",
            "--theme",
            "dark",
            "--log",
            "off",
            "https://a.example.com",
            "https://b.example.com",
        ])
        .expect("parses");

        assert_eq!(cli.model, Some(ModelId::RandomForest));
        assert_eq!(cli.theme, Some(Theme::Dark));
        assert_eq!(cli.log, LogTarget::Off);
        assert_eq!(cli.urls.len(), 2);
        assert!(!cli.reported_confidence);
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(Cli::try_parse_from(["phishguard", "--model", "svm"]).is_err());
    }
}
