use std::fs;
use std::path::Path;

use phishguard_core::{ModelId, Theme};
use phishguard_engine::{write_atomically, DEFAULT_ENDPOINT};
use phishguard_logging::{guard_error, guard_info, guard_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Preferences {
    pub theme: Theme,
    pub model: ModelId,
    pub endpoint: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            model: ModelId::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedPreferences {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    endpoint: Option<String>,
}

/// Reads preferences, falling back to defaults field by field.
pub(crate) fn load_preferences(path: &Path) -> Preferences {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            guard_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    let persisted: PersistedPreferences = match ron::from_str(&content) {
        Ok(persisted) => persisted,
        Err(err) => {
            guard_warn!("Failed to parse preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    let defaults = Preferences::default();
    let theme = persisted
        .theme
        .and_then(|raw| parse_or_warn(&raw, "theme"))
        .unwrap_or(defaults.theme);
    let model = persisted
        .model
        .and_then(|raw| parse_or_warn(&raw, "model"))
        .unwrap_or(defaults.model);
    let endpoint = persisted
        .endpoint
        .filter(|endpoint| !endpoint.trim().is_empty())
        .unwrap_or(defaults.endpoint);

    guard_info!("Loaded preferences from {:?}", path);
    Preferences {
        theme,
        model,
        endpoint,
    }
}

pub(crate) fn save_preferences(path: &Path, preferences: &Preferences) {
    let persisted = PersistedPreferences {
        theme: Some(preferences.theme.as_str().to_string()),
        model: Some(preferences.model.as_str().to_string()),
        endpoint: Some(preferences.endpoint.clone()),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            guard_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(path, &content) {
        guard_error!("Failed to write preferences to {:?}: {}", path, err);
    }
}

fn parse_or_warn<T: std::str::FromStr>(raw: &str, field: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            guard_warn!("Ignoring persisted {}: {}", field, err);
            None
        }
    }
}
