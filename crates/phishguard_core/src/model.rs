use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// Classifier the prediction service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelId {
    #[default]
    LogisticRegression,
    RandomForest,
    DecisionTree,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [
        ModelId::LogisticRegression,
        ModelId::RandomForest,
        ModelId::DecisionTree,
    ];

    /// Identifier sent as the `model` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "lr",
            ModelId::RandomForest => "rf",
            ModelId::DecisionTree => "dt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "Logistic Regression",
            ModelId::RandomForest => "Random Forest",
            ModelId::DecisionTree => "Decision Tree",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ModelId::LogisticRegression => "Fast, interpretable linear model",
            ModelId::RandomForest => "Ensemble method with high accuracy",
            ModelId::DecisionTree => "Simple, easy to visualize model",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim();
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| ValidationError::UnknownModel(key.to_string()))
    }
}

/// A validated submission. Lives only until its result or error is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub url: String,
    pub model: ModelId,
}
